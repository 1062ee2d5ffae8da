//! Prompt text sent to the Advisory Service for each call site.

/// Prompt used for opening and wave-clear lore.
pub const LORE: &str = "Describe a computer virus wave in one short, gritty sentence.";

/// Prompt used for the end-of-game taunt.
pub const TAUNT: &str =
    "The firewall has failed. Act as a victorious computer virus. 1-sentence message.";

/// Prompt used for tactical advice, embedding the current session stats.
#[must_use]
pub fn tactical_advice(integrity: f32, cycles: u32) -> String {
    format!(
        "Cyber-defense context. Stats: Integrity: {}%, Cycles: {}. 1-sentence tip.",
        integrity.round() as i64,
        cycles
    )
}
