use rand::seq::SliceRandom;

use crate::AdvisoryTopic;

const LORE: [&str; 5] = [
    "LOCAL_INTEL: Segmented logic bombs detected in Sector 7G.",
    "ERROR 404_INTEL: Virus signature obscured. Deploying standard protocols.",
    "SYSTEM_LOG: Breach detected. Integrity subroutines failing.",
    "CORE_ALERT: Sentient malware attempting to bypass encryption.",
    "PROTOCOL_ALPHA: Security cycles low. Expect heavy packet loss.",
];

const ADVICE: [&str; 3] = [
    "ADVICE: Conserve cycles for high-density virus waves.",
    "ADVICE: Overlapping tower ranges maximize efficiency.",
    "ADVICE: Prioritize nodes for fast moving packets.",
];

const TAUNT: [&str; 1] = ["CORE_TERMINATED: ALL DATA BELONGS TO THE HIVE."];

/// Canned lines substituted for the topic when the service cannot answer.
#[must_use]
pub fn fallback_lines(topic: AdvisoryTopic) -> &'static [&'static str] {
    match topic {
        AdvisoryTopic::OpeningLore | AdvisoryTopic::WaveLore => &LORE,
        AdvisoryTopic::TacticalAdvice => &ADVICE,
        AdvisoryTopic::EndTaunt => &TAUNT,
    }
}

/// Draws one canned line for the topic uniformly at random.
pub(crate) fn pick(topic: AdvisoryTopic) -> &'static str {
    let lines = fallback_lines(topic);
    lines
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TAUNT[0])
}
