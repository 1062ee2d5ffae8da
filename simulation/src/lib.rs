#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-rate simulation loop that drives a Sentinel session.
//!
//! The loop owns the authoritative [`World`], the pure systems and the
//! advisory client. Adapters feed it [`PlayerAction`] values and frame
//! deltas; it converts both into world commands in a fixed order and keeps
//! the text buffers (lore, advice, taunt) shown alongside the playing field.

use std::time::Duration;

use sentinel_advisory::{prompts, AdvisoryClient, AdvisoryResponse, AdvisoryTicket, AdvisoryTopic};
use sentinel_core::{
    Command, Event, Phase, PlacementError, TowerTarget, Tuning, TuningError, WorldPoint,
    TICK, WELCOME_BANNER,
};
use sentinel_system_tower_combat::TowerCombat;
use sentinel_system_tower_targeting::TowerTargeting;
use sentinel_system_wave_director::{Config as WaveDirectorConfig, WaveDirector};
use sentinel_world::{self as world, query, World};

/// Lore shown on the start menu after a reboot.
pub const REBOOT_BANNER: &str = "Firewall Re-initialized. Press SPACE to start...";

/// Advice text shown while a tactical request is in flight.
pub const ADVICE_PENDING: &str = "ACCESSING TACTICAL ADVISOR...";

/// Advice text shown when a request arrives before the cooldown elapsed.
pub const ADVICE_THROTTLED: &str = "TACTICAL COOLDOWN: Wait for re-sync...";

/// Longest frame delta honoured by [`Simulation::advance`].
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

const CORE_ALARM_WINDOW: Duration = Duration::from_millis(100);

/// Edge-triggered inputs the player can issue.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlayerAction {
    /// Leaves the start menu and requests the opening lore.
    BeginSession,
    /// Asks the Advisory Service for a tactical tip.
    RequestAdvice,
    /// Returns to the start menu after the core has fallen.
    Reboot,
    /// Attempts to place a tower at the pointer position.
    PlaceTower {
        /// Pointer position in world units.
        position: WorldPoint,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct AdviceBuffer {
    text: String,
    shown_at: Option<Duration>,
}

/// Orchestrates world, systems and advisory traffic for one process.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    wave_director: WaveDirector,
    tower_targeting: TowerTargeting,
    tower_combat: TowerCombat,
    advisory: AdvisoryClient,
    accumulator: Duration,
    process_clock: Duration,
    events: Vec<Event>,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
    lore: String,
    advice: Option<AdviceBuffer>,
    taunt: Option<String>,
    loading_ticket: Option<AdvisoryTicket>,
    last_advice_request: Option<Duration>,
    taunt_requested: bool,
    alarm_until: Option<Duration>,
}

impl Simulation {
    /// Creates a session on the start menu.
    pub fn new(tuning: Tuning, advisory: AdvisoryClient) -> Result<Self, TuningError> {
        let director_config = WaveDirectorConfig::new(tuning.spawn_interval());
        let world = World::new(tuning)?;
        Ok(Self {
            world,
            wave_director: WaveDirector::new(director_config),
            tower_targeting: TowerTargeting::new(),
            tower_combat: TowerCombat::new(),
            advisory,
            accumulator: Duration::ZERO,
            process_clock: Duration::ZERO,
            events: Vec::new(),
            commands: Vec::new(),
            targets: Vec::new(),
            lore: WELCOME_BANNER.to_owned(),
            advice: None,
            taunt: None,
            loading_ticket: None,
            last_advice_request: None,
            taunt_requested: false,
            alarm_until: None,
        })
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advisory client used by the session.
    #[must_use]
    pub fn advisory(&self) -> &AdvisoryClient {
        &self.advisory
    }

    /// Current session phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        query::phase(&self.world)
    }

    /// Most recent lore text.
    #[must_use]
    pub fn lore(&self) -> &str {
        &self.lore
    }

    /// Advice currently on display, if any.
    #[must_use]
    pub fn advice(&self) -> Option<&str> {
        self.advice.as_ref().map(|advice| advice.text.as_str())
    }

    /// End-of-game taunt, once it has arrived.
    #[must_use]
    pub fn taunt(&self) -> Option<&str> {
        self.taunt.as_deref()
    }

    /// Whether the core was damaged within the last alarm window.
    #[must_use]
    pub fn core_alarm(&self) -> bool {
        self.phase() == Phase::Playing
            && self
                .alarm_until
                .is_some_and(|until| self.process_clock < until)
    }

    /// Process-lifetime clock advanced by every frame.
    #[must_use]
    pub fn process_clock(&self) -> Duration {
        self.process_clock
    }

    /// Applies a player input immediately.
    pub fn handle_action(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::BeginSession => self.begin_session(),
            PlayerAction::RequestAdvice => {
                if self.phase() == Phase::Playing {
                    self.request_advice();
                }
            }
            PlayerAction::Reboot => self.reboot(),
            PlayerAction::PlaceTower { position } => self.place_tower(position),
        }
    }

    /// Advances the session by one rendered frame.
    ///
    /// Advisory responses are applied first, then as many fixed steps as the
    /// accumulated time allows.
    pub fn advance(&mut self, frame_dt: Duration) {
        let frame_dt = frame_dt.min(MAX_FRAME_DELTA);
        self.process_clock = self.process_clock.saturating_add(frame_dt);

        for response in self.advisory.drain() {
            self.deliver(response);
        }
        self.expire_advice();

        self.accumulator = self.accumulator.saturating_add(frame_dt);
        while self.accumulator >= TICK {
            self.accumulator -= TICK;
            self.step();
        }
    }

    fn step(&mut self) {
        self.events.clear();
        self.apply(Command::Tick { dt: TICK });

        self.wave_director.handle(
            &self.events,
            query::phase(&self.world),
            query::wave_progress(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        self.apply(Command::AdvanceEnemies { dt: TICK });

        self.tower_targeting.handle(
            query::phase(&self.world),
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            &mut self.targets,
        );
        self.tower_combat.handle(
            query::phase(&self.world),
            query::tower_cooldowns(&self.world),
            &self.targets,
            &mut self.commands,
        );
        self.flush_commands();

        self.apply(Command::AdvanceProjectiles { dt: TICK });
        self.apply(Command::ResolveCoreDamage { dt: TICK });

        let events = std::mem::take(&mut self.events);
        for event in &events {
            self.react(event);
        }
        self.events = events;
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn flush_commands(&mut self) {
        let mut commands = std::mem::take(&mut self.commands);
        for command in commands.drain(..) {
            self.apply(command);
        }
        self.commands = commands;
    }

    fn react(&mut self, event: &Event) {
        match event {
            Event::WaveCompleted { .. } => {
                let _ = self.advisory.submit(AdvisoryTopic::WaveLore, prompts::LORE);
            }
            Event::SessionLost { .. } => {
                if !self.taunt_requested {
                    self.taunt_requested = true;
                    let _ = self.advisory.submit(AdvisoryTopic::EndTaunt, prompts::TAUNT);
                }
            }
            Event::CoreDrained { .. } | Event::EnemyBreached { .. } => {
                self.alarm_until = Some(self.process_clock.saturating_add(CORE_ALARM_WINDOW));
            }
            _ => {}
        }
    }

    fn begin_session(&mut self) {
        if self.phase() != Phase::StartMenu {
            return;
        }
        self.events.clear();
        self.apply(Command::BeginSession);
        if self.phase() == Phase::AiLoading {
            let ticket = self
                .advisory
                .submit(AdvisoryTopic::OpeningLore, prompts::LORE);
            self.loading_ticket = Some(ticket);
        }
    }

    fn reboot(&mut self) {
        if self.phase() != Phase::GameOver {
            return;
        }
        self.events.clear();
        self.apply(Command::Reset);
        if self.phase() != Phase::StartMenu {
            return;
        }
        self.lore = REBOOT_BANNER.to_owned();
        self.advice = None;
        self.taunt = None;
        self.taunt_requested = false;
        self.loading_ticket = None;
        self.alarm_until = None;
        self.accumulator = Duration::ZERO;
    }

    fn place_tower(&mut self, position: WorldPoint) {
        self.events.clear();
        self.apply(Command::PlaceTower { position });
        let starved = self.events.iter().any(|event| {
            matches!(
                event,
                Event::TowerPlacementRejected {
                    reason: PlacementError::InsufficientCycles,
                    ..
                }
            )
        });
        if starved {
            self.request_advice();
        }
    }

    fn request_advice(&mut self) {
        let now = self.process_clock;
        let cooldown = query::tuning(&self.world).advice_cooldown();
        let throttled = self
            .last_advice_request
            .is_some_and(|last| now.saturating_sub(last) < cooldown);

        if throttled {
            self.advice = Some(AdviceBuffer {
                text: ADVICE_THROTTLED.to_owned(),
                shown_at: Some(now),
            });
            return;
        }

        self.last_advice_request = Some(now);
        self.advice = Some(AdviceBuffer {
            text: ADVICE_PENDING.to_owned(),
            shown_at: None,
        });
        let prompt = prompts::tactical_advice(
            query::integrity(&self.world),
            query::cycles(&self.world).get(),
        );
        let _ = self.advisory.submit(AdvisoryTopic::TacticalAdvice, prompt);
    }

    fn deliver(&mut self, response: AdvisoryResponse) {
        tracing::debug!(
            ticket = response.ticket.get(),
            topic = ?response.topic,
            origin = ?response.origin,
            "advisory response delivered"
        );
        match response.topic {
            AdvisoryTopic::OpeningLore => {
                self.lore = response.text;
                if self.loading_ticket == Some(response.ticket) {
                    self.loading_ticket = None;
                    self.events.clear();
                    self.apply(Command::CompleteLoading);
                }
            }
            AdvisoryTopic::WaveLore => self.lore = response.text,
            AdvisoryTopic::TacticalAdvice => {
                self.advice = Some(AdviceBuffer {
                    text: response.text,
                    shown_at: Some(self.process_clock),
                });
            }
            AdvisoryTopic::EndTaunt => self.taunt = Some(response.text),
        }
    }

    fn expire_advice(&mut self) {
        let display = query::tuning(&self.world).advice_display();
        let now = self.process_clock;
        let expired = self.advice.as_ref().is_some_and(|advice| {
            advice
                .shown_at
                .is_some_and(|shown_at| now.saturating_sub(shown_at) > display)
        });
        if expired {
            self.advice = None;
        }
    }
}
