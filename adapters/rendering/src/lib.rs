#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Sentinel adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use sentinel_core::{Phase, ProjectileId, TowerId};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Terminal palette shared by every backend.
pub mod palette {
    use super::Color;

    /// Background fill.
    pub const BACKGROUND: Color = Color::from_rgb_u8(10, 15, 20);
    /// Tile grid lines.
    pub const GRID: Color = Color::from_rgb_u8(20, 30, 40);
    /// Primary text.
    pub const TEXT: Color = Color::from_rgb_u8(0, 255, 150);
    /// Highlights, projectiles and the integrity bar.
    pub const ACCENT: Color = Color::from_rgb_u8(0, 229, 255);
    /// The defended core.
    pub const CORE: Color = Color::from_rgb_u8(255, 0, 100);
    /// Towers.
    pub const TOWER: Color = Color::from_rgb_u8(0, 150, 255);
    /// Enemy path.
    pub const PATH: Color = Color::from_rgb_u8(30, 45, 60);
    /// Failure banner on the game-over screen.
    pub const FAILURE: Color = Color::from_rgb_u8(255, 50, 50);
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the start key was pressed on this frame.
    pub begin_session: bool,
    /// Whether the advice key was pressed on this frame.
    pub request_advice: bool,
    /// Whether the reboot key was pressed on this frame.
    pub reboot: bool,
    /// Whether the pointer was clicked inside the field on this frame.
    pub confirm_action: bool,
    /// Cursor position expressed in world units, clamped to the field bounds.
    pub cursor_world_space: Option<Vec2>,
}

/// Playing field dimensions and tile grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldPresentation {
    /// Width of the field in world units.
    pub width: f32,
    /// Height of the field in world units.
    pub height: f32,
    /// Side length of a placement tile.
    pub tile_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl FieldPresentation {
    /// Creates a new field descriptor.
    ///
    /// Returns an error when the field or tile has no area.
    pub fn new(
        width: f32,
        height: f32,
        tile_length: f32,
        line_color: Color,
    ) -> Result<Self, RenderingError> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(RenderingError::InvalidFieldSize { width, height });
        }
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            width,
            height,
            tile_length,
            line_color,
        })
    }

    /// Number of whole tile columns.
    #[must_use]
    pub fn columns(&self) -> u32 {
        (self.width / self.tile_length).floor() as u32
    }

    /// Number of whole tile rows.
    #[must_use]
    pub fn rows(&self) -> u32 {
        (self.height / self.tile_length).floor() as u32
    }

    /// Clamps a world-space position to the field bounds.
    #[must_use]
    pub fn clamp_world_position(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            position.x.clamp(0.0, self.width),
            position.y.clamp(0.0, self.height),
        )
    }

    /// Returns `true` when the position lies inside the field.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x < self.width
            && position.y < self.height
    }
}

/// Polyline the enemies walk along.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPresentation {
    /// Waypoints in world units.
    pub waypoints: Vec<Vec2>,
    /// Stroke width in world units.
    pub width: f32,
    /// Stroke color.
    pub color: Color,
}

/// The defended core.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorePresentation {
    /// Centre in world units.
    pub center: Vec2,
    /// Edge length in world units.
    pub size: f32,
    /// Fill color.
    pub color: Color,
}

/// Enemy drawn as a filled square with a health bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyPresentation {
    /// Centre in world units.
    pub center: Vec2,
    /// Edge length in world units.
    pub size: f32,
    /// Body color.
    pub color: Color,
    /// Remaining health in the range 0.0..=1.0.
    pub health_fraction: f32,
}

impl EnemyPresentation {
    /// Creates a new enemy descriptor from hit counts.
    #[must_use]
    pub fn new(center: Vec2, size: f32, color: Color, health: u32, max_health: u32) -> Self {
        let health_fraction = if max_health == 0 {
            0.0
        } else {
            (health as f32 / max_health as f32).clamp(0.0, 1.0)
        };
        Self {
            center,
            size,
            color,
            health_fraction,
        }
    }
}

/// Immutable snapshot describing a tower placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Tile-centred position in world units.
    pub center: Vec2,
    /// Edge length of the footprint.
    pub footprint: f32,
    /// Targeting radius.
    pub range: f32,
}

/// Projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Identifier allocated to the projectile by the world.
    pub id: ProjectileId,
    /// Centre in world units.
    pub position: Vec2,
    /// Edge length in world units.
    pub size: f32,
}

/// Session statistics shown above the field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HudPresentation {
    /// Remaining core integrity.
    pub integrity: f32,
    /// Integrity at session start.
    pub max_integrity: f32,
    /// Available currency.
    pub cycles: u32,
    /// Enemies destroyed this session.
    pub score: u32,
    /// Wave in progress.
    pub wave: u32,
}

impl HudPresentation {
    /// Remaining integrity as a fraction of the maximum.
    #[must_use]
    pub fn integrity_fraction(&self) -> f32 {
        if self.max_integrity <= 0.0 {
            return 0.0;
        }
        (self.integrity.max(0.0) / self.max_integrity).clamp(0.0, 1.0)
    }

    /// Integrity label, truncated to whole percent.
    #[must_use]
    pub fn integrity_label(&self) -> String {
        format!("INTEGRITY: {}%", self.integrity.max(0.0).trunc() as u32)
    }

    /// Currency label.
    #[must_use]
    pub fn cycles_label(&self) -> String {
        format!("CPU_CYCLES: {} Ghz", self.cycles)
    }

    /// Kill count label.
    #[must_use]
    pub fn score_label(&self) -> String {
        format!("VIRUS_PURGED: {}", self.score)
    }

    /// Wave label.
    #[must_use]
    pub fn wave_label(&self) -> String {
        format!("WAVE: {}", self.wave)
    }
}

/// Scene description combining the field and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Playing field and tile grid.
    pub field: FieldPresentation,
    /// Path enemies follow.
    pub path: PathPresentation,
    /// The defended core.
    pub core: CorePresentation,
    /// Live enemies in creation order.
    pub enemies: Vec<EnemyPresentation>,
    /// Placed towers in creation order.
    pub towers: Vec<SceneTower>,
    /// Projectiles in flight.
    pub projectiles: Vec<SceneProjectile>,
    /// Session statistics.
    pub hud: HudPresentation,
    /// Active session phase.
    pub phase: Phase,
    /// Lore text for the menu and loading screens.
    pub lore: String,
    /// Advice text shown in the bottom overlay.
    pub advice: Option<String>,
    /// Message shown on the game-over screen.
    pub taunt: Option<String>,
    /// Whether the core took damage within the alarm window.
    pub core_alarm: bool,
}

impl Scene {
    /// Creates a scene on the start menu with no inhabitants.
    #[must_use]
    pub fn new(
        field: FieldPresentation,
        path: PathPresentation,
        core: CorePresentation,
        hud: HudPresentation,
    ) -> Self {
        Self {
            field,
            path,
            core,
            enemies: Vec::new(),
            towers: Vec::new(),
            projectiles: Vec::new(),
            hud,
            phase: Phase::StartMenu,
            lore: String::new(),
            advice: None,
            taunt: None,
            core_alarm: false,
        }
    }

    /// Returns `true` when the field and its inhabitants should be drawn.
    #[must_use]
    pub fn shows_field(&self) -> bool {
        matches!(self.phase, Phase::Playing | Phase::GameOver)
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Sentinel scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// input captured by the adapter, and refreshes the scene before it is
    /// drawn.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Splits menu lore into one line per sentence, each ending with a period.
#[must_use]
pub fn sentence_lines(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| format!("{sentence}."))
        .collect()
}

/// Greedily wraps text on whitespace so no line exceeds `max_chars`.
///
/// Words longer than the limit are placed on their own line unbroken.
#[must_use]
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The field must have a positive area.
    InvalidFieldSize {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
    /// Tiles must have a positive side length.
    InvalidTileLength {
        /// Provided tile length.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFieldSize { width, height } => {
                write!(f, "field must have a positive area (received {width}x{height})")
            }
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}
