#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Sentinel.
//!
//! Macroquad is pulled in without its `audio` feature; the game is silent
//! and headless test runs must not need native sound libraries.
//!
//! Everything is drawn with immediate-mode primitives: the field and its
//! inhabitants are scaled to fit the window, while the HUD and text overlays
//! are laid out in screen space.

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use sentinel_core::Phase;
use sentinel_rendering::{
    palette, sentence_lines, wrap_text, Color, EnemyPresentation, FrameInput, HudPresentation,
    Presentation, RenderingBackend, Scene, SceneProjectile, SceneTower,
};
use std::time::{Duration, Instant};

const FONT_SIZE: f32 = 24.0;
const LINE_SPACING: f32 = 30.0;
const LOADING_BANNER: &str = "INITIALIZING FIREWALL LORE...";
const FAILURE_BANNER: &str = "CRITICAL_FAILURE: SYSTEM_REDACTED";
const ADVICE_PANEL_HEIGHT: f32 = 100.0;
const ADVICE_PANEL_MARGIN: f32 = 20.0;
const INTEGRITY_BAR_WIDTH: f32 = 200.0;
const HEALTH_BAR_HEIGHT: f32 = 4.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` to quit the game loop.
    quit_requested: bool,
    /// `Space` leaves the start menu.
    begin_session: bool,
    /// `H` asks the advisor for a tip.
    request_advice: bool,
    /// `R` reboots after a game over.
    reboot: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            begin_session: is_key_pressed(KeyCode::Space),
            request_advice: is_key_pressed(KeyCode::H),
            reboot: is_key_pressed(KeyCode::R),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    vsync: Option<bool>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Backend that leaves presentation pacing to the platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks presentation to the display refresh rate, or uncaps it.
    #[must_use]
    pub fn with_vsync(mut self, enabled: bool) -> Self {
        self.vsync = Some(enabled);
        self
    }

    /// Logs frame timing once per second when enabled.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Wall-clock cost of one pass through the render loop.
#[derive(Clone, Copy, Debug, Default)]
struct FrameSample {
    dt: Duration,
    update: Duration,
    draw: Duration,
}

/// Summary of the frames observed during one reporting window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameReport {
    fps: f32,
    slowest_frame: Duration,
    mean_update: Duration,
    mean_draw: Duration,
}

/// Aggregates frame samples into one report per second of presented time.
#[derive(Debug, Default)]
struct FrameTimer {
    window: Duration,
    frames: u32,
    slowest_frame: Duration,
    update_total: Duration,
    draw_total: Duration,
}

impl FrameTimer {
    const REPORT_INTERVAL: Duration = Duration::from_secs(1);

    fn record(&mut self, sample: FrameSample) -> Option<FrameReport> {
        self.window += sample.dt;
        self.frames = self.frames.saturating_add(1);
        self.slowest_frame = self.slowest_frame.max(sample.dt);
        self.update_total += sample.update;
        self.draw_total += sample.draw;

        if self.window < Self::REPORT_INTERVAL {
            return None;
        }

        let report = FrameReport {
            fps: self.frames as f32 / self.window.as_secs_f32(),
            slowest_frame: self.slowest_frame,
            mean_update: self.update_total / self.frames,
            mean_draw: self.draw_total / self.frames,
        };
        *self = Self::default();
        Some(report)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self { vsync, show_fps } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.field.width.round() as i32,
            window_height: scene.field.height.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(vsync) = vsync {
            config.platform.swap_interval = Some(i32::from(vsync));
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut frame_timer = FrameTimer::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let frame_dt =
                    Duration::from_secs_f32(macroquad::time::get_frame_time().max(0.0));

                let metrics_before = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    &scene,
                    &metrics_before,
                    Vec2::new(cursor_x, cursor_y),
                    keyboard,
                    is_mouse_button_pressed(MouseButton::Left),
                );
                let cursor = frame_input.cursor_world_space;

                let update_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let draw_start = Instant::now();
                draw_scene(&scene, &metrics, cursor, screen_width, screen_height);
                let draw_duration = draw_start.elapsed();

                let report = frame_timer.record(FrameSample {
                    dt: frame_dt,
                    update: update_duration,
                    draw: draw_duration,
                });
                if let Some(report) = report.filter(|_| show_fps) {
                    tracing::info!(
                        fps = format_args!("{:.1}", report.fps),
                        slowest_ms = report.slowest_frame.as_secs_f64() * 1_000.0,
                        update_ms = report.mean_update.as_secs_f64() * 1_000.0,
                        draw_ms = report.mean_draw.as_secs_f64() * 1_000.0,
                        "frame timing"
                    );
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps world units onto the window, preserving the field's aspect ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let field = scene.field;
        let scale = if field.width <= 0.0 || field.height <= 0.0 {
            1.0
        } else {
            (screen_width / field.width).min(screen_height / field.height)
        };
        let scale = scale.max(0.0);
        let offset_x = ((screen_width - field.width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - field.height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + world.x * self.scale,
            self.offset_y + world.y * self.scale,
        )
    }

    fn to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    fn length(&self, world_length: f32) -> f32 {
        world_length * self.scale
    }
}

fn gather_frame_input_from_observations(
    scene: &Scene,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    keyboard: KeyboardShortcuts,
    confirm_click: bool,
) -> FrameInput {
    let mut input = FrameInput {
        begin_session: keyboard.begin_session,
        request_advice: keyboard.request_advice,
        reboot: keyboard.reboot,
        ..FrameInput::default()
    };

    if metrics.scale <= f32::EPSILON {
        return input;
    }

    let world_position = metrics.to_world(cursor_position);
    input.cursor_world_space = Some(scene.field.clamp_world_position(world_position));
    if scene.field.contains(world_position) {
        input.confirm_action = confirm_click;
    }

    input
}

fn hovered_tower(scene: &Scene, cursor: Option<Vec2>) -> Option<SceneTower> {
    let cursor = cursor?;
    scene.towers.iter().copied().find(|tower| {
        let half = tower.footprint * 0.5;
        (cursor.x - tower.center.x).abs() <= half && (cursor.y - tower.center.y).abs() <= half
    })
}

fn draw_scene(
    scene: &Scene,
    metrics: &SceneMetrics,
    cursor: Option<Vec2>,
    screen_width: f32,
    screen_height: f32,
) {
    if !scene.shows_field() {
        draw_menu(scene);
        return;
    }

    draw_grid(scene, metrics);
    draw_path(scene, metrics);
    if let Some(tower) = hovered_tower(scene, cursor) {
        draw_tower_range_indicator(&tower, metrics);
    }
    draw_towers(&scene.towers, metrics);
    draw_enemies(&scene.enemies, metrics);
    draw_projectiles(&scene.projectiles, metrics);
    draw_core(scene, metrics);
    draw_enemy_health_bars(&scene.enemies, metrics);
    draw_hud(&scene.hud, screen_width);

    if let Some(advice) = &scene.advice {
        draw_text_overlay(advice, screen_width, screen_height);
    }

    if scene.phase == Phase::GameOver {
        draw_game_over(scene, screen_width, screen_height);
    }

    if scene.phase == Phase::Playing && scene.core_alarm {
        macroquad::shapes::draw_rectangle(
            0.0,
            0.0,
            screen_width,
            screen_height,
            to_macroquad_color(palette::FAILURE.with_alpha(128.0 / 255.0)),
        );
    }
}

fn draw_label(text: &str, x: f32, y: f32, color: Color) {
    let color = to_macroquad_color(color);
    let _ = macroquad::text::draw_text(text, x, y + FONT_SIZE, FONT_SIZE, color);
}

fn menu_lines(scene: &Scene) -> Vec<String> {
    let message = if scene.phase == Phase::AiLoading {
        LOADING_BANNER
    } else {
        scene.lore.as_str()
    };
    sentence_lines(message)
}

fn draw_menu(scene: &Scene) {
    for (index, line) in menu_lines(scene).iter().enumerate() {
        draw_label(line, 50.0, 100.0 + index as f32 * LINE_SPACING, palette::TEXT);
    }
}

fn draw_grid(scene: &Scene, metrics: &SceneMetrics) {
    let field = scene.field;
    let color = to_macroquad_color(field.line_color);
    let top_left = metrics.to_screen(Vec2::ZERO);
    let bottom_right = metrics.to_screen(Vec2::new(field.width, field.height));

    for column in 0..=field.columns() {
        let x = metrics.to_screen(Vec2::new(column as f32 * field.tile_length, 0.0)).x;
        macroquad::shapes::draw_line(x, top_left.y, x, bottom_right.y, 1.0, color);
    }
    for row in 0..=field.rows() {
        let y = metrics.to_screen(Vec2::new(0.0, row as f32 * field.tile_length)).y;
        macroquad::shapes::draw_line(top_left.x, y, bottom_right.x, y, 1.0, color);
    }
}

fn draw_path(scene: &Scene, metrics: &SceneMetrics) {
    let color = to_macroquad_color(scene.path.color);
    let thickness = metrics.length(scene.path.width);
    for segment in scene.path.waypoints.windows(2) {
        let from = metrics.to_screen(segment[0]);
        let to = metrics.to_screen(segment[1]);
        macroquad::shapes::draw_line(from.x, from.y, to.x, to.y, thickness, color);
    }
    for waypoint in &scene.path.waypoints {
        let center = metrics.to_screen(*waypoint);
        macroquad::shapes::draw_circle(center.x, center.y, thickness * 0.5, color);
    }
}

fn draw_tower_range_indicator(tower: &SceneTower, metrics: &SceneMetrics) {
    let center = metrics.to_screen(tower.center);
    let radius = metrics.length(tower.range);
    let fill = palette::TOWER.with_alpha(0.12);
    let outline = palette::TOWER.lighten(0.3).with_alpha(0.6);
    macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(fill));
    macroquad::shapes::draw_circle_lines(
        center.x,
        center.y,
        radius,
        1.5,
        to_macroquad_color(outline),
    );
}

fn draw_towers(towers: &[SceneTower], metrics: &SceneMetrics) {
    let color = to_macroquad_color(palette::TOWER);
    for tower in towers {
        let (x, y, size) = square_on_screen(tower.center, tower.footprint, metrics);
        macroquad::shapes::draw_rectangle(x, y, size, size, color);
    }
}

fn draw_enemies(enemies: &[EnemyPresentation], metrics: &SceneMetrics) {
    for enemy in enemies {
        let (x, y, size) = square_on_screen(enemy.center, enemy.size, metrics);
        macroquad::shapes::draw_rectangle(x, y, size, size, to_macroquad_color(enemy.color));
    }
}

fn draw_enemy_health_bars(enemies: &[EnemyPresentation], metrics: &SceneMetrics) {
    let background = to_macroquad_color(Color::from_rgb_u8(50, 0, 0));
    let fill = to_macroquad_color(palette::TEXT);
    for enemy in enemies {
        let (x, y, width) = square_on_screen(enemy.center, enemy.size, metrics);
        let bar_y = y - HEALTH_BAR_HEIGHT - 2.0;
        macroquad::shapes::draw_rectangle(x, bar_y, width, HEALTH_BAR_HEIGHT, background);
        macroquad::shapes::draw_rectangle(
            x,
            bar_y,
            width * enemy.health_fraction,
            HEALTH_BAR_HEIGHT,
            fill,
        );
    }
}

fn draw_projectiles(projectiles: &[SceneProjectile], metrics: &SceneMetrics) {
    let color = to_macroquad_color(palette::ACCENT);
    for projectile in projectiles {
        let (x, y, size) = square_on_screen(projectile.position, projectile.size, metrics);
        macroquad::shapes::draw_rectangle(x, y, size, size, color);
    }
}

fn draw_core(scene: &Scene, metrics: &SceneMetrics) {
    let (x, y, size) = square_on_screen(scene.core.center, scene.core.size, metrics);
    macroquad::shapes::draw_rectangle(x, y, size, size, to_macroquad_color(scene.core.color));
}

fn draw_hud(hud: &HudPresentation, screen_width: f32) {
    macroquad::shapes::draw_rectangle(
        20.0,
        20.0,
        INTEGRITY_BAR_WIDTH,
        20.0,
        to_macroquad_color(Color::from_rgb_u8(50, 0, 0)),
    );
    macroquad::shapes::draw_rectangle(
        20.0,
        20.0,
        INTEGRITY_BAR_WIDTH * hud.integrity_fraction(),
        20.0,
        to_macroquad_color(palette::ACCENT),
    );
    draw_label(&hud.integrity_label(), 20.0, 45.0, palette::TEXT);
    draw_label(&hud.wave_label(), 20.0, 70.0, palette::TEXT);
    draw_label(&hud.cycles_label(), screen_width - 255.0, 0.0, palette::ACCENT);
    draw_label(&hud.score_label(), screen_width - 250.0, 20.0, palette::TEXT);
}

/// Lines of an overlay that fit inside a panel of the provided width and height.
fn overlay_lines(text: &str, panel_width: f32, panel_height: f32) -> Vec<String> {
    let max_chars = (panel_width / 10.0).max(1.0) as usize;
    let mut lines = wrap_text(text, max_chars);
    let fitting = ((panel_height - 35.0) / 25.0).floor().max(0.0) as usize + 1;
    lines.truncate(fitting);
    lines
}

fn draw_text_overlay(text: &str, screen_width: f32, screen_height: f32) {
    let width = (screen_width - ADVICE_PANEL_MARGIN * 2.0).max(0.0);
    let x = ADVICE_PANEL_MARGIN;
    let y = screen_height - ADVICE_PANEL_HEIGHT - ADVICE_PANEL_MARGIN;

    macroquad::shapes::draw_rectangle(
        x,
        y,
        width,
        ADVICE_PANEL_HEIGHT,
        to_macroquad_color(Color::from_rgb_u8(0, 20, 0)),
    );
    macroquad::shapes::draw_rectangle_lines(
        x,
        y,
        width,
        ADVICE_PANEL_HEIGHT,
        2.0,
        to_macroquad_color(palette::ACCENT),
    );

    for (index, line) in overlay_lines(text, width, ADVICE_PANEL_HEIGHT)
        .iter()
        .enumerate()
    {
        let line_y = y + 15.0 + index as f32 * 25.0 - FONT_SIZE * 0.5;
        draw_label(line, x + 10.0, line_y, palette::TEXT);
    }
}

fn draw_game_over(scene: &Scene, screen_width: f32, screen_height: f32) {
    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        screen_width,
        screen_height,
        to_macroquad_color(Color::new(20.0 / 255.0, 0.0, 0.0, 210.0 / 255.0)),
    );
    draw_label(
        FAILURE_BANNER,
        screen_width * 0.5 - 200.0,
        screen_height * 0.5 - 60.0,
        palette::FAILURE,
    );
    let taunt = format!("> {}", scene.taunt.as_deref().unwrap_or("..."));
    let max_chars = ((screen_width - 100.0) / 10.0).max(1.0) as usize;
    for (index, line) in wrap_text(&taunt, max_chars).iter().enumerate() {
        draw_label(
            line,
            50.0,
            screen_height * 0.5 + 10.0 + index as f32 * LINE_SPACING,
            palette::TEXT,
        );
    }
}

fn square_on_screen(center: Vec2, size: f32, metrics: &SceneMetrics) -> (f32, f32, f32) {
    let scaled = metrics.length(size);
    let center = metrics.to_screen(center);
    (center.x - scaled * 0.5, center.y - scaled * 0.5, scaled)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
