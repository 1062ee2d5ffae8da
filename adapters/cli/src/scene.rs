//! Translation between the simulation and the backend-agnostic scene.

use glam::Vec2;
use sentinel_core::{EnemyColor, WorldPoint};
use sentinel_rendering::{
    palette, Color, CorePresentation, EnemyPresentation, FieldPresentation, FrameInput,
    HudPresentation, PathPresentation, RenderingError, Scene, SceneProjectile, SceneTower,
};
use sentinel_simulation::{PlayerAction, Simulation};
use sentinel_world::{query, World};

/// Builds the initial scene for the simulation's field layout.
pub(crate) fn initial_scene(simulation: &Simulation) -> Result<Scene, RenderingError> {
    let world = simulation.world();
    let tuning = query::tuning(world);
    let field = FieldPresentation::new(
        tuning.world_width,
        tuning.world_height,
        tuning.tile_size,
        palette::GRID,
    )?;
    let path = PathPresentation {
        waypoints: query::path(world)
            .waypoints()
            .iter()
            .copied()
            .map(to_vec2)
            .collect(),
        width: tuning.tile_size,
        color: palette::PATH,
    };
    let core_bounds = query::core_bounds(world);
    let core = CorePresentation {
        center: to_vec2(core_bounds.center()),
        size: core_bounds.width(),
        color: palette::CORE,
    };

    let mut scene = Scene::new(field, path, core, hud(world));
    refresh_scene(simulation, &mut scene);
    Ok(scene)
}

/// Copies the current session state into the scene.
pub(crate) fn refresh_scene(simulation: &Simulation, scene: &mut Scene) {
    let world = simulation.world();

    scene.enemies.clear();
    scene
        .enemies
        .extend(query::enemy_view(world).iter().map(|enemy| {
            EnemyPresentation::new(
                to_vec2(enemy.position),
                enemy.bounds.width(),
                to_color(enemy.color),
                enemy.health,
                enemy.max_health,
            )
        }));

    scene.towers.clear();
    scene
        .towers
        .extend(query::tower_view(world).iter().map(|tower| SceneTower {
            id: tower.id,
            center: to_vec2(tower.position),
            footprint: tower.bounds.width(),
            range: tower.range,
        }));

    scene.projectiles.clear();
    scene
        .projectiles
        .extend(query::projectiles(world).iter().map(|projectile| SceneProjectile {
            id: projectile.id,
            position: to_vec2(projectile.position),
            size: projectile.bounds.width(),
        }));

    scene.hud = hud(world);
    scene.phase = simulation.phase();
    if scene.lore != simulation.lore() {
        scene.lore.clear();
        scene.lore.push_str(simulation.lore());
    }
    scene.advice = simulation.advice().map(str::to_owned);
    scene.taunt = simulation.taunt().map(str::to_owned);
    scene.core_alarm = simulation.core_alarm();
}

/// Forwards the frame's edge-triggered inputs to the simulation.
pub(crate) fn apply_input(simulation: &mut Simulation, input: &FrameInput) {
    if input.begin_session {
        simulation.handle_action(PlayerAction::BeginSession);
    }
    if input.request_advice {
        simulation.handle_action(PlayerAction::RequestAdvice);
    }
    if input.reboot {
        simulation.handle_action(PlayerAction::Reboot);
    }
    if input.confirm_action {
        if let Some(cursor) = input.cursor_world_space {
            simulation.handle_action(PlayerAction::PlaceTower {
                position: WorldPoint::new(cursor.x, cursor.y),
            });
        }
    }
}

fn hud(world: &World) -> HudPresentation {
    HudPresentation {
        integrity: query::integrity(world),
        max_integrity: query::tuning(world).max_integrity,
        cycles: query::cycles(world).get(),
        score: query::score(world),
        wave: query::wave(world).get(),
    }
}

fn to_vec2(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x, point.y)
}

fn to_color(color: EnemyColor) -> Color {
    Color::from_rgb_u8(color.red(), color.green(), color.blue())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_advisory::{Advisor, AdvisoryClient};
    use sentinel_core::{Phase, Tuning, TICK, WELCOME_BANNER};

    fn simulation() -> Simulation {
        Simulation::new(
            Tuning::default(),
            AdvisoryClient::inline(Advisor::LocalOnly),
        )
        .expect("valid tuning")
    }

    #[test]
    fn initial_scene_mirrors_layout() {
        let simulation = simulation();
        let scene = initial_scene(&simulation).expect("valid scene");

        assert_eq!(scene.field.width, 1200.0);
        assert_eq!(scene.field.height, 800.0);
        assert_eq!(scene.path.waypoints.len(), 6);
        assert_eq!(scene.core.center, Vec2::new(600.0, 400.0));
        assert_eq!(scene.core.size, 40.0);
        assert_eq!(scene.phase, Phase::StartMenu);
        assert_eq!(scene.lore, WELCOME_BANNER);
        assert_eq!(scene.hud.cycles, 100);
    }

    #[test]
    fn click_places_tower_once_playing() {
        let mut simulation = simulation();
        let mut scene = initial_scene(&simulation).expect("valid scene");
        let click = FrameInput {
            confirm_action: true,
            cursor_world_space: Some(Vec2::new(505.0, 290.0)),
            ..FrameInput::default()
        };

        apply_input(&mut simulation, &click);
        assert_eq!(query::tower_count(simulation.world()), 0);

        apply_input(
            &mut simulation,
            &FrameInput {
                begin_session: true,
                ..FrameInput::default()
            },
        );
        simulation.advance(TICK);
        apply_input(&mut simulation, &click);
        refresh_scene(&simulation, &mut scene);

        assert_eq!(scene.phase, Phase::Playing);
        assert_eq!(scene.towers.len(), 1);
        assert_eq!(scene.towers[0].center, Vec2::new(500.0, 300.0));
        assert_eq!(scene.towers[0].footprint, 30.0);
        assert_eq!(scene.hud.cycles, 50);
    }

    #[test]
    fn spawned_enemies_are_presented_with_wave_colour() {
        let mut simulation = simulation();
        simulation.handle_action(PlayerAction::BeginSession);
        for _ in 0..100 {
            simulation.advance(TICK);
        }
        let scene = initial_scene(&simulation).expect("valid scene");

        assert_eq!(scene.enemies.len(), 1);
        let enemy = scene.enemies[0];
        assert_eq!(enemy.size, 25.0);
        assert_eq!(enemy.color, Color::from_rgb_u8(110, 50, 50));
        assert_eq!(enemy.health_fraction, 1.0);
    }
}
