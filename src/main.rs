//! arplay - headless demos
//!
//! By default runs one Target Drop round against the simulated AR session:
//! places the spawn pad with a tap, anchors it, then taps on targets as they
//! appear until the round timer runs out. `arplay place-cube` instead taps a
//! row of points and reports where the cubes landed.

use arplay::config::AppConfig;
use arplay::game::{PlaceCube, TargetDrop};
use arplay_core::components::GamePhase;
use arplay_input::PointerEvent;
use arplay_physics::world_to_screen;
use arplay_session::SessionFactory;

const TICK_SECONDS: f32 = 1.0 / 60.0;
/// Gap between demo taps; longer than the double tap window
const TAP_EVERY_MS: f64 = 500.0;
/// Press duration of a demo tap
const TAP_HOLD_MS: f64 = 40.0;

fn main() {
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.debug.log_level)).init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }
    log::info!("Starting arplay");

    let result = match std::env::args().nth(1).as_deref() {
        Some("place-cube") => pollster::block_on(run_place_cube(config)),
        _ => pollster::block_on(run(config)),
    };
    if let Err(e) = result {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> Result<(), arplay::GameError> {
    let factory = SessionFactory::new(config.session.to_session_config()).with_forced_mode(config.session.force_mode);
    let max_ticks = ((config.game.duration_ms / 1000.0 + 2.0) / f64::from(TICK_SECONDS)) as u64;

    let mut game = TargetDrop::new(config, factory);
    game.initialize().await?;
    game.start().await?;

    let (width, height) = game.viewport();
    let mut now_ms = 0.0_f64;
    let mut pointer = 0_u64;
    let mut next_tap_ms = TAP_EVERY_MS;

    // One frame so the session reports a camera, then place the pad in the middle of the screen
    game.request_tick(TICK_SECONDS);
    now_ms += f64::from(TICK_SECONDS) * 1000.0;
    tap(&mut game, &mut pointer, width * 0.5, height * 0.75, now_ms);
    if game.is_placing() {
        log::warn!("No surface found; nothing to play on");
        return Ok(());
    }
    let anchor = game.anchor_spawn_pad().await?;
    log::info!("Spawn pad anchored ({})", anchor);

    for _ in 0..max_ticks {
        game.request_tick(TICK_SECONDS);
        now_ms += f64::from(TICK_SECONDS) * 1000.0;

        if game.game_state().is_some_and(|s| s.phase == GamePhase::GameOver) {
            break;
        }

        if now_ms >= next_tap_ms {
            next_tap_ms = now_ms + TAP_EVERY_MS;
            let camera = *game.camera();
            let aim = game
                .target_positions()
                .into_iter()
                .find_map(|(_, position)| world_to_screen(position, width, height, &camera));
            if let Some(screen) = aim {
                tap(&mut game, &mut pointer, screen.x, screen.y, now_ms);
            }
        }
    }

    if let Some(score) = game.score() {
        log::info!(
            "Final score {:.0} ({} hits, {} missed, high {:.0})",
            score.current,
            score.hits,
            score.missed,
            score.high
        );
    }
    game.stop().await;
    Ok(())
}

async fn run_place_cube(config: AppConfig) -> Result<(), arplay::GameError> {
    let factory = SessionFactory::new(config.session.to_session_config()).with_forced_mode(config.session.force_mode);
    let mut demo = PlaceCube::new(config, factory);
    demo.initialize().await?;
    demo.start().await?;

    let (width, height) = demo.viewport();
    let mut now_ms = 0.0_f64;
    for i in 0..5 {
        demo.request_tick(TICK_SECONDS);
        now_ms += TAP_EVERY_MS;
        let position = arplay_math::Vec2::new(width * (0.1 + 0.2 * i as f32), height * 0.8);
        demo.handle_pointer(PointerEvent::down(i, position, now_ms));
        demo.handle_pointer(PointerEvent::up(i, position, now_ms + TAP_HOLD_MS));
    }
    demo.request_tick(TICK_SECONDS);

    for (entity, position) in demo.cube_positions() {
        log::info!("Cube {} at {}", entity, position);
    }
    demo.stop().await;
    Ok(())
}

/// Press and release one pointer at a screen position
fn tap(game: &mut TargetDrop, pointer: &mut u64, x: f32, y: f32, now_ms: f64) {
    let position = arplay_math::Vec2::new(x, y);
    game.handle_pointer(PointerEvent::down(*pointer, position, now_ms));
    game.handle_pointer(PointerEvent::up(*pointer, position, now_ms + TAP_HOLD_MS));
    *pointer += 1;
}
