//! Galaxy Raid entry point
//!
//! Sets up logging for the platform and flies a headless autopilot run, which
//! exercises the whole simulation without a renderer.

use galaxy_raid::Settings;
use galaxy_raid::audio::{AudioSink, LogAudio};
use galaxy_raid::raster::SilhouetteGenerator;
use galaxy_raid::sim::{Game, GameEvent, GamePhase, Level, TickInput};
use glam::Vec2;

const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up on runs that neither win nor lose
const MAX_RUN_MS: f64 = 180_000.0;

/// Sway left and right, dropping a bomb now and then
fn autopilot(now: f64) -> TickInput {
    let sway = (now / 700.0).sin() as f32;
    TickInput {
        axis: Vec2::new(sway.signum(), 0.0),
        pointer: None,
        action: (now as u64 / 1000) % 15 == 14,
    }
}

fn play(level: Level) -> Settings {
    let mut game = Game::new_game(level, Settings::default(), &SilhouetteGenerator);
    let mut audio = LogAudio::new();
    game.new_game_start(0.0);

    let mut wall = 0.0;
    while game.phase() != GamePhase::Ended && wall < MAX_RUN_MS {
        wall += FRAME_MS;
        let report = game.render(wall, &autopilot(wall));
        for event in report.events {
            match event {
                GameEvent::Sound(cue) => audio.play(cue),
                GameEvent::Banner(text) => log::info!("[{:>6.0} ms] {text}", report.now),
                GameEvent::LevelUnlocked(level) => log::info!("Unlocked level {level}"),
                GameEvent::RunEnded { victory } => {
                    log::info!("Run over, victory: {victory}");
                }
                _ => {}
            }
        }
    }

    let state = game.state();
    log::info!(
        "{}: score {}, stars {}, difficulty {}, {} sounds played",
        level.name(),
        state.score,
        state.settings.stars,
        state.difficulty,
        audio.played()
    );
    game.into_settings()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Galaxy Raid (headless) starting...");

    let level = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .and_then(Level::from_index)
        .unwrap_or(Level::Andromeda);
    let settings = play(level);
    match settings.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Could not serialize settings: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    // Only fails if a logger is already installed
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Galaxy Raid (web) starting...");
    play(Level::Andromeda);
}
