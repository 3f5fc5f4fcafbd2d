//! Cube Arena entry point
//!
//! Runs a short headless demo session: a scripted pilot drives the cube
//! around, fires at whatever spawns, and the session's events stream to the
//! log. Real hosts embed [`cube_arena::Game`] behind a renderer and feed it
//! device input instead.

use cube_arena::consts::FIXED_DT;
use cube_arena::input::InputSnapshot;
use cube_arena::{EventSink, Game, GameConfig, GameEvent};

/// Sink that forwards every game event to the log
struct LogSink;

impl EventSink for LogSink {
    fn emit(&mut self, event: GameEvent) {
        match event {
            GameEvent::Sound(key) => log::debug!("sound cue: {key:?}"),
            other => log::info!("{other:?}"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = 0xC0FFEE;
    let mut game = Game::new(GameConfig::default(), seed);
    let mut sink = LogSink;

    log::info!("cube-arena headless demo, seed {seed:#x}");

    // 30 simulated seconds: drive forward, swing the heading, and fire a
    // burst every couple of seconds
    let ticks = (30.0 / FIXED_DT) as u32;
    for i in 0..ticks {
        let mut input = InputSnapshot::new();
        input.press("KeyW");
        if (i / 180) % 2 == 0 {
            input.press("KeyA");
        }
        // Release between shots so the edge trigger sees distinct presses
        if i % 120 < 3 {
            input.press("KeyF");
        }

        game.tick(FIXED_DT, &input, &mut sink);
    }

    log::info!(
        "demo over: score {}, health {}, coins {}/{}, kills {}",
        game.session.score,
        game.session.health,
        game.session.coins_collected,
        game.coins.total(),
        game.session.kills,
    );

    game.teardown();
}
