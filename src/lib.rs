//! Bonda Flappy - a Flappy-Bird-style side-scroller for the browser.
//!
//! The simulation (`difficulty`, `bird`, `pipes`, `collision`, `game`) is
//! platform-free and runs in fixed per-tick increments inside a 400x600
//! world. The `web` module wires it to a canvas, WebGPU, DOM text and audio.

pub mod bird;
pub mod collision;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod event;
pub mod game;
pub mod pipes;
pub mod scene;
pub mod timer;

#[cfg(target_arch = "wasm32")]
mod web;

pub use config::{Config, TickMode};
pub use difficulty::{Difficulty, DifficultyProfile, Level};
pub use error::DifficultyError;
pub use event::GameEvent;
pub use game::{Game, Input, Phase};

/// World geometry and timing.
pub mod consts {
    pub const WORLD_WIDTH: f32 = 400.0;
    pub const WORLD_HEIGHT: f32 = 600.0;

    pub const BIRD_X: f32 = 80.0;
    pub const BIRD_START_Y: f32 = 300.0;
    pub const BIRD_RADIUS: f32 = 15.0;

    pub const PIPE_WIDTH: f32 = 50.0;
    /// A new pipe spawns once the newest one is this far left of the right edge.
    pub const PIPE_SPAWN_DISTANCE: f32 = 200.0;
    /// Minimum distance between a gap and the top or bottom of the world.
    pub const PIPE_GAP_MARGIN: f32 = 50.0;
    /// Top edge of the pipe seeded at start and on restart.
    pub const FIRST_PIPE_TOP: f32 = 150.0;

    /// Reference tick rate for the fixed-step scheduler.
    pub const TICK_RATE: f32 = 60.0;
    pub const STEP: f32 = 1.0 / TICK_RATE;
    /// Upper bound on ticks run for one displayed frame.
    pub const MAX_TICKS_PER_FRAME: u32 = 5;
}
