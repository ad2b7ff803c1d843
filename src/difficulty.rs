//! Named difficulty presets and the active selection.

use std::str::FromStr;

use crate::error::DifficultyError;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Level {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Easy, Level::Medium, Level::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }

    /// Tuning constants for this level.
    pub fn profile(&self) -> DifficultyProfile {
        match self {
            Level::Easy => DifficultyProfile {
                gravity: 0.4,
                lift: -7.0,
                pipe_gap: 180.0,
                pipe_speed: 2.0,
            },
            Level::Medium => DifficultyProfile {
                gravity: 0.5,
                lift: -8.0,
                pipe_gap: 140.0,
                pipe_speed: 3.0,
            },
            Level::Hard => DifficultyProfile {
                gravity: 0.6,
                lift: -9.0,
                pipe_gap: 110.0,
                pipe_speed: 4.0,
            },
        }
    }
}

impl FromStr for Level {
    type Err = DifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Level::Easy),
            "medium" => Ok(Level::Medium),
            "hard" => Ok(Level::Hard),
            _ => Err(DifficultyError::UnknownLevel { name: s.to_string() }),
        }
    }
}

/// Per-tick tuning constants. Velocities are in world units per tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DifficultyProfile {
    pub gravity: f32,
    pub lift: f32,
    pub pipe_gap: f32,
    pub pipe_speed: f32,
}

/// The currently selected level. Exactly one profile is active at a time.
#[derive(Copy, Clone, Debug, Default)]
pub struct Difficulty {
    level: Level,
}

impl Difficulty {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn profile(&self) -> DifficultyProfile {
        self.level.profile()
    }

    /// Select a level by name. On failure the active profile is unchanged.
    pub fn select_level(&mut self, name: &str) -> Result<Level, DifficultyError> {
        let level = name.parse::<Level>()?;
        self.set(level);
        Ok(level)
    }

    pub fn set(&mut self, level: Level) {
        self.level = level;
    }
}
