use crate::consts::{BIRD_RADIUS, BIRD_START_Y, BIRD_X};
use crate::difficulty::DifficultyProfile;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bird {
    pub x: f32,
    pub y: f32,
    pub vel: f32,
    pub radius: f32,
}

impl Default for Bird {
    fn default() -> Self {
        Self {
            x: BIRD_X,
            y: BIRD_START_Y,
            vel: 0.0,
            radius: BIRD_RADIUS,
        }
    }
}

impl Bird {
    /// One step of gravity integration. Neither velocity nor position is
    /// clamped; the boundary check runs afterwards in the same tick.
    pub fn integrate(&mut self, profile: &DifficultyProfile) {
        self.vel += profile.gravity;
        self.y += self.vel;
    }

    /// Jump impulse: velocity is overridden, not accumulated.
    pub fn flap(&mut self, profile: &DifficultyProfile) {
        self.vel = profile.lift;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn top(&self) -> f32 {
        self.y - self.radius
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.radius
    }

    pub fn left(&self) -> f32 {
        self.x - self.radius
    }

    pub fn right(&self) -> f32 {
        self.x + self.radius
    }
}
