//! Scrolling pipe pairs: append at the right edge, evict at the left.

use std::collections::VecDeque;

use log::debug;
use rand::Rng;

use crate::consts::{
    FIRST_PIPE_TOP, PIPE_GAP_MARGIN, PIPE_SPAWN_DISTANCE, PIPE_WIDTH, WORLD_HEIGHT, WORLD_WIDTH,
};

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pipe {
    pub x: f32,
    /// Bottom of the upper pipe (top of the gap).
    pub top: f32,
    /// Top of the lower pipe (bottom of the gap).
    pub bottom: f32,
    pub scored: bool,
}

impl Pipe {
    pub fn new(x: f32, top: f32, gap: f32) -> Self {
        Self {
            x,
            top,
            bottom: top + gap,
            scored: false,
        }
    }

    /// Trailing edge.
    pub fn right(&self) -> f32 {
        self.x + PIPE_WIDTH
    }

    pub fn gap(&self) -> f32 {
        self.bottom - self.top
    }
}

#[derive(Clone, Debug, Default)]
pub struct PipeStream {
    pipes: VecDeque<Pipe>,
}

impl PipeStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and place the fixed opening pipe at the right edge.
    pub fn reseed(&mut self, gap: f32) {
        self.pipes.clear();
        self.pipes
            .push_back(Pipe::new(WORLD_WIDTH, FIRST_PIPE_TOP, gap));
    }

    /// Scroll every pipe left by `speed` units.
    pub fn advance(&mut self, speed: f32) {
        for pipe in &mut self.pipes {
            pipe.x -= speed;
        }
    }

    /// Drop pipes whose trailing edge has left the world. Returns how many.
    pub fn evict(&mut self) -> usize {
        let mut evicted = 0;
        while self.pipes.front().is_some_and(|p| p.right() < 0.0) {
            self.pipes.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("evicted {evicted} pipe(s), {} remaining", self.pipes.len());
        }
        evicted
    }

    /// Append a pipe at the right edge when the stream is empty or the
    /// newest pipe has scrolled far enough in.
    pub fn spawn_if_needed<R: Rng>(&mut self, rng: &mut R, gap: f32) -> bool {
        let due = self
            .pipes
            .back()
            .map_or(true, |p| p.x < WORLD_WIDTH - PIPE_SPAWN_DISTANCE);
        if !due {
            return false;
        }
        let top = random_top(rng, gap);
        self.pipes.push_back(Pipe::new(WORLD_WIDTH, top, gap));
        debug!("spawned pipe gap {top:.1}..{:.1}", top + gap);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pipe> {
        self.pipes.iter()
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Pipe> {
        self.pipes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn first(&self) -> Option<&Pipe> {
        self.pipes.front()
    }

    pub fn last(&self) -> Option<&Pipe> {
        self.pipes.back()
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, pipe: Pipe) {
        self.pipes.push_back(pipe);
    }
}

/// Uniform top edge in `[margin, height - gap - margin]`.
fn random_top<R: Rng>(rng: &mut R, gap: f32) -> f32 {
    let max_top = WORLD_HEIGHT - gap - PIPE_GAP_MARGIN;
    if max_top <= PIPE_GAP_MARGIN {
        return PIPE_GAP_MARGIN;
    }
    rng.gen_range(PIPE_GAP_MARGIN..=max_top)
}
