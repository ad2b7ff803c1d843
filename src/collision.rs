//! Collision and scoring checks.
//!
//! Everything here is side-effect free: `evaluate` reports what happened in
//! the current tick and the game controller decides what to do with it.

use crate::bird::Bird;
use crate::pipes::Pipe;

/// Result of checking the bird against every pipe for one tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    pub hit_pipe: bool,
    /// Indices (in stream order) of unscored pipes the bird has now passed.
    pub passed: Vec<usize>,
}

/// The bird's bounding square overlaps the pipe's horizontal span.
pub fn overlaps_horizontally(bird: &Bird, pipe: &Pipe) -> bool {
    bird.right() > pipe.x && bird.left() < pipe.right()
}

/// The bird's centre is outside the safe gap while overlapping the pipe.
pub fn hits_pipe(bird: &Bird, pipe: &Pipe) -> bool {
    overlaps_horizontally(bird, pipe) && (bird.y <= pipe.top || bird.y >= pipe.bottom)
}

/// The pipe's trailing edge is left of the bird.
pub fn has_passed(bird: &Bird, pipe: &Pipe) -> bool {
    pipe.right() < bird.x
}

/// The bird touches the floor or ceiling of a world `height` units tall.
pub fn out_of_bounds(bird: &Bird, height: f32) -> bool {
    bird.bottom() > height || bird.top() < 0.0
}

pub fn evaluate<'a, I>(bird: &Bird, pipes: I) -> Contacts
where
    I: IntoIterator<Item = &'a Pipe>,
{
    let mut contacts = Contacts::default();
    for (index, pipe) in pipes.into_iter().enumerate() {
        if hits_pipe(bird, pipe) {
            contacts.hit_pipe = true;
        }
        if !pipe.scored && has_passed(bird, pipe) {
            contacts.passed.push(index);
        }
    }
    contacts
}
