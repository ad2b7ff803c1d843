use crate::difficulty::Level;

/// Side effects requested by the simulation. Detection code only emits
/// these; playing sounds and drawing the overlay is up to the consumer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// Jump impulse applied.
    Jump,
    /// A pipe was passed; score went up by one.
    Point,
    /// Pipe or boundary collision ended the round. Emitted once per round.
    Hit,
    /// Round reset after game over.
    Restarted,
    LevelChanged(Level),
}
