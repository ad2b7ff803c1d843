use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DifficultyError {
    /// The requested name is not one of `easy`, `medium` or `hard`.
    UnknownLevel { name: String },
    /// Levels can only be changed while a round is running.
    SelectionLocked,
}

impl fmt::Display for DifficultyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLevel { name } => {
                write!(f, "unknown difficulty level {name:?} (expected easy, medium or hard)")
            }
            Self::SelectionLocked => write!(f, "difficulty cannot change after game over"),
        }
    }
}

impl std::error::Error for DifficultyError {}
