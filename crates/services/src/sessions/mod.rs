mod controller;
mod progress;
mod runner;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use controller::{AdvanceOutcome, AnswerFeedback, SessionController};
pub use progress::SessionProgress;
pub use runner::{PendingAdvance, QuizRunner};
pub use workflow::{DEFAULT_ADVANCE_DELAY, QuizLoopService};
