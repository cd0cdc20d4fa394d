mod difficulty;
mod ids;
mod profile;
mod question;
mod question_set;
mod score;
mod session;

pub use ids::{ParseIdError, QuestionId};

pub use difficulty::{Difficulty, DifficultyError};
pub use profile::{
    Gender, MAX_AGE, MIN_AGE, Profile, ProfileDraft, ProfileError, ProfileIdentity, ScoreHistory,
};
pub use question::{OPTION_COUNT, Question, QuestionDraft, QuestionError, QuestionTemplate};
pub use question_set::{CategoryInfo, QuestionSet, QuestionSetError};
pub use score::{ResultTier, ScoreRecord, ScoreRecordError, ScoreSummary, percent};
pub use session::{OptionMark, SessionOutcome, SessionState};
