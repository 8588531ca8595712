pub mod billing;
pub mod catalog;
pub mod profile;
pub mod study;
pub mod usage;

pub use billing::Subscription;
pub use catalog::{Discipline, ExamBoard, Question, QuestionCorrection, QuestionFilter, Subject, Subtopic};
pub use profile::{Profile, UserStats};
pub use study::{Answer, ReadingProgress, Summary, Theory};
pub use usage::UsageRecord;
