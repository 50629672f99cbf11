pub mod certificate;
pub mod course;
pub mod forum;
pub mod practice_task;
pub mod progress;
pub mod quiz_question;
pub mod user;

pub use certificate::Certificate;
pub use course::{Course, Lesson};
pub use forum::{ForumReply, ForumThread, ThreadQuery};
pub use practice_task::PracticeTask;
pub use progress::{LessonProgress, Progress};
pub use quiz_question::QuizQuestion;
pub use user::{Skill, SkillBranch, SkillTrack, SkillTree, User};
