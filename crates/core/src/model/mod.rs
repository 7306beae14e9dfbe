mod course;
mod enrollment;
mod ids;
mod quiz;
mod user;

pub use ids::{ParseIdError, QuizId, UserId};

pub use course::{ChapterDefinition, Course, CourseError, CourseTitle, Topic, TopicCursor};
pub use enrollment::{ChapterProgress, EnrollmentDraft, EnrollmentError, EnrollmentRecord};
pub use quiz::{AnswerOutcome, QUIZ_QUESTION_LIMIT, Question, Quiz, QuizAttempt, QuizError};
pub use user::{
    Email, PASSWORD_MAX_LEN, PASSWORD_MIN_LEN, UserError, UserProfile, validate_display_name,
    validate_password,
};
