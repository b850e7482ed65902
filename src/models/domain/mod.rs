pub mod profile;
pub mod quiz;
pub mod quiz_question;
pub mod user;
pub use profile::Profile;
pub use quiz::{Comment, Like, Quiz, QuizContent};
pub use quiz_question::QuizQuestion;
pub use user::{User, UserChanges};
