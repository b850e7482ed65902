pub mod profile_repository;
pub mod quiz_repository;
pub mod user_repository;

pub use profile_repository::{MongoProfileRepository, ProfileRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
