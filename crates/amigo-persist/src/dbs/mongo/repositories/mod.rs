pub mod chat;
pub mod course_plan;
pub mod document;
pub mod message;
pub mod profile;

pub use chat::MongoChatRepository;
pub use course_plan::MongoCoursePlanRepository;
pub use document::{MongoDocumentRepository, MongoSuggestionRepository};
pub use message::MongoMessageRepository;
pub use profile::MongoProfileRepository;
