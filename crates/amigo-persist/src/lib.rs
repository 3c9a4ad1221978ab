pub mod accumulator;
pub mod cache;
pub mod dbs;
pub mod error;
pub mod memory;
pub mod models;
pub mod trait_client;

pub use accumulator::{build_response_messages, sanitize_response_messages};
pub use cache::{ActivityKind, ActivityRecord, CachedProfile, FileProfileCache, ProfileCache};
pub use error::{PersistError, Result};
pub use memory::InMemoryPersistenceClient;
pub use models::{
    DBChat, DBCoursePlan, DBDocument, DBMessage, DBSuggestion, DBUserProfile, MessageContent,
    MessagePart, MessageRole, Visibility,
};
pub use trait_client::PersistenceClient;

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoPersistenceClient;
