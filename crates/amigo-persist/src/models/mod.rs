mod chat;
mod document;
mod message;
mod profile;

pub use chat::{DBChat, Visibility};
pub use document::{DBDocument, DBSuggestion};
pub use message::{DBMessage, MessageContent, MessagePart, MessageRole};
pub use profile::{DBCoursePlan, DBUserProfile};
