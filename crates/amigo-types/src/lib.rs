pub mod config;
pub mod domain;
pub mod events;
pub mod reducer;
pub mod state;

pub use config::{ChatModel, GraphConfig, LLMConfig, ModelCatalog, ModelProvider};
pub use domain::{
    avatar_fallback, set_topic_completed, CourseModule, CoursePlanContent, CourseResource,
    CourseTopic, DocumentKind, ProfileDetails, ResourceType, RoadmapEvent, SuggestionPayload,
};
pub use events::{CoursePlanSaved, DataPart, EventCategory, SequencedEvent, StreamEvent};
pub use reducer::{ArtifactPanel, ArtifactStatus, RoadmapView, StreamReducer};
pub use state::{TurnInput, TurnState};
