//! Payloads shared by tools, storage and the client reducer.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    #[default]
    Text,
    Code,
    Image,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "code" => Ok(Self::Code),
            "image" => Ok(Self::Image),
            other => Err(format!("unknown document kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapEvent {
    pub id: String,
    pub title: String,
}

/// Suggestion as delivered to the client while it streams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPayload {
    pub id: String,
    pub document_id: String,
    pub original_text: String,
    pub suggested_text: String,
    pub description: String,
    #[serde(default)]
    pub is_resolved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Video,
    Article,
    Quiz,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResource {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_read_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseTopic {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModule {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub estimated_time: String,
    #[serde(default)]
    pub topics: Vec<CourseTopic>,
    #[serde(default)]
    pub resources: Vec<CourseResource>,
}

/// Course plan body as generated by the model and saved per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePlanContent {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_estimated_time: Option<String>,
    #[serde(default)]
    pub modules: Vec<CourseModule>,
}

impl CoursePlanContent {
    /// JSON schema handed to the model; `max_modules` caps the module list
    pub fn json_schema(max_modules: usize) -> Value {
        let topic = json!({
            "type": "object",
            "properties": {
                "id": {"type": "string", "description": "Unique identifier for the topic"},
                "title": {"type": "string"},
                "estimatedTime": {"type": "string", "description": "Estimated time to complete this topic"},
                "completed": {"type": "boolean", "default": false}
            },
            "required": ["id", "title", "estimatedTime"]
        });
        let resource = json!({
            "type": "object",
            "properties": {
                "type": {"type": "string", "enum": ["video", "article", "quiz"]},
                "title": {"type": "string"},
                "url": {"type": ["string", "null"]},
                "duration": {"type": ["string", "null"]},
                "estimatedReadTime": {"type": ["string", "null"]},
                "questions": {"type": ["integer", "null"]}
            },
            "required": ["type", "title"]
        });

        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "The title of the course"},
                "description": {"type": "string"},
                "learningObjectives": {"type": "array", "items": {"type": "string"}},
                "totalEstimatedTime": {"type": "string"},
                "modules": {
                    "type": "array",
                    "maxItems": max_modules,
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": {"type": "string"},
                            "title": {"type": "string"},
                            "description": {"type": "string"},
                            "estimatedTime": {"type": "string"},
                            "topics": {"type": "array", "items": topic},
                            "resources": {"type": "array", "items": resource}
                        },
                        "required": ["id", "title", "description", "estimatedTime", "topics", "resources"]
                    }
                }
            },
            "required": ["title", "description", "learningObjectives", "totalEstimatedTime", "modules"]
        })
    }

    /// Checks what the schema alone cannot guarantee from a model
    pub fn validate(&self, max_modules: usize) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("course plan has no title".to_string());
        }
        if self.modules.is_empty() {
            return Err("course plan has no modules".to_string());
        }
        if self.modules.len() > max_modules {
            return Err(format!(
                "course plan has {} modules, at most {} allowed",
                self.modules.len(),
                max_modules
            ));
        }
        Ok(())
    }
}

/// Sets `completed` on the matching topic. Unknown ids leave the modules as they were.
pub fn set_topic_completed(
    modules: &mut [CourseModule],
    module_id: &str,
    topic_id: &str,
    completed: bool,
) -> bool {
    modules
        .iter_mut()
        .filter(|m| m.id == module_id)
        .flat_map(|m| m.topics.iter_mut())
        .find(|t| t.id == topic_id)
        .map(|topic| topic.completed = completed)
        .is_some()
}

/// Learner profile fields collected during the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDetails {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_experience: Option<String>,
    pub learning_goals: String,
    pub current_goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_time_commitment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_knowledge: Option<String>,
}

impl ProfileDetails {
    pub fn avatar_fallback(&self) -> String {
        avatar_fallback(&self.name)
    }
}

/// First character of the name, upper-cased; empty for an empty name
pub fn avatar_fallback(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}
