use amigo_types::{CoursePlanContent, ProfileDetails};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBUserProfile {
    pub user_id: String,
    pub name: String,
    pub education: Option<String>,
    pub past_experience: Option<String>,
    pub learning_goals: Option<String>,
    pub current_goal: Option<String>,
    pub daily_time_commitment: Option<String>,
    pub prior_knowledge: Option<String>,
    pub avatar_fallback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DBUserProfile {
    pub fn from_details(user_id: impl Into<String>, details: &ProfileDetails) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            name: details.name.clone(),
            education: details.education.clone(),
            past_experience: details.past_experience.clone(),
            learning_goals: Some(details.learning_goals.clone()),
            current_goal: Some(details.current_goal.clone()),
            daily_time_commitment: details.daily_time_commitment.clone(),
            prior_knowledge: details.prior_knowledge.clone(),
            avatar_fallback: Some(details.avatar_fallback()),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBCoursePlan {
    pub id: String,
    pub user_id: String,
    #[serde(flatten)]
    pub plan: CoursePlanContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DBCoursePlan {
    pub fn new(user_id: impl Into<String>, plan: CoursePlanContent) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            plan,
            created_at: now,
            updated_at: now,
        }
    }
}
