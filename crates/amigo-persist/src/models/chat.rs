use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Private,
    Public,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DBChat {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl DBChat {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            title: title.into(),
            visibility: Visibility::Private,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}
