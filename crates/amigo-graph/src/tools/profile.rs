use amigo_persist::{ActivityKind, ActivityRecord, CachedProfile, DBUserProfile};
use amigo_types::ProfileDetails;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolContext, ToolError};

const STORAGE_WARNING: &str = "Your profile information was processed but there was an issue with storage. \
Your profile data may not persist between sessions.";

/// User id the local cache files a profile under when nobody is signed in
const LOCAL_USER: &str = "local";

pub struct UserProfileTool;

impl UserProfileTool {
    /// Primary store first, then the local cache; the first failure wins
    async fn store(&self, details: &ProfileDetails, ctx: &ToolContext) -> Result<(), ToolError> {
        if let Some(user_id) = &ctx.user_id {
            ctx.persistence()
                .upsert_profile(DBUserProfile::from_details(user_id, details))
                .await?;
        }

        if let Some(cache) = &ctx.services.profile_cache {
            let owner = ctx.user_id.as_deref().unwrap_or(LOCAL_USER);
            cache.save_profile(&CachedProfile::new(owner, details.clone())).await?;
            cache
                .record_activity(&ActivityRecord::new(
                    owner,
                    ActivityKind::ProfileCreate,
                    format!("Profile created for {}", details.name),
                ))
                .await?;
        }
        Ok(())
    }
}

fn profile_summary(details: &ProfileDetails) -> Value {
    let or_empty = |v: &Option<String>| v.clone().unwrap_or_default();
    json!({
        "userProfile": {
            "name": details.name,
            "education": or_empty(&details.education),
            "pastExperience": or_empty(&details.past_experience),
            "learningGoals": details.learning_goals,
            "avatarFallback": details.avatar_fallback(),
            "dailyTimeCommitment": or_empty(&details.daily_time_commitment),
            "priorKnowledge": or_empty(&details.prior_knowledge),
        },
        "currentGoal": details.current_goal,
    })
}

#[async_trait]
impl Tool for UserProfileTool {
    fn name(&self) -> &'static str {
        "userProfileGeneration"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Generate the learner's dashboard profile from what they shared in the conversation.",
            json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "The name of the user"},
                    "education": {"type": "string", "description": "Educational background"},
                    "pastExperience": {"type": "string", "description": "Past work or relevant experience"},
                    "learningGoals": {"type": "string", "description": "Learning objectives and aspirations"},
                    "currentGoal": {"type": "string", "description": "The learning goal to focus on now"},
                    "dailyTimeCommitment": {"type": "string", "description": "Time available per day"},
                    "priorKnowledge": {"type": "string", "description": "Prior knowledge of the subject"}
                },
                "required": ["name", "learningGoals", "currentGoal"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let details: ProfileDetails = parse_args(args)?;

        match self.store(&details, ctx).await {
            Ok(()) => Ok(json!({
                "success": true,
                "message": format!(
                    "Profile created for {}! You can now view your complete profile and learning activity on the dashboard.",
                    details.name
                ),
                "showDashboardButton": true,
                "dashboardUrl": "/dashboard",
                "profile": profile_summary(&details),
            })),
            Err(e) => {
                tracing::error!(error = %e, name = %details.name, "Failed to store profile");
                Ok(json!({
                    "success": true,
                    "message": format!("Profile processed for {}. You can view it on the dashboard.", details.name),
                    "showDashboardButton": true,
                    "dashboardUrl": "/dashboard",
                    "profile": profile_summary(&details),
                    "warning": STORAGE_WARNING,
                }))
            }
        }
    }
}
