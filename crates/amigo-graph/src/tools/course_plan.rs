use amigo_llm::{generate_object, ObjectRequest};
use amigo_persist::{ActivityKind, ActivityRecord};
use amigo_types::{CoursePlanContent, CoursePlanSaved, DataPart};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolContext, ToolError};
use crate::prompts::{course_plan_request, COURSE_PLAN_PROMPT};

const COURSE_URL: &str = "/course";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateArgs {
    learning_goals: String,
    #[serde(default)]
    prior_knowledge: Option<String>,
    #[serde(default)]
    daily_time_commitment: Option<String>,
    current_goal: String,
}

pub struct GenerateCoursePlanTool;

impl GenerateCoursePlanTool {
    async fn generate(&self, args: &GenerateArgs, ctx: &ToolContext) -> Result<CoursePlanContent, ToolError> {
        let max_modules = ctx.config().max_course_modules;
        let request = ObjectRequest::new(
            ctx.model.clone(),
            "course_plan",
            CoursePlanContent::json_schema(max_modules),
        )
        .system(format!("{} Use at most {} modules.", COURSE_PLAN_PROMPT, max_modules))
        .prompt(course_plan_request(
            &args.learning_goals,
            &args.current_goal,
            args.prior_knowledge.as_deref(),
            args.daily_time_commitment.as_deref(),
            max_modules,
        ));

        let plan: CoursePlanContent = generate_object(ctx.chat_client(), request).await?;
        plan.validate(max_modules).map_err(ToolError::Upstream)?;
        Ok(plan)
    }
}

#[async_trait]
impl Tool for GenerateCoursePlanTool {
    fn name(&self) -> &'static str {
        "generateInitialCoursePlan"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Generate a detailed course plan from the learner's goals. Use it after the learner confirms they want a detailed plan.",
            json!({
                "type": "object",
                "properties": {
                    "learningGoals": {"type": "string"},
                    "priorKnowledge": {"type": "string"},
                    "dailyTimeCommitment": {"type": "string"},
                    "currentGoal": {"type": "string"}
                },
                "required": ["learningGoals", "currentGoal"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let args: GenerateArgs = parse_args(args)?;
        tracing::info!(current_goal = %args.current_goal, "Generating course plan");

        match self.generate(&args, ctx).await {
            Ok(plan) => Ok(json!({
                "success": true,
                "message": "Your course plan has been generated successfully. Click below to view your course plan.",
                "showCourseButton": true,
                "courseUrl": COURSE_URL,
                "coursePlan": plan,
            })),
            Err(e) => {
                tracing::error!(error = %e, "Course plan generation failed");
                Ok(json!({
                    "success": false,
                    "message": "There was an error generating your course plan. Please try again.",
                }))
            }
        }
    }
}

pub struct SaveCoursePlanTool;

#[async_trait]
impl Tool for SaveCoursePlanTool {
    fn name(&self) -> &'static str {
        "saveCoursePlan"
    }

    fn definition(&self) -> amigo_llm::Tool {
        let mut parameters = CoursePlanContent::json_schema(usize::MAX);
        if let Some(modules) = parameters.pointer_mut("/properties/modules") {
            if let Some(map) = modules.as_object_mut() {
                map.remove("maxItems");
            }
        }
        if let Some(required) = parameters.get_mut("required") {
            *required = json!(["title", "description", "modules"]);
        }

        amigo_llm::Tool::new(
            self.name(),
            "Save the finalized course plan after the learner has reviewed and approved it.",
            parameters,
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let plan: CoursePlanContent = parse_args(args)?;

        let Some(user_id) = ctx.user_id.clone() else {
            return Ok(json!({
                "success": false,
                "message": "You must be logged in to save a course plan.",
            }));
        };

        let saved = match ctx.persistence().save_course_plan(&user_id, plan).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Failed to save course plan");
                return Ok(json!({
                    "success": false,
                    "message": "There was an error saving your course plan. Please try again.",
                }));
            }
        };

        if let Some(cache) = &ctx.services.profile_cache {
            let activity = ActivityRecord::new(&user_id, ActivityKind::CoursePlanCreate, &saved.plan.title);
            if let Err(e) = cache.record_activity(&activity).await {
                tracing::warn!(error = %e, "Failed to record course plan activity");
            }
        }

        ctx.writer
            .write_data(DataPart::CoursePlanSave(CoursePlanSaved { course_id: user_id }))
            .await?;

        Ok(json!({
            "success": true,
            "message": "Your course plan has been saved successfully. You can access it from your dashboard or view it now.",
            "showCourseButton": true,
            "courseUrl": COURSE_URL,
        }))
    }
}
