use amigo_types::{DataPart, RoadmapEvent};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolContext, ToolError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoadmapArgs {
    roadmap_events: Vec<RoadmapEvent>,
}

pub struct CreateRoadmapTool;

#[async_trait]
impl Tool for CreateRoadmapTool {
    fn name(&self) -> &'static str {
        "createRoadmap"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Create a learning roadmap as an ordered list of steps. Use it when the user asks for a plan, schedule or roadmap.",
            json!({
                "type": "object",
                "properties": {
                    "roadmapEvents": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "id": {"type": "string", "description": "Unique id such as \"week-1-setup\""},
                                "title": {"type": "string", "description": "Display name of the step"}
                            },
                            "required": ["id", "title"]
                        }
                    }
                },
                "required": ["roadmapEvents"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let RoadmapArgs { roadmap_events } = parse_args(args)?;
        let count = roadmap_events.len();

        ctx.writer.write_data(DataPart::RoadmapCreation(roadmap_events)).await?;

        Ok(json!({
            "success": true,
            "message": format!("Roadmap created with {} event(s). The roadmap is being displayed.", count),
        }))
    }
}
