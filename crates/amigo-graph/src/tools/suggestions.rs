use amigo_llm::{stream_elements, ObjectRequest};
use amigo_persist::DBSuggestion;
use amigo_types::{DataPart, SuggestionPayload};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolContext, ToolError};
use crate::prompts::SUGGESTIONS_PROMPT;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionArgs {
    document_id: String,
}

/// One array element as the model produces it
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionElement {
    original_sentence: String,
    suggested_sentence: String,
    #[serde(default)]
    description: String,
}

pub struct RequestSuggestionsTool;

#[async_trait]
impl Tool for RequestSuggestionsTool {
    fn name(&self) -> &'static str {
        "requestSuggestions"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Request suggestions for a document",
            json!({
                "type": "object",
                "properties": {
                    "documentId": {"type": "string", "description": "The ID of the document to request edits for"}
                },
                "required": ["documentId"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let SuggestionArgs { document_id } = parse_args(args)?;

        let document = match ctx.persistence().get_document(&document_id).await? {
            Some(doc) if doc.content.as_deref().is_some_and(|c| !c.is_empty()) => doc,
            _ => return Ok(json!({ "error": "Document not found" })),
        };

        let element_schema = json!({
            "type": "object",
            "properties": {
                "originalSentence": {"type": "string", "description": "The original sentence"},
                "suggestedSentence": {"type": "string", "description": "The suggested sentence"},
                "description": {"type": "string", "description": "The description of the suggestion"}
            },
            "required": ["originalSentence", "suggestedSentence", "description"]
        });
        let max = ctx.config().max_suggestions;
        let request = ObjectRequest::new(ctx.model.clone(), "suggestions", element_schema)
            .system(format!("{} At most {} suggestions.", SUGGESTIONS_PROMPT, max))
            .prompt(document.content.clone().unwrap_or_default());

        let mut elements = stream_elements(ctx.chat_client(), request, Some(max)).await?;
        let mut suggestions = Vec::new();

        while let Some(element) = elements.next().await {
            let element: SuggestionElement = match serde_json::from_value(element?) {
                Ok(element) => element,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping malformed suggestion");
                    continue;
                }
            };
            let payload = SuggestionPayload {
                id: uuid::Uuid::new_v4().to_string(),
                document_id: document_id.clone(),
                original_text: element.original_sentence,
                suggested_text: element.suggested_sentence,
                description: element.description,
                is_resolved: false,
            };
            ctx.writer.write_data(DataPart::Suggestion(payload.clone())).await?;
            suggestions.push(payload);
        }

        let count = suggestions.len();
        if let Some(user_id) = &ctx.user_id {
            let rows = suggestions
                .iter()
                .map(|s| DBSuggestion::from_payload(s, document.created_at, user_id.as_str()))
                .collect();
            ctx.persistence().save_suggestions(rows).await?;
        }

        Ok(json!({
            "id": document_id,
            "title": document.title,
            "kind": document.kind,
            "message": "Suggestions have been added to the document",
            "count": count,
        }))
    }
}
