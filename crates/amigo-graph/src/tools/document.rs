use amigo_llm::{stream_object, ChatRequest, ImageRequest, Message, ObjectRequest, StreamEvent};
use amigo_persist::DBDocument;
use amigo_types::{DataPart, DocumentKind};
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolContext, ToolError};
use crate::data_stream::ArtifactWriter;
use crate::prompts::{update_document_prompt, CODE_DOCUMENT_PROMPT, TEXT_DOCUMENT_PROMPT};

const CREATED_MESSAGE: &str = "A document was created and is now visible to the user.";
const UPDATED_MESSAGE: &str = "The document has been updated successfully.";

/// Streams freshly generated content of `kind` into the artifact and
/// returns the final content
async fn generate_into(
    ctx: &ToolContext,
    artifact: &ArtifactWriter,
    kind: DocumentKind,
    system: String,
    prompt: &str,
) -> Result<String, ToolError> {
    match kind {
        DocumentKind::Text => {
            let request = ChatRequest::new(
                ctx.model.clone(),
                vec![Message::system(system), Message::human(prompt)],
            );
            let mut events = ctx.chat_client().chat_stream(request).await?;

            let mut draft = String::new();
            while let Some(event) = events.next().await {
                if let StreamEvent::Message { content } = event? {
                    draft.push_str(&content);
                    artifact.delta(DataPart::TextDelta(content)).await?;
                }
            }
            Ok(draft)
        }
        DocumentKind::Code => {
            let schema = json!({
                "type": "object",
                "properties": {"code": {"type": "string"}},
                "required": ["code"]
            });
            let request = ObjectRequest::new(ctx.model.clone(), "code", schema)
                .system(system)
                .prompt(prompt);
            let mut partials = stream_object(ctx.chat_client(), request).await?;

            let mut draft = String::new();
            while let Some(partial) = partials.next().await {
                let partial = partial?;
                let Some(code) = partial.get("code").and_then(Value::as_str) else {
                    continue;
                };
                if !code.is_empty() && code != draft {
                    draft = code.to_string();
                    artifact.delta(DataPart::CodeDelta(draft.clone())).await?;
                }
            }
            Ok(draft)
        }
        DocumentKind::Image => {
            let client = ctx
                .services
                .image_client
                .as_ref()
                .ok_or_else(|| ToolError::Upstream("no image model configured".to_string()))?;
            let image = client
                .generate_image(ImageRequest::new(ctx.services.image_model.clone(), prompt))
                .await?;
            artifact.delta(DataPart::ImageDelta(image.base64.clone())).await?;
            Ok(image.base64)
        }
    }
}

fn system_for(kind: DocumentKind) -> String {
    match kind {
        DocumentKind::Code => CODE_DOCUMENT_PROMPT.to_string(),
        _ => TEXT_DOCUMENT_PROMPT.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    title: String,
    kind: DocumentKind,
}

pub struct CreateDocumentTool;

#[async_trait]
impl Tool for CreateDocumentTool {
    fn name(&self) -> &'static str {
        "createDocument"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Create a document for writing or content creation, including code and images. Its content is generated from the title and kind.",
            json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "kind": {"type": "string", "enum": ["text", "code", "image"]}
                },
                "required": ["title", "kind"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let CreateArgs { title, kind } = parse_args(args)?;
        let id = uuid::Uuid::new_v4().to_string();

        let mut artifact = ctx.writer.artifact();
        artifact.write_header(&id, &title, kind).await?;
        artifact.clear("").await?;
        let generated = generate_into(ctx, &artifact, kind, system_for(kind), &title).await;
        artifact.finish().await?;
        let content = generated?;

        if let Some(user_id) = &ctx.user_id {
            ctx.persistence()
                .save_document(DBDocument::new_version(&id, &title, kind, content, user_id))
                .await?;
        }

        tracing::info!(document_id = %id, kind = %kind, "Created document");

        Ok(json!({
            "id": id,
            "title": title,
            "kind": kind,
            "content": CREATED_MESSAGE,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    id: String,
    description: String,
}

pub struct UpdateDocumentTool;

#[async_trait]
impl Tool for UpdateDocumentTool {
    fn name(&self) -> &'static str {
        "updateDocument"
    }

    fn definition(&self) -> amigo_llm::Tool {
        amigo_llm::Tool::new(
            self.name(),
            "Update a document with the given description.",
            json!({
                "type": "object",
                "properties": {
                    "id": {"type": "string", "description": "The ID of the document to update"},
                    "description": {"type": "string", "description": "The changes that need to be made"}
                },
                "required": ["id", "description"]
            }),
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<Value, ToolError> {
        let UpdateArgs { id, description } = parse_args(args)?;

        let Some(document) = ctx.persistence().get_document(&id).await? else {
            return Ok(json!({ "error": "Document not found" }));
        };
        let current = document.content.clone().unwrap_or_default();

        let mut artifact = ctx.writer.artifact();
        artifact.clear(document.title.clone()).await?;
        let generated = generate_into(
            ctx,
            &artifact,
            document.kind,
            update_document_prompt(&current, document.kind),
            &description,
        )
        .await;
        artifact.finish().await?;
        let content = generated?;

        if let Some(user_id) = &ctx.user_id {
            ctx.persistence()
                .save_document(DBDocument::new_version(
                    &id,
                    &document.title,
                    document.kind,
                    content,
                    user_id,
                ))
                .await?;
        }

        Ok(json!({
            "id": id,
            "title": document.title,
            "kind": document.kind,
            "content": UPDATED_MESSAGE,
        }))
    }
}
