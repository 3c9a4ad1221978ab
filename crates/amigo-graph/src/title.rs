use amigo_llm::{ChatClient, ChatOptions, ChatRequest, Message};

use crate::prompts::TITLE_PROMPT;

pub const MAX_TITLE_CHARS: usize = 80;

/// First `MAX_TITLE_CHARS` characters of the message
pub fn fallback_title(message: &str) -> String {
    message.trim().chars().take(MAX_TITLE_CHARS).collect()
}

/// Asks the model for a chat title; any failure falls back to truncation
pub async fn generate_title(client: &dyn ChatClient, model: &str, message: &str) -> String {
    let request = ChatRequest::new(model, vec![Message::system(TITLE_PROMPT), Message::human(message)])
        .with_options(ChatOptions::new().max_tokens(40));

    match client.chat(request).await {
        Ok(response) => {
            let title = response
                .content
                .unwrap_or_default()
                .trim()
                .trim_matches(|c| c == '"' || c == '\'')
                .trim_end_matches('.')
                .trim()
                .chars()
                .take(MAX_TITLE_CHARS)
                .collect::<String>();
            if title.is_empty() {
                fallback_title(message)
            } else {
                title
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Title generation failed, truncating message");
            fallback_title(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_truncates_by_chars() {
        let long = "é".repeat(100);
        assert_eq!(fallback_title(&long).chars().count(), MAX_TITLE_CHARS);
        assert_eq!(fallback_title("  short  "), "short");
    }
}
