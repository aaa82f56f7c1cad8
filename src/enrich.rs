//! Digest enrichment via a chat-completion endpoint.
//!
//! One synchronous request per run: the fixed instruction template plus a
//! literal worked example as the system message, the full digest text as
//! the user message. The completion text is returned as-is; its per-section
//! shape is not validated and there is no retry.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

// Prompt templates loaded at compile time
const SYSTEM_TEMPLATE: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/enrich_system.md"
));
const EXAMPLE_SUMMARY: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/example_summary.md"
));

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Connection settings for the enrichment endpoint, assembled once by the
/// caller and passed in explicitly.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Assemble the fixed system instruction with the worked example spliced in.
pub fn build_system_prompt() -> String {
    SYSTEM_TEMPLATE.replace("{example}", EXAMPLE_SUMMARY)
}

/// Send the digest for enrichment and return the single completion's text.
///
/// Auth and transport failures are fatal; by then the intermediate file is
/// already on disk and stays there.
pub fn enrich_digest(config: &EnrichConfig, digest: &str) -> Result<String> {
    let system_prompt = build_system_prompt();
    let request = ChatRequest {
        model: &config.model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: &system_prompt,
            },
            ChatMessage {
                role: "user",
                content: digest,
            },
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    };

    let start = Instant::now();
    let bearer = format!("Bearer {}", config.api_key);
    let mut response = http_agent()
        .post(config.endpoint.as_str())
        .header("Authorization", bearer.as_str())
        .send_json(&request)
        .with_context(|| format!("call completion endpoint {}", config.endpoint))?;
    let completion: ChatResponse = response
        .body_mut()
        .read_json()
        .context("decode completion response")?;
    let content = extract_completion(completion)?;
    let elapsed_ms = start.elapsed().as_millis();

    tracing::info!(
        elapsed_ms,
        prompt_bytes = digest.len(),
        response_bytes = content.len(),
        "enrichment complete"
    );
    Ok(content)
}

fn extract_completion(response: ChatResponse) -> Result<String> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| anyhow!("completion response has no choices"))
}

fn http_agent() -> ureq::Agent {
    // A full completion for a page of listings routinely takes minutes.
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(180)))
        .build()
        .new_agent()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_splices_the_worked_example() {
        let prompt = build_system_prompt();
        assert!(prompt.contains("coqui-ai/TTS"));
        assert!(prompt.contains("Needs Compilation?"));
        assert!(!prompt.contains("{example}"));
    }

    #[test]
    fn request_serializes_expected_shape() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "instructions",
                },
                ChatMessage {
                    role: "user",
                    content: "digest",
                },
            ],
            max_tokens: 4000,
            temperature: 0.7,
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 4000);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "digest");
    }

    #[test]
    fn completion_text_comes_from_the_first_choice() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "enriched"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_completion(response).unwrap(), "enriched");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(extract_completion(response).is_err());
    }
}
