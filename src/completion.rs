use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::env;

use trendscope::keywords::parse_keyword_candidates;

/// OpenAI-compatible chat-completion collaborator. Free text in, free text
/// out; the scoring core never sees this client.
#[derive(Clone)]
pub struct CompletionClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl CompletionClient {
    pub fn from_env(model_override: Option<String>) -> Option<Self> {
        let api_key = env::var("AI_API_KEY").ok()?;
        let api_base =
            env::var("AI_API_BASE").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        let model = model_override
            .or_else(|| env::var("AI_MODEL").ok())
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        let client = reqwest::Client::new();
        Some(Self {
            client,
            api_key,
            api_base,
            model,
        })
    }

    pub async fn create_completion(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, String> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|err| format!("completion request failed: {}", err))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(format!("completion API error: {}", status));
            }
            return Err(format!("completion API error: {} {}", status, detail));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|err| format!("completion response parse failed: {}", err))?;

        let content = body
            .choices
            .first()
            .ok_or_else(|| "completion response missing choices".to_string())?
            .message
            .content
            .trim()
            .to_string();

        Ok(content)
    }

    /// Asks the model for keyword candidates covering a piece of content.
    pub async fn propose_keywords(
        &self,
        content: &str,
        max_keywords: usize,
    ) -> Result<Vec<String>, String> {
        let messages = vec![
            ChatMessage {
                role: "system".to_string(),
                content: keyword_prompt(max_keywords),
            },
            ChatMessage {
                role: "user".to_string(),
                content: format!("Content:\n{}", content),
            },
        ];
        let response = self.create_completion(messages, 0.3, 300).await?;
        let candidates = parse_keyword_candidates(&response, max_keywords);
        if candidates.is_empty() {
            return Err("completion response contained no keywords".to_string());
        }
        Ok(candidates)
    }
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

fn keyword_prompt(max_keywords: usize) -> String {
    format!(
        r#"You suggest search keywords a video about the given content could rank for.
Return a single JSON array of at most {} short keyword phrases.
Rules:
- Output JSON only, no markdown or commentary.
- Each phrase is 1-4 words, lowercase, no hashtags.
"#,
        max_keywords
    )
}
