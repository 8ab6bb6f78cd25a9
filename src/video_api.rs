use rand::Rng;
use serde_json::Value;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use trendscope::keywords::{KeywordObservation, KeywordVideo};
use trendscope::scoring::parse_timestamp;
use trendscope::now_epoch_secs;

const MAX_ATTEMPTS_PER_KEY: usize = 2;

/// RapidAPI-style video search + autocomplete collaborator. Carries a set
/// of API keys and rotates to the next one on rate limits, with a jittered
/// backoff between attempts.
#[derive(Clone)]
pub struct VideoApiClient {
    client: reqwest::Client,
    api_base: String,
    api_host: String,
    keys: Vec<String>,
    active_key: Arc<AtomicUsize>,
}

impl VideoApiClient {
    pub fn from_env() -> Option<Self> {
        let raw_keys = env::var("RAPIDAPI_KEYS")
            .or_else(|_| env::var("RAPIDAPI_KEY"))
            .ok()?;
        let keys: Vec<String> = raw_keys
            .split(',')
            .map(|key| decode_key(key.trim()))
            .filter(|key| !key.is_empty())
            .collect();
        if keys.is_empty() {
            return None;
        }

        let api_base = env::var("VIDEO_API_BASE")
            .unwrap_or_else(|_| "https://yt-api.p.rapidapi.com".to_string());
        let api_host = env::var("VIDEO_API_HOST").unwrap_or_else(|_| {
            api_base
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/')
                .to_string()
        });

        Some(Self {
            client: reqwest::Client::new(),
            api_base,
            api_host,
            keys,
            active_key: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Fetches search volume, recent result videos, and autocomplete
    /// suggestions for one keyword. A suggestion failure degrades to an
    /// empty list; the search call is required.
    pub async fn observe_keyword(&self, keyword: &str) -> Result<KeywordObservation, String> {
        let search = self.search(keyword).await?;
        let suggestions = match self.suggestions(keyword).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(keyword, error = %err, "suggestion lookup failed");
                Vec::new()
            }
        };

        let now = now_epoch_secs();
        let videos = search
            .data
            .iter()
            .filter_map(|entry| parse_video(entry, now))
            .collect();

        Ok(KeywordObservation {
            keyword: keyword.to_string(),
            estimated_results: search.estimated_results,
            videos,
            suggestions,
        })
    }

    async fn search(&self, query: &str) -> Result<SearchPayload, String> {
        let body = self
            .get_with_rotation("search", &[("query", query), ("type", "video")])
            .await?;

        let estimated_results = body
            .get("estimatedResults")
            .map(count_value)
            .unwrap_or(0);
        let data = body
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Ok(SearchPayload {
            estimated_results,
            data,
        })
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, String> {
        let body = self
            .get_with_rotation("suggestions", &[("query", query)])
            .await?;

        let entries = body
            .get("suggestions")
            .or_else(|| body.get("data"))
            .and_then(Value::as_array)
            .cloned()
            .or_else(|| body.as_array().cloned())
            .unwrap_or_default();

        Ok(entries
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    async fn get_with_rotation(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, String> {
        let url = format!("{}/{}", self.api_base.trim_end_matches('/'), path);
        let max_attempts = self.keys.len() * MAX_ATTEMPTS_PER_KEY;
        let mut last_error = String::new();

        for attempt in 0..max_attempts {
            let key_index = self.active_key.load(Ordering::Relaxed) % self.keys.len();
            let response = self
                .client
                .get(&url)
                .query(query)
                .header("x-rapidapi-key", &self.keys[key_index])
                .header("x-rapidapi-host", &self.api_host)
                .send()
                .await
                .map_err(|err| format!("video API request failed: {}", err))?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!(path, key_index, "video API rate limited, rotating key");
                self.active_key
                    .store((key_index + 1) % self.keys.len(), Ordering::Relaxed);
                last_error = format!("video API error: {}", status);
                tokio::time::sleep(backoff_delay(attempt)).await;
                continue;
            }
            if !status.is_success() {
                let error_body = response.text().await.unwrap_or_else(|_| String::new());
                let detail = error_body.trim();
                if detail.is_empty() {
                    return Err(format!("video API error: {}", status));
                }
                return Err(format!("video API error: {} {}", status, detail));
            }

            return response
                .json::<Value>()
                .await
                .map_err(|err| format!("video API response parse failed: {}", err));
        }

        Err(if last_error.is_empty() {
            "video API request exhausted retries".to_string()
        } else {
            last_error
        })
    }
}

struct SearchPayload {
    estimated_results: u64,
    data: Vec<Value>,
}

fn parse_video(entry: &Value, now: i64) -> Option<KeywordVideo> {
    let object = entry.as_object()?;
    let title = object
        .get("title")
        .or_else(|| object.get("desc"))
        .and_then(Value::as_str)?
        .to_string();
    let views = object
        .get("viewCount")
        .or_else(|| object.get("views"))
        .or_else(|| object.get("playCount"))
        .map(count_value)
        .unwrap_or(0);
    let published = object
        .get("publishDate")
        .or_else(|| object.get("publishedAt"))
        .or_else(|| object.get("createTime"))
        .and_then(parse_timestamp)?;
    if published > now {
        return None;
    }

    Some(KeywordVideo {
        title,
        views,
        age_days: (now - published) as f64 / 86_400.0,
    })
}

fn count_value(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number.as_u64().unwrap_or(0),
        Value::String(text) => text.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn backoff_delay(attempt: usize) -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..250);
    Duration::from_millis(500 * (attempt as u64 + 1) + jitter_ms)
}

fn decode_key(value: &str) -> String {
    if value.contains('%') {
        match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        }
    } else {
        value.to_string()
    }
}
