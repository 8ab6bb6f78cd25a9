pub mod config;
pub mod keywords;
pub mod scoring;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::AnalyzerConfig;
use crate::scoring::{parse_timestamp, AnalysisPipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Views,
    Date,
}

impl SortBy {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "views" | "plays" | "play_count" => Some(SortBy::Views),
            "date" | "recent" | "newest" => Some(SortBy::Date),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::Views => "views",
            SortBy::Date => "date",
        }
    }
}

impl Default for SortBy {
    fn default() -> Self {
        SortBy::Views
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendStatus {
    Emerging,
    Trending,
    Viral,
    Mature,
}

impl TrendStatus {
    pub fn label(self) -> &'static str {
        match self {
            TrendStatus::Emerging => "emerging",
            TrendStatus::Trending => "trending",
            TrendStatus::Viral => "viral",
            TrendStatus::Mature => "mature",
        }
    }
}

/// A single record from an upstream video/search API, reduced to the fields
/// the scoring engine reads. `author` passes through untouched.
#[derive(Debug, Clone)]
pub struct RawItem {
    pub id: String,
    pub title: String,
    pub create_time: Option<i64>,
    pub play_count: u64,
    pub digg_count: u64,
    pub share_count: u64,
    pub comment_count: u64,
    pub hashtags: Vec<String>,
    pub author: Option<Value>,
}

impl RawItem {
    /// Extracts a raw item from an arbitrary JSON value. Records wrapped in
    /// an `item` key are unwrapped transparently. Returns `None` when the
    /// value is not an object or carries no usable id.
    pub fn from_value(value: &Value) -> Option<Self> {
        let mut object = value.as_object()?;
        if let Some(inner) = object.get("item").and_then(Value::as_object) {
            object = inner;
        }

        let id = first_string(object, &["id", "video_id", "videoId", "aweme_id"])?;

        let create_time = first_field(
            object,
            &["createTime", "create_time", "publishDate", "publishedAt", "createDate"],
        )
        .and_then(parse_timestamp);

        Some(Self {
            id,
            title: first_string(object, &["desc", "title", "description"]).unwrap_or_default(),
            create_time,
            play_count: first_count(object, &["playCount", "play_count", "views", "viewCount"]),
            digg_count: first_count(object, &["diggCount", "digg_count", "likes", "likeCount"]),
            share_count: first_count(object, &["shareCount", "share_count", "shares"]),
            comment_count: first_count(object, &["commentCount", "comment_count", "comments"]),
            hashtags: collect_hashtags(object),
            author: object.get("author").cloned(),
        })
    }
}

fn first_field<'a>(object: &'a serde_json::Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| object.get(*key))
}

fn first_string(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    match first_field(object, keys)? {
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn first_count(object: &serde_json::Map<String, Value>, keys: &[&str]) -> u64 {
    match first_field(object, keys) {
        Some(Value::Number(number)) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
            .unwrap_or(0),
        Some(Value::String(text)) => text.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

fn collect_hashtags(object: &serde_json::Map<String, Value>) -> Vec<String> {
    let Some(entries) =
        first_field(object, &["challenges", "hashtags", "tags"]).and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let mut hashtags = Vec::new();
    for entry in entries {
        let tag = match entry {
            Value::String(text) => Some(text.as_str()),
            Value::Object(tag_object) => tag_object
                .get("title")
                .or_else(|| tag_object.get("name"))
                .or_else(|| tag_object.get("hashtagName"))
                .and_then(Value::as_str),
            _ => None,
        };
        if let Some(tag) = tag {
            let normalized = tag.trim().trim_start_matches('#').to_lowercase();
            if !normalized.is_empty() {
                hashtags.push(normalized);
            }
        }
    }
    hashtags
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedItem {
    pub id: String,
    pub title: String,
    pub author: Option<Value>,
    pub create_time: i64,
    pub play_count: u64,
    pub digg_count: u64,
    pub share_count: u64,
    pub comment_count: u64,
    pub hashtags: Vec<String>,
    pub age_hours: f64,
    pub views_per_hour: u64,
    pub engagement_rate: f64,
    pub viral_potential: u8,
    pub trend_status: TrendStatus,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusCounts {
    pub emerging: usize,
    pub trending: usize,
    pub viral: usize,
    pub mature: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: TrendStatus) {
        match status {
            TrendStatus::Emerging => self.emerging += 1,
            TrendStatus::Trending => self.trending += 1,
            TrendStatus::Viral => self.viral += 1,
            TrendStatus::Mature => self.mature += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HashtagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub total_videos: usize,
    pub duplicates_skipped: usize,
    pub zero_view_skipped: usize,
    pub invalid_skipped: usize,
    pub avg_viral_potential: f64,
    pub median_viral_potential: f64,
    pub status_counts: StatusCounts,
    pub hot_score: u8,
    pub engagement_score: u8,
    pub total_score: u8,
    pub trend_summary: String,
    pub top_hashtags: Vec<HashtagCount>,
    pub sort_by: String,
    pub videos: Vec<AnalyzedItem>,
}

/// Analyzes a batch of raw video records against the current wall clock.
pub fn analyze_videos(items: &[Value], sort_by: SortBy) -> AnalysisResult {
    let config = load_analyzer_config();
    analyze_videos_at(items, sort_by, now_epoch_secs(), &config)
}

/// Same as [`analyze_videos`] with an explicit clock and configuration, so
/// callers and tests can freeze time.
pub fn analyze_videos_at(
    items: &[Value],
    sort_by: SortBy,
    now: i64,
    config: &AnalyzerConfig,
) -> AnalysisResult {
    AnalysisPipeline::new(config.clone()).run(items, sort_by, now)
}

pub fn now_epoch_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or(0)
}

fn load_analyzer_config() -> AnalyzerConfig {
    config::AppConfig::load(None)
        .map(|(config, _)| config.analyzer)
        .unwrap_or_default()
}

pub fn format_number(value: f64) -> String {
    let rounded = value.round().max(0.0) as i64;
    let mut chars: Vec<char> = rounded.to_string().chars().collect();
    let mut result = String::new();
    let mut count = 0usize;

    while let Some(ch) = chars.pop() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(ch);
        count += 1;
    }

    result.chars().rev().collect()
}

pub fn format_float(value: f64, digits: usize) -> String {
    format!("{:.1$}", value, digits)
}
