use serde::{Deserialize, Serialize};
use serde_json::Value;

use trendscope::keywords::KeywordReport;
use trendscope::SortBy;

#[derive(Debug, Deserialize)]
pub struct ApiAnalyzeRequest {
    pub items: Vec<Value>,
    pub sort_by: Option<String>,
    pub top_hashtags: Option<usize>,
}

impl ApiAnalyzeRequest {
    pub fn sort_by(&self) -> Result<SortBy, String> {
        match self.sort_by.as_deref() {
            None => Ok(SortBy::default()),
            Some(label) => {
                SortBy::from_str(label).ok_or_else(|| format!("invalid sort_by: {}", label))
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiKeywordRequest {
    pub keyword: String,
}

impl ApiKeywordRequest {
    pub fn keyword(&self) -> Result<&str, String> {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            return Err("keyword is required".to_string());
        }
        Ok(keyword)
    }
}

#[derive(Debug, Deserialize)]
pub struct ApiResearchRequest {
    pub content: Option<String>,
    pub max_keywords: Option<usize>,
    pub request_id: Option<String>,
}

impl ApiResearchRequest {
    pub fn content(&self) -> Result<&str, String> {
        let content = self.content.as_deref().unwrap_or("").trim();
        if content.is_empty() {
            return Err("content is required".to_string());
        }
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResearchResponse {
    pub request_id: String,
    pub report: KeywordReport,
    pub warnings: Vec<String>,
}
