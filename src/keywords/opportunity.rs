use serde::{Deserialize, Serialize};

use crate::config::KeywordConfig;

// Terms too common to carry meaning when checking title relevance.
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "at", "by", "for", "from", "how", "in", "is", "of", "on", "or",
    "the", "to", "what", "why", "with", "you", "your",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl Competition {
    pub fn from_results(estimated_results: u64) -> Self {
        if estimated_results < 100_000 {
            Competition::Low
        } else if estimated_results < 1_000_000 {
            Competition::Medium
        } else {
            Competition::High
        }
    }

    /// Pressure value folded into the opportunity blend: crowded keywords
    /// leave less room.
    pub fn pressure(self) -> u8 {
        match self {
            Competition::Low => 20,
            Competition::Medium => 55,
            Competition::High => 85,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Competition::Low => "low",
            Competition::Medium => "medium",
            Competition::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestLevel {
    Minimal,
    Emerging,
    Solid,
    Strong,
}

impl InterestLevel {
    pub fn from_points(points: u8) -> Self {
        if points >= 75 {
            InterestLevel::Strong
        } else if points >= 50 {
            InterestLevel::Solid
        } else if points >= 25 {
            InterestLevel::Emerging
        } else {
            InterestLevel::Minimal
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            InterestLevel::Minimal => "minimal",
            InterestLevel::Emerging => "emerging",
            InterestLevel::Solid => "solid",
            InterestLevel::Strong => "strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordQuality {
    Poor,
    Mixed,
    Fair,
    Good,
}

impl KeywordQuality {
    pub fn from_relevance(relevance_percentage: u8) -> Self {
        if relevance_percentage >= 75 {
            KeywordQuality::Good
        } else if relevance_percentage >= 55 {
            KeywordQuality::Fair
        } else if relevance_percentage >= 40 {
            KeywordQuality::Mixed
        } else {
            KeywordQuality::Poor
        }
    }

    /// Points subtracted from the opportunity score before emission.
    pub fn penalty(self) -> u8 {
        match self {
            KeywordQuality::Good => 0,
            KeywordQuality::Fair => 10,
            KeywordQuality::Mixed => 20,
            KeywordQuality::Poor => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeywordQuality::Poor => "poor",
            KeywordQuality::Mixed => "mixed",
            KeywordQuality::Fair => "fair",
            KeywordQuality::Good => "good",
        }
    }
}

/// One search-result video as seen at observation time.
#[derive(Debug, Clone)]
pub struct KeywordVideo {
    pub title: String,
    pub views: u64,
    pub age_days: f64,
}

/// Everything the scorer needs about one keyword, already fetched by the
/// upstream collaborators. The scorer itself does no I/O.
#[derive(Debug, Clone)]
pub struct KeywordObservation {
    pub keyword: String,
    pub estimated_results: u64,
    pub videos: Vec<KeywordVideo>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeywordOpportunity {
    pub keyword: String,
    pub total_videos: u64,
    pub median_recent_views: u64,
    pub competition: Competition,
    pub interest_level: InterestLevel,
    pub relevance_percentage: u8,
    pub keyword_quality: KeywordQuality,
    pub quality_penalty: u8,
    pub opportunity_score: u8,
    pub outlier_detected: bool,
    pub high_performers: usize,
    pub suggestion_count: usize,
}

#[derive(Debug, Clone)]
pub struct OpportunityScorer {
    config: KeywordConfig,
}

impl OpportunityScorer {
    pub fn new(config: KeywordConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, observation: &KeywordObservation) -> KeywordOpportunity {
        let recent: Vec<&KeywordVideo> = observation
            .videos
            .iter()
            .filter(|video| video.age_days <= self.config.recent_window_days)
            .collect();

        let median_recent_views = median_views(&recent);
        let max_recent_views = recent.iter().map(|video| video.views).max().unwrap_or(0);
        // Ten times the median marks a breakout; when that threshold does not
        // fit in a u64, no view count can reach it.
        let breakout_threshold = median_recent_views.checked_mul(10);
        let high_performers = match breakout_threshold {
            Some(threshold) if median_recent_views > 0 => recent
                .iter()
                .filter(|video| video.views >= threshold)
                .count(),
            _ => 0,
        };
        let outlier_detected = match breakout_threshold {
            Some(threshold) => median_recent_views > 0 && max_recent_views > threshold,
            None => false,
        };

        let interest_points = interest_points(
            median_recent_views,
            high_performers,
            observation.suggestions.len(),
        );
        let interest_level = InterestLevel::from_points(interest_points);
        let competition = Competition::from_results(observation.estimated_results);

        let relevance_percentage = self.relevance_percentage(&observation.keyword, &recent);
        let keyword_quality = KeywordQuality::from_relevance(relevance_percentage);
        let quality_penalty = keyword_quality.penalty();

        let blended = 0.6 * interest_points as f64 + 0.4 * (100 - competition.pressure()) as f64;
        let opportunity_score = (blended.round() as i64 - quality_penalty as i64).clamp(0, 100) as u8;

        KeywordOpportunity {
            keyword: observation.keyword.clone(),
            total_videos: observation.estimated_results,
            median_recent_views,
            competition,
            interest_level,
            relevance_percentage,
            keyword_quality,
            quality_penalty,
            opportunity_score,
            outlier_detected,
            high_performers,
            suggestion_count: observation.suggestions.len(),
        }
    }

    /// Share of sampled titles containing at least half of the keyword's
    /// non-stopword terms, as a 0-100 percentage.
    fn relevance_percentage(&self, keyword: &str, videos: &[&KeywordVideo]) -> u8 {
        let terms = keyword_terms(keyword);
        if terms.is_empty() || videos.is_empty() {
            return 0;
        }

        let sampled: Vec<&&KeywordVideo> =
            videos.iter().take(self.config.sample_titles).collect();
        let mut matching = 0usize;
        for video in &sampled {
            let title = video.title.to_lowercase();
            let matched = terms.iter().filter(|term| title.contains(*term)).count();
            if matched * 2 >= terms.len() {
                matching += 1;
            }
        }
        ((matching as f64 / sampled.len() as f64 * 100.0).round() as u64).min(100) as u8
    }
}

fn keyword_terms(keyword: &str) -> Vec<String> {
    keyword
        .to_lowercase()
        .split_whitespace()
        .filter(|term| term.len() >= 2 && !STOPWORDS.contains(term))
        .map(str::to_string)
        .collect()
}

fn interest_points(median_recent_views: u64, high_performers: usize, suggestion_count: usize) -> u8 {
    let base: u8 = if median_recent_views >= 100_000 {
        80
    } else if median_recent_views >= 20_000 {
        60
    } else if median_recent_views >= 5_000 {
        40
    } else if median_recent_views >= 500 {
        25
    } else {
        10
    };
    let performer_boost = 5 * high_performers.min(3) as u16;
    let suggestion_boost = 2 * suggestion_count.min(5) as u16;
    (base as u16 + performer_boost + suggestion_boost).min(100) as u8
}

fn median_views(videos: &[&KeywordVideo]) -> u64 {
    if videos.is_empty() {
        return 0;
    }
    let mut views: Vec<u64> = videos.iter().map(|video| video.views).collect();
    views.sort_unstable();
    let mid = views.len() / 2;
    if views.len() % 2 == 1 {
        views[mid]
    } else {
        // Overflow-safe midpoint; the slice is sorted ascending.
        let low = views[mid - 1];
        let high = views[mid];
        low + (high - low) / 2
    }
}
