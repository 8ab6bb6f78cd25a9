use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::scoring::{metrics, potential};
use crate::{AnalysisResult, AnalyzedItem, HashtagCount, RawItem, SortBy, StatusCounts};

// Piecewise-linear base curve over average views-per-day, 0-85 points.
const ENGAGEMENT_CURVE: &[(f64, f64)] = &[
    (0.0, 0.0),
    (1_000.0, 20.0),
    (5_000.0, 35.0),
    (10_000.0, 50.0),
    (20_000.0, 65.0),
    (50_000.0, 75.0),
    (100_000.0, 85.0),
];

// View-count milestones and the bonus weight for the fraction of recent
// items crossing each one. Weights sum to the 20-point bonus cap.
const MILESTONE_BONUSES: &[(u64, f64)] = &[(100_000, 8.0), (1_000_000, 6.0), (10_000_000, 6.0)];

#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    config: AnalyzerConfig,
}

impl TrendAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Runs the full aggregate analysis. Never fails: malformed records are
    /// skipped and counted, and an empty input yields zeroed aggregates.
    pub fn analyze(&self, items: &[Value], sort_by: SortBy, now: i64) -> AnalysisResult {
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut videos: Vec<AnalyzedItem> = Vec::new();
        let mut duplicates_skipped = 0usize;
        let mut zero_view_skipped = 0usize;
        let mut invalid_skipped = 0usize;

        for value in items {
            let Some(raw) = RawItem::from_value(value) else {
                invalid_skipped += 1;
                debug!("skipping record without a usable id");
                continue;
            };
            if !seen_ids.insert(raw.id.clone()) {
                duplicates_skipped += 1;
                continue;
            }
            if raw.play_count == 0 {
                zero_view_skipped += 1;
                continue;
            }
            videos.push(analyze_item(raw, now));
        }

        match sort_by {
            SortBy::Views => videos.sort_by(|a, b| b.play_count.cmp(&a.play_count)),
            SortBy::Date => videos.sort_by(|a, b| b.create_time.cmp(&a.create_time)),
        }

        let scores: Vec<u8> = videos.iter().map(|video| video.viral_potential).collect();
        let mut status_counts = StatusCounts::default();
        for video in &videos {
            status_counts.record(video.trend_status);
        }

        let hot_score = self.hot_score(&videos);
        let engagement_score = self.engagement_score(&videos);
        let total_score = (hot_score as u16 + engagement_score as u16) / 2;
        let total_score = total_score as u8;

        AnalysisResult {
            total_videos: videos.len(),
            duplicates_skipped,
            zero_view_skipped,
            invalid_skipped,
            avg_viral_potential: mean(&scores),
            median_viral_potential: median(&scores),
            status_counts,
            hot_score,
            engagement_score,
            total_score,
            trend_summary: trend_summary(hot_score, engagement_score, total_score).to_string(),
            top_hashtags: self.top_hashtags(&videos),
            sort_by: sort_by.label().to_string(),
            videos,
        }
    }

    /// Percentage of analyzed items inside the hot window, truncated.
    fn hot_score(&self, videos: &[AnalyzedItem]) -> u8 {
        if videos.is_empty() {
            return 0;
        }
        let recent = videos
            .iter()
            .filter(|video| video.age_hours <= self.config.hot_window_hours)
            .count();
        (recent * 100 / videos.len()).min(100) as u8
    }

    /// Base curve over the average views-per-day of recent items, plus the
    /// milestone bonus, capped at 100.
    fn engagement_score(&self, videos: &[AnalyzedItem]) -> u8 {
        let recent: Vec<&AnalyzedItem> = videos
            .iter()
            .filter(|video| video.age_hours <= self.config.hot_window_hours)
            .collect();
        if recent.is_empty() {
            return 0;
        }

        let total_vpd: f64 = recent
            .iter()
            .map(|video| {
                metrics::views_per_day(video.play_count, video.age_hours, self.config.min_age_days)
            })
            .sum();
        let avg_vpd = total_vpd / recent.len() as f64;

        let mut bonus = 0.0;
        for &(milestone, weight) in MILESTONE_BONUSES {
            let crossing = recent
                .iter()
                .filter(|video| video.play_count >= milestone)
                .count();
            bonus += weight * crossing as f64 / recent.len() as f64;
        }

        let score = base_curve(avg_vpd) + bonus.round();
        score.min(100.0) as u8
    }

    /// Hashtag frequencies across all surviving items, ranked by count with
    /// first-seen order breaking ties.
    fn top_hashtags(&self, videos: &[AnalyzedItem]) -> Vec<HashtagCount> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();

        for video in videos {
            for tag in &video.hashtags {
                let entry = counts.entry(tag.as_str()).or_insert(0);
                if *entry == 0 {
                    order.push(tag.as_str());
                }
                *entry += 1;
            }
        }

        let mut ranked: Vec<HashtagCount> = order
            .into_iter()
            .map(|tag| HashtagCount {
                tag: tag.to_string(),
                count: counts[tag],
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(self.config.top_hashtags);
        ranked
    }
}

fn analyze_item(raw: RawItem, now: i64) -> AnalyzedItem {
    let age_hours = metrics::age_hours(raw.create_time, now);
    let views_per_hour = metrics::views_per_hour(raw.play_count, age_hours);
    let engagement_rate = metrics::engagement_rate(
        raw.digg_count,
        raw.share_count,
        raw.comment_count,
        raw.play_count,
    );
    let viral_potential =
        potential::viral_potential(age_hours, raw.play_count, views_per_hour, engagement_rate);

    AnalyzedItem {
        id: raw.id,
        title: raw.title,
        author: raw.author,
        create_time: raw.create_time.unwrap_or(0),
        play_count: raw.play_count,
        digg_count: raw.digg_count,
        share_count: raw.share_count,
        comment_count: raw.comment_count,
        hashtags: raw.hashtags,
        age_hours,
        views_per_hour,
        engagement_rate,
        viral_potential,
        trend_status: potential::trend_status(viral_potential, age_hours),
    }
}

fn base_curve(avg_views_per_day: f64) -> f64 {
    let (last_x, last_y) = ENGAGEMENT_CURVE[ENGAGEMENT_CURVE.len() - 1];
    if avg_views_per_day >= last_x {
        return last_y;
    }
    for window in ENGAGEMENT_CURVE.windows(2) {
        let (x0, y0) = window[0];
        let (x1, y1) = window[1];
        if avg_views_per_day <= x1 {
            return y0 + (y1 - y0) * (avg_views_per_day - x0) / (x1 - x0);
        }
    }
    last_y
}

// The cascade is order-sensitive: the first matching branch wins even when
// later predicates would also hold.
fn trend_summary(hot: u8, engagement: u8, total: u8) -> &'static str {
    let rules: [(bool, &'static str); 5] = [
        (
            hot >= 80 && engagement >= 70,
            "Explosive: fresh uploads are pulling massive view velocity",
        ),
        (total >= 75, "Surging: strong momentum across recent uploads"),
        (hot >= 60, "Active: most content is recent, engagement still building"),
        (
            engagement >= 60,
            "Evergreen pull: older uploads still draw heavy viewing",
        ),
        (total >= 40, "Warming up: moderate activity, worth watching"),
    ];
    for (matched, label) in rules {
        if matched {
            return label;
        }
    }
    "Quiet: little recent activity for this topic"
}

fn mean(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let sum: u32 = scores.iter().map(|score| *score as u32).sum();
    metrics::round1(sum as f64 / scores.len() as f64)
}

fn median(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<u8> = scores.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid] as f64
    } else {
        metrics::round1((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    }
}
