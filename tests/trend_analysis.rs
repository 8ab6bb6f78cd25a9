use serde_json::{json, Value};

use trendscope::config::AnalyzerConfig;
use trendscope::scoring::{
    age_hours, engagement_rate, parse_timestamp, velocity_points, views_per_hour,
};
use trendscope::{analyze_videos_at, SortBy, TrendStatus};

const NOW: i64 = 1_700_000_000;

fn video(id: &str, age_secs: i64, plays: u64, diggs: u64, shares: u64, comments: u64) -> Value {
    json!({
        "id": id,
        "createTime": NOW - age_secs,
        "playCount": plays,
        "diggCount": diggs,
        "shareCount": shares,
        "commentCount": comments,
    })
}

fn analyze(items: &[Value], sort_by: SortBy) -> trendscope::AnalysisResult {
    analyze_videos_at(items, sort_by, NOW, &AnalyzerConfig::default())
}

#[test]
fn hour_old_viral_video_scores_ninety() {
    let items = vec![video("a", 3600, 100_000, 5_000, 1_000, 500)];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.total_videos, 1);
    let analyzed = &result.videos[0];
    assert!((analyzed.age_hours - 1.0).abs() < 1e-9);
    assert_eq!(analyzed.views_per_hour, 100_000);
    assert!((analyzed.engagement_rate - 6.5).abs() < 1e-9);
    assert_eq!(analyzed.viral_potential, 90);
    assert_eq!(analyzed.trend_status, TrendStatus::Viral);
    assert_eq!(result.status_counts.viral, 1);
}

#[test]
fn duplicate_ids_are_dropped_not_merged() {
    let items = vec![
        video("x", 3600, 1_000, 10, 0, 0),
        video("x", 7200, 9_000, 90, 0, 0),
    ];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.total_videos, 1);
    assert_eq!(result.duplicates_skipped, 1);
    // First occurrence wins.
    assert_eq!(result.videos[0].play_count, 1_000);
}

#[test]
fn zero_view_items_never_reach_aggregates() {
    let items = vec![
        video("a", 3600, 100_000, 5_000, 1_000, 500),
        video("b", 3600, 0, 50, 0, 0),
    ];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.total_videos, 1);
    assert_eq!(result.zero_view_skipped, 1);
    assert!((result.avg_viral_potential - 90.0).abs() < 1e-9);
    assert!((result.median_viral_potential - 90.0).abs() < 1e-9);
}

#[test]
fn records_without_id_are_counted_invalid() {
    let items = vec![json!({"playCount": 500}), json!("not an object")];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.total_videos, 0);
    assert_eq!(result.invalid_skipped, 2);
}

#[test]
fn item_wrapper_is_unwrapped() {
    let items = vec![json!({"item": {"id": "wrapped", "createTime": NOW - 3600, "playCount": 42}})];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.total_videos, 1);
    assert_eq!(result.videos[0].id, "wrapped");
}

#[test]
fn empty_input_yields_zeroed_aggregates() {
    let result = analyze(&[], SortBy::Views);

    assert_eq!(result.total_videos, 0);
    assert!((result.avg_viral_potential - 0.0).abs() < 1e-9);
    assert!((result.median_viral_potential - 0.0).abs() < 1e-9);
    assert_eq!(result.hot_score, 0);
    assert_eq!(result.engagement_score, 0);
    assert_eq!(result.total_score, 0);
    assert_eq!(
        result.trend_summary,
        "Quiet: little recent activity for this topic"
    );
}

#[test]
fn analysis_is_idempotent_with_frozen_clock() {
    let items = vec![
        video("a", 3600, 100_000, 5_000, 1_000, 500),
        video("b", 86_400 * 20, 2_000, 40, 5, 10),
        video("c", 7200, 300, 3, 0, 1),
    ];
    let first = serde_json::to_value(analyze(&items, SortBy::Views)).unwrap();
    let second = serde_json::to_value(analyze(&items, SortBy::Views)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn velocity_axis_is_non_decreasing() {
    let samples = [
        0, 100, 499, 500, 999, 1_000, 1_999, 2_000, 4_999, 5_000, 9_999, 10_000, 19_999, 20_000,
        49_999, 50_000, 1_000_000,
    ];
    let mut previous = 0u8;
    for sample in samples {
        let points = velocity_points(sample);
        assert!(
            points >= previous,
            "velocity points regressed at {} views/h",
            sample
        );
        previous = points;
    }
    assert_eq!(velocity_points(499), 5);
    assert_eq!(velocity_points(50_000), 40);
}

#[test]
fn scores_stay_within_bounds() {
    let extremes = vec![
        video("a", 1, u64::MAX / 1_000, u64::MAX / 4_000, 0, 0),
        video("b", 86_400 * 365 * 5, 1, 0, 0, 0),
        video("c", 3600, 10_000_000, 10_000_000, 10_000_000, 10_000_000),
    ];
    let result = analyze(&extremes, SortBy::Views);

    for analyzed in &result.videos {
        assert!(analyzed.viral_potential <= 100);
    }
    assert!(result.hot_score <= 100);
    assert!(result.engagement_score <= 100);
    assert!(result.total_score <= 100);
}

#[test]
fn saturated_counters_never_panic_the_analyzer() {
    // Valid JSON can carry counters near u64::MAX; summing them must not
    // overflow on the way to the engagement rate.
    let items = vec![video("a", 3600, 1_000, u64::MAX, u64::MAX, u64::MAX)];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.total_videos, 1);
    let analyzed = &result.videos[0];
    assert!(analyzed.engagement_rate.is_finite());
    assert!(analyzed.engagement_rate > 0.0);
    assert!(analyzed.viral_potential <= 100);
}

#[test]
fn sort_by_views_orders_by_play_count_descending() {
    let items = vec![
        video("low", 3600, 10, 0, 0, 0),
        video("high", 3600, 1_000, 0, 0, 0),
        video("mid", 3600, 500, 0, 0, 0),
    ];
    let result = analyze(&items, SortBy::Views);
    let order: Vec<&str> = result.videos.iter().map(|video| video.id.as_str()).collect();
    assert_eq!(order, ["high", "mid", "low"]);
    assert_eq!(result.sort_by, "views");
}

#[test]
fn sort_by_date_orders_newest_first() {
    let items = vec![
        video("old", 86_400 * 3, 1_000, 0, 0, 0),
        video("new", 3600, 10, 0, 0, 0),
    ];
    let result = analyze(&items, SortBy::Date);
    let order: Vec<&str> = result.videos.iter().map(|video| video.id.as_str()).collect();
    assert_eq!(order, ["new", "old"]);
}

#[test]
fn hot_score_is_share_of_recent_items() {
    let items = vec![
        video("a", 3600, 100, 0, 0, 0),
        video("b", 7200, 100, 0, 0, 0),
        video("c", 3600 * 400, 100, 0, 0, 0),
        video("d", 3600 * 500, 100, 0, 0, 0),
    ];
    let result = analyze(&items, SortBy::Views);
    assert_eq!(result.hot_score, 50);
}

#[test]
fn hashtags_are_normalized_and_ranked() {
    let items = vec![
        json!({
            "id": "a", "createTime": NOW - 3600, "playCount": 100,
            "challenges": [{"title": "FYP"}, {"title": "Recipe"}],
        }),
        json!({
            "id": "b", "createTime": NOW - 3600, "playCount": 100,
            "challenges": [{"title": "#fyp"}, {"title": "baking"}],
        }),
    ];
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.top_hashtags[0].tag, "fyp");
    assert_eq!(result.top_hashtags[0].count, 2);
    // Ties keep first-seen order.
    assert_eq!(result.top_hashtags[1].tag, "recipe");
    assert_eq!(result.top_hashtags[2].tag, "baking");
}

#[test]
fn missing_timestamp_scores_zero_potential() {
    let items = vec![json!({"id": "a", "playCount": 50_000})];
    let result = analyze(&items, SortBy::Views);

    let analyzed = &result.videos[0];
    assert!((analyzed.age_hours - 0.0).abs() < 1e-9);
    assert_eq!(analyzed.viral_potential, 0);
}

#[test]
fn median_averages_middle_pair_for_even_counts() {
    let items = vec![
        video("a", 3600, 100_000, 5_000, 1_000, 500), // potential 90
        video("b", 3600, 100, 0, 0, 0),               // low potential
    ];
    let result = analyze(&items, SortBy::Views);
    let low = result
        .videos
        .iter()
        .find(|video| video.id == "b")
        .unwrap()
        .viral_potential as f64;
    let expected = (90.0 + low) / 2.0;
    assert!((result.median_viral_potential - expected).abs() < 0.06);
}

#[test]
fn age_hours_rounds_and_guards() {
    assert!((age_hours(Some(NOW - 3600), NOW) - 1.0).abs() < 1e-9);
    assert!((age_hours(Some(NOW - 5400), NOW) - 1.5).abs() < 1e-9);
    assert!((age_hours(None, NOW) - 0.0).abs() < 1e-9);
    // Future timestamps collapse to zero instead of going negative.
    assert!((age_hours(Some(NOW + 3600), NOW) - 0.0).abs() < 1e-9);
}

#[test]
fn engagement_rate_rounds_to_two_decimals() {
    assert!((engagement_rate(1, 1, 1, 7) - 42.86).abs() < 1e-9);
    assert!((engagement_rate(10, 0, 0, 0) - 0.0).abs() < 1e-9);
}

#[test]
fn views_per_hour_guards_zero_age() {
    assert_eq!(views_per_hour(1_000, 0.0), 0);
    assert_eq!(views_per_hour(1_000, 2.0), 500);
}

#[test]
fn iso_timestamps_are_parsed() {
    let parsed = parse_timestamp(&json!("2024-01-15T10:00:00Z")).unwrap();
    assert_eq!(parsed, 1_705_312_800);
    assert_eq!(parse_timestamp(&json!(1_700_000_000i64)), Some(1_700_000_000));
    assert_eq!(parse_timestamp(&json!("1700000000")), Some(1_700_000_000));
    assert_eq!(parse_timestamp(&json!("not a date")), None);
}

#[test]
fn hot_and_engaged_set_gets_top_summary() {
    let items: Vec<Value> = (0..5)
        .map(|index| {
            video(
                &format!("video-{}", index),
                3600,
                500_000,
                40_000,
                5_000,
                5_000,
            )
        })
        .collect();
    let result = analyze(&items, SortBy::Views);

    assert_eq!(result.hot_score, 100);
    assert!(result.engagement_score >= 70);
    assert_eq!(
        result.trend_summary,
        "Explosive: fresh uploads are pulling massive view velocity"
    );
}
