use std::env;
use std::fs;
use std::path::PathBuf;

use trendscope::config::AppConfig;

const ENV_KEYS: &[&str] = &[
    "TRENDSCOPE_CONFIG_PATH",
    "TREND_HOT_WINDOW_HOURS",
    "TREND_TOP_HASHTAGS",
    "KEYWORD_WORKERS",
    "KEYWORD_TIMEOUT_MS",
    "KEYWORD_MAX",
];

fn temp_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("trendscope-{}-{}", std::process::id(), name))
}

// Environment variables are process-global, so the whole load/override
// behavior lives in a single test to keep the steps sequential.
#[test]
fn config_loads_files_and_applies_env_overrides() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }

    // A missing file falls back to defaults without erroring.
    let (config, resolved) = AppConfig::load(Some(temp_path("absent.toml"))).unwrap();
    assert_eq!(config.analyzer.top_hashtags, 10);
    assert_eq!(config.keywords.workers, 5);
    assert_eq!(config.keywords.task_timeout_ms, 15_000);
    assert!(resolved.is_some());

    // A partial file keeps defaults for everything it omits.
    let partial = temp_path("partial.toml");
    fs::write(&partial, "[analyzer]\ntop_hashtags = 3\n").unwrap();
    let (config, _) = AppConfig::load(Some(partial.clone())).unwrap();
    assert_eq!(config.analyzer.top_hashtags, 3);
    assert!((config.analyzer.hot_window_hours - 336.0).abs() < 1e-9);
    assert_eq!(config.keywords.max_keywords, 8);

    // write/load round-trip.
    let written = temp_path("written.toml");
    let mut config = AppConfig::default();
    config.analyzer.hot_window_hours = 100.0;
    config.keywords.workers = 3;
    config.write(&written).unwrap();
    let (reloaded, _) = AppConfig::load(Some(written.clone())).unwrap();
    assert!((reloaded.analyzer.hot_window_hours - 100.0).abs() < 1e-9);
    assert_eq!(reloaded.keywords.workers, 3);

    // TRENDSCOPE_CONFIG_PATH steers the default lookup.
    env::set_var("TRENDSCOPE_CONFIG_PATH", &partial);
    let (config, resolved) = AppConfig::load(None).unwrap();
    assert_eq!(config.analyzer.top_hashtags, 3);
    assert_eq!(resolved, Some(partial.clone()));

    // Env overrides win over file values.
    env::set_var("TREND_HOT_WINDOW_HOURS", "48");
    env::set_var("TREND_TOP_HASHTAGS", "7");
    env::set_var("KEYWORD_TIMEOUT_MS", "2500");
    env::set_var("KEYWORD_MAX", "4");
    let (config, _) = AppConfig::load(None).unwrap();
    assert!((config.analyzer.hot_window_hours - 48.0).abs() < 1e-9);
    assert_eq!(config.analyzer.top_hashtags, 7);
    assert_eq!(config.keywords.task_timeout_ms, 2_500);
    assert_eq!(config.keywords.max_keywords, 4);

    // Zero workers would stall the research pool and is ignored.
    env::set_var("KEYWORD_WORKERS", "0");
    let (config, _) = AppConfig::load(None).unwrap();
    assert_eq!(config.keywords.workers, 5);
    env::set_var("KEYWORD_WORKERS", "2");
    let (config, _) = AppConfig::load(None).unwrap();
    assert_eq!(config.keywords.workers, 2);

    for key in ENV_KEYS {
        env::remove_var(key);
    }
    let _ = fs::remove_file(partial);
    let _ = fs::remove_file(written);
}
