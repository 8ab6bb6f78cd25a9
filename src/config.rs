use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub hot_window_hours: f64,
    pub min_age_days: f64,
    pub top_hashtags: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            hot_window_hours: 336.0,
            min_age_days: 0.5,
            top_hashtags: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub recent_window_days: f64,
    pub max_keywords: usize,
    pub workers: usize,
    pub task_timeout_ms: u64,
    pub sample_titles: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 90.0,
            max_keywords: 8,
            workers: 5,
            task_timeout_ms: 15_000,
            sample_titles: 20,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub keywords: KeywordConfig,
}

impl AppConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, Option<PathBuf>), String> {
        let config_path = path.or_else(default_config_path);
        let mut config = if let Some(path) = config_path.as_ref() {
            if path.exists() {
                let contents = std::fs::read_to_string(path)
                    .map_err(|err| format!("failed to read config: {}", err))?;
                toml::from_str(&contents)
                    .map_err(|err| format!("failed to parse config: {}", err))?
            } else {
                AppConfig::default()
            }
        } else {
            AppConfig::default()
        };

        config.apply_env_overrides();
        Ok((config, config_path))
    }

    pub fn write(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create config dir: {}", err))?;
        }
        let payload = toml::to_string_pretty(self)
            .map_err(|err| format!("failed to serialize config: {}", err))?;
        std::fs::write(path, payload).map_err(|err| format!("failed to write config: {}", err))?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(hours) = env::var("TREND_HOT_WINDOW_HOURS") {
            if let Ok(value) = hours.parse::<f64>() {
                self.analyzer.hot_window_hours = value;
            }
        }
        if let Ok(count) = env::var("TREND_TOP_HASHTAGS") {
            if let Ok(value) = count.parse::<usize>() {
                self.analyzer.top_hashtags = value;
            }
        }
        if let Ok(workers) = env::var("KEYWORD_WORKERS") {
            if let Ok(value) = workers.parse::<usize>() {
                if value > 0 {
                    self.keywords.workers = value;
                }
            }
        }
        if let Ok(timeout) = env::var("KEYWORD_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.keywords.task_timeout_ms = value;
            }
        }
        if let Ok(max) = env::var("KEYWORD_MAX") {
            if let Ok(value) = max.parse::<usize>() {
                if value > 0 {
                    self.keywords.max_keywords = value;
                }
            }
        }
    }
}

fn default_config_path() -> Option<PathBuf> {
    env::var("TRENDSCOPE_CONFIG_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from("config/trendscope.toml")))
}
