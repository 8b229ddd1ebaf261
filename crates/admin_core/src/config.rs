use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "admin.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub user_search_debounce_ms: u64,
    pub category_search_debounce_ms: u64,
    pub category_page_size: u32,
    pub users_per_page: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api".into(),
            api_token: None,
            request_timeout_ms: Some(15_000),
            user_search_debounce_ms: 400,
            category_search_debounce_ms: 500,
            category_page_size: 25,
            users_per_page: 10,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    pub fn user_search_debounce(&self) -> Duration {
        Duration::from_millis(self.user_search_debounce_ms)
    }

    pub fn category_search_debounce(&self) -> Duration {
        Duration::from_millis(self.category_search_debounce_ms)
    }
}

/// Defaults, then `admin.toml` in the working directory if present, then
/// environment overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    let path = Path::new(DEFAULT_SETTINGS_FILE);
    let mut settings = if path.exists() {
        load_settings_file(path)?
    } else {
        Settings::default()
    };
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

pub fn load_settings_file(path: &Path) -> anyhow::Result<Settings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("ADMIN_API_URL").or_else(|| var("APP__API_BASE_URL")) {
        settings.api_base_url = v;
    }
    if let Some(v) = var("ADMIN_API_TOKEN").or_else(|| var("APP__API_TOKEN")) {
        settings.api_token = Some(v).filter(|token| !token.trim().is_empty());
    }
    if let Some(parsed) = var("APP__REQUEST_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        settings.request_timeout_ms = Some(parsed);
    }
    if let Some(parsed) = var("APP__USERS_PER_PAGE").and_then(|v| v.parse::<u32>().ok()) {
        settings.users_per_page = parsed;
    }
}
