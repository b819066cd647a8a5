use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::extract::DEFAULT_POINTS;
use crate::catalog::duration::FALLBACK_DURATION_MS;
use crate::similarity::ErrorMetric;
use crate::timeline::DEFAULT_WINDOW_MS;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_step_size")]
    pub step_size: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_window_ms")]
    pub window_ms: f64,
    #[serde(default)]
    pub metric: ErrorMetric,
}

#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_points")]
    pub points: usize,
}

#[derive(Debug, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_fallback_duration_ms")]
    pub fallback_duration_ms: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            step_size: default_step_size(),
            top_n: default_top_n(),
            window_ms: default_window_ms(),
            metric: ErrorMetric::default(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            points: default_points(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            fallback_duration_ms: default_fallback_duration_ms(),
        }
    }
}

fn default_step_size() -> usize { 5 }
fn default_top_n() -> usize { 10 }
fn default_window_ms() -> f64 { DEFAULT_WINDOW_MS }
fn default_points() -> usize { DEFAULT_POINTS }
fn default_fallback_duration_ms() -> f64 { FALLBACK_DURATION_MS }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// `contour.toml` in the working directory, then `~/.config/contour/config.toml`,
/// then the platform config directory.
pub fn find_config() -> Option<PathBuf> {
    let local = PathBuf::from("contour.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("contour").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("contour").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
