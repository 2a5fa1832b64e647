//! Configuration module for pieslice.
//!
//! Loads the global housekeeping settings from environment variables with
//! sensible defaults.

use std::env;

use crate::db::RetentionSettings;

/// Global housekeeping configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HousekeepingConfig {
    /// Override the history storage period of every item (default: false)
    pub history_global: bool,
    /// Global history storage period (default: "90d")
    pub history: String,
    /// Override the trend storage period of every item (default: false)
    pub trends_global: bool,
    /// Global trend storage period (default: "365d")
    pub trends: String,
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            history_global: false,
            history: "90d".to_string(),
            trends_global: false,
            trends: "365d".to_string(),
        }
    }
}

impl HousekeepingConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PIESLICE_HK_HISTORY_GLOBAL`: override item history periods (default: false)
    /// - `PIESLICE_HK_HISTORY`: global history period (default: "90d")
    /// - `PIESLICE_HK_TRENDS_GLOBAL`: override item trend periods (default: false)
    /// - `PIESLICE_HK_TRENDS`: global trend period (default: "365d")
    pub fn load() -> Self {
        Self::load_from(|name| env::var(name).ok())
    }

    fn load_from<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(flag) = var("PIESLICE_HK_HISTORY_GLOBAL").and_then(|v| parse_flag(&v)) {
            cfg.history_global = flag;
        }

        if let Some(history) = var("PIESLICE_HK_HISTORY") {
            cfg.history = history;
        }

        if let Some(flag) = var("PIESLICE_HK_TRENDS_GLOBAL").and_then(|v| parse_flag(&v)) {
            cfg.trends_global = flag;
        }

        if let Some(trends) = var("PIESLICE_HK_TRENDS") {
            cfg.trends = trends;
        }

        cfg
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RetentionSettings for HousekeepingConfig {
    fn history_global(&self) -> bool {
        self.history_global
    }

    fn history(&self) -> &str {
        &self.history
    }

    fn trends_global(&self) -> bool {
        self.trends_global
    }

    fn trends(&self) -> &str {
        &self.trends
    }
}
