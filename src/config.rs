//! Configuration management.
//!
//! Loads settings from environment variables and .env file.

#![allow(dead_code)]

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Input/output
    pub input_path: String,
    pub output_path: String,
    pub clean_output_path: String,
    pub emit_clean: bool,

    // Processing
    pub max_concurrency: usize,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Load settings from environment variables (and .env file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();

        Self {
            input_path: env_str("PBP_INPUT", "data/pbp_raw"),
            output_path: env_str("PBP_OUTPUT", "data/possessions.jsonl"),
            clean_output_path: env_str("PBP_CLEAN_OUTPUT", "data/possessions_clean.jsonl"),
            emit_clean: env_bool("PBP_EMIT_CLEAN", true),

            max_concurrency: env_usize("PBP_MAX_CONCURRENCY", 4),

            log_level: env_str("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON", false),
        }
    }

    /// Validate configuration for critical requirements.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.input_path.is_empty() {
            errors.push("PBP_INPUT must not be empty".to_string());
        }
        if self.output_path.is_empty() {
            errors.push("PBP_OUTPUT must not be empty".to_string());
        }
        if self.emit_clean && self.clean_output_path.is_empty() {
            errors.push("PBP_CLEAN_OUTPUT must not be empty when PBP_EMIT_CLEAN=true".to_string());
        }
        if self.max_concurrency == 0 {
            errors.push("PBP_MAX_CONCURRENCY must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
