//! Configuration management.

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration for linetrace.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Workspace root, used to retry absolute file spellings relative.
    pub workspace_root: Option<PathBuf>,
    /// Maximum line records retained per file.
    pub per_file_record_cap: usize,
    /// Maximum resolutions held in the hash result cache.
    pub result_cache_cap: usize,
    /// Maximum snapshot versions retained per file.
    pub snapshot_version_cap: usize,
    /// Snapshot retention window, milliseconds.
    pub snapshot_retention_ms: i64,
    /// Retention window for consumed line records, milliseconds.
    pub record_retention_ms: i64,
    /// Maximum prefix candidates the partial-edit solver scans.
    pub prefix_scan_limit: usize,
    /// Commit attribution lookback, days.
    pub causality_window_days: i64,
    /// Debounce quiet period for change detection, milliseconds.
    pub debounce_quiet_ms: u64,
    /// Debounce maximum wait ceiling, milliseconds.
    pub debounce_max_wait_ms: u64,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            per_file_record_cap: 1000,
            result_cache_cap: 200,
            snapshot_version_cap: 10,
            snapshot_retention_ms: 5 * 60 * 1000,
            record_retention_ms: 24 * 60 * 60 * 1000,
            prefix_scan_limit: 100,
            causality_window_days: 7,
            debounce_quiet_ms: 500,
            debounce_max_wait_ms: 5_000,
        }
    }
}

impl TraceConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file, overlaying defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile = toml::from_str(&contents)
            .map_err(|e| crate::Error::InvalidInput(format!("invalid config file: {e}")))?;

        Ok(Self::default().merged_with(file))
    }

    fn merged_with(mut self, file: ConfigFile) -> Self {
        if let Some(root) = file.workspace_root {
            self.workspace_root = Some(PathBuf::from(root));
        }
        if let Some(cap) = file.per_file_record_cap {
            self.per_file_record_cap = cap;
        }
        if let Some(cap) = file.result_cache_cap {
            self.result_cache_cap = cap;
        }
        if let Some(cap) = file.snapshot_version_cap {
            self.snapshot_version_cap = cap;
        }
        if let Some(ms) = file.snapshot_retention_ms {
            self.snapshot_retention_ms = ms;
        }
        if let Some(ms) = file.record_retention_ms {
            self.record_retention_ms = ms;
        }
        if let Some(limit) = file.prefix_scan_limit {
            self.prefix_scan_limit = limit;
        }
        if let Some(days) = file.causality_window_days {
            self.causality_window_days = days;
        }
        if let Some(ms) = file.debounce_quiet_ms {
            self.debounce_quiet_ms = ms;
        }
        if let Some(ms) = file.debounce_max_wait_ms {
            self.debounce_max_wait_ms = ms;
        }
        self
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Workspace root.
    pub workspace_root: Option<String>,
    /// Per-file record cap.
    pub per_file_record_cap: Option<usize>,
    /// Result cache cap.
    pub result_cache_cap: Option<usize>,
    /// Snapshot version cap.
    pub snapshot_version_cap: Option<usize>,
    /// Snapshot retention, milliseconds.
    pub snapshot_retention_ms: Option<i64>,
    /// Record retention, milliseconds.
    pub record_retention_ms: Option<i64>,
    /// Prefix scan limit.
    pub prefix_scan_limit: Option<usize>,
    /// Causality window, days.
    pub causality_window_days: Option<i64>,
    /// Debounce quiet period, milliseconds.
    pub debounce_quiet_ms: Option<u64>,
    /// Debounce max wait, milliseconds.
    pub debounce_max_wait_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.per_file_record_cap, 1000);
        assert_eq!(config.prefix_scan_limit, 100);
        assert_eq!(config.causality_window_days, 7);
        assert!(config.workspace_root.is_none());
    }

    #[test]
    fn test_overlay_keeps_unset_defaults() {
        let file: ConfigFile = toml::from_str(
            r#"
            workspace_root = "/work/project"
            per_file_record_cap = 50
            "#,
        )
        .unwrap();
        let config = TraceConfig::default().merged_with(file);
        assert_eq!(config.per_file_record_cap, 50);
        assert_eq!(config.workspace_root, Some(PathBuf::from("/work/project")));
        // Untouched fields keep their defaults.
        assert_eq!(config.result_cache_cap, 200);
    }

    #[test]
    fn test_malformed_toml_is_invalid_input() {
        let result = toml::from_str::<ConfigFile>("per_file_record_cap = []");
        assert!(result.is_err());
    }
}
