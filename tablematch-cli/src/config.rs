/// Config file loading and creation for the tablematch CLI.
///
/// Config lives at $XDG_CONFIG_HOME/tablematch/config.toml (usually
/// ~/.config). Every field is optional; CLI flags win over the file.
use serde::Deserialize;
use std::path::{Path, PathBuf};

use tablematch_core::EngineConfig;

use crate::bail;

#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct TablematchConfig {
    pub rounds: Option<usize>,
    pub lookahead_discount: Option<f64>,
    pub lookahead_min_rounds: Option<usize>,
    pub signal_similarity_threshold: Option<i64>,
    pub signal_boost: Option<f64>,
}

impl TablematchConfig {
    /// Reject values the engine can't use: rounds must be positive, the
    /// discount must lie in (0, 1] and the boost can't be negative.
    pub fn validate(&self) -> Result<(), String> {
        if self.rounds == Some(0) {
            return Err("rounds must be at least 1".to_string());
        }
        if let Some(d) = self.lookahead_discount {
            if d.is_nan() || d <= 0.0 || d > 1.0 {
                return Err(format!("lookahead_discount must be in (0, 1], got {d}"));
            }
        }
        if let Some(b) = self.signal_boost {
            if b.is_nan() || b < 0.0 {
                return Err(format!("signal_boost must be non-negative, got {b}"));
            }
        }
        Ok(())
    }

    /// Engine tuning with every unset field at its built-in default.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            lookahead_discount: self.lookahead_discount.unwrap_or(defaults.lookahead_discount),
            lookahead_min_rounds: self.lookahead_min_rounds.unwrap_or(defaults.lookahead_min_rounds),
            signal_similarity_threshold: self
                .signal_similarity_threshold
                .unwrap_or(defaults.signal_similarity_threshold),
            signal_boost: self.signal_boost.unwrap_or(defaults.signal_boost),
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = "\
# tablematch configuration
# All values here can be overridden by CLI flags.

# Number of rounds in an event
# rounds = 10

# Graph weights are multiplied by this while more than
# lookahead_min_rounds rounds remain.
# lookahead_discount = 0.95
# lookahead_min_rounds = 3

# A candidate gets signal_boost for each person the other side signaled
# whose score with the candidate is above signal_similarity_threshold.
# signal_similarity_threshold = 70
# signal_boost = 5.0
";

/// `$XDG_CONFIG_HOME/tablematch/config.toml`, falling back to
/// `~/.config/tablematch/config.toml`.
pub fn config_path() -> PathBuf {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let home = std::env::var_os("HOME").unwrap_or_else(|| bail("HOME environment variable not set"));
            PathBuf::from(home).join(".config")
        }
    };
    base.join("tablematch").join("config.toml")
}

/// Load and validate a config file. A missing file is the all-default config.
pub fn load_config(path: &Path) -> TablematchConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content)
            .unwrap_or_else(|e| bail(format!("Invalid config at {}: {e}", path.display()))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => TablematchConfig::default(),
        Err(e) => bail(format!("Failed to read config at {}: {e}", path.display())),
    }
}

fn parse_config(content: &str) -> Result<TablematchConfig, String> {
    let cfg: TablematchConfig = toml::from_str(content).map_err(|e| e.to_string())?;
    cfg.validate()?;
    Ok(cfg)
}

/// Write the commented template to `path`, refusing to overwrite.
pub fn write_default_config(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("Config file already exists at {}", path.display()));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {e}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .map_err(|e| format!("Failed to write config to {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses_to_defaults() {
        let cfg: TablematchConfig = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(cfg, TablematchConfig::default());
        assert_eq!(cfg.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_partial_config_overrides() {
        let cfg: TablematchConfig = toml::from_str("rounds = 8\nsignal_boost = 7.5\n").unwrap();
        assert_eq!(cfg.rounds, Some(8));
        let engine = cfg.engine_config();
        assert_eq!(engine.signal_boost, 7.5);
        assert_eq!(engine.lookahead_discount, EngineConfig::default().lookahead_discount);
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        assert!(parse_config("rounds = 0").is_err());
        assert!(parse_config("lookahead_discount = 0.0").is_err());
        assert!(parse_config("lookahead_discount = 1.5").is_err());
        assert!(parse_config("signal_boost = -1.0").is_err());
        assert!(parse_config("lookahead_discount = 1.0\nsignal_boost = 0.0").is_ok());
    }

    #[test]
    fn test_write_default_config_once() {
        let dir = std::env::temp_dir().join(format!("tablematch-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let _ = std::fs::remove_dir_all(&dir);

        write_default_config(&path).unwrap();
        assert_eq!(load_config(&path), TablematchConfig::default());
        assert!(write_default_config(&path).unwrap_err().contains("already exists"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_is_default() {
        let cfg = load_config(Path::new("/nonexistent/tablematch/config.toml"));
        assert_eq!(cfg, TablematchConfig::default());
    }
}
