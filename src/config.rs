// src/config.rs
//! Runtime settings: decision cut-offs and the default reference standard.
//!
//! TOML shape:
//! ```toml
//! reference_standard = "anatomical"
//!
//! [thresholds]
//! defer_max = 5.0
//! rule_out_max = 50.0
//! ica_min = 85.0
//! ```

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::diagnostics::ReferenceStandard;
use crate::engine::Thresholds;

pub const ENV_CONFIG_PATH: &str = "CADENCE_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/cadence.toml";
pub const DEFAULT_JSON_PATH: &str = "config/cadence.json";

static DEFAULTS: Lazy<Settings> = Lazy::new(Settings::default);

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub thresholds: Thresholds,
    /// Reference standard preselected for new sessions.
    #[serde(default)]
    pub reference_standard: ReferenceStandard,
}

impl Settings {
    /// Built-in guideline settings.
    pub fn defaults() -> &'static Settings {
        &DEFAULTS
    }

    fn checked(self) -> Result<Self> {
        if !self.thresholds.is_ordered() {
            bail!(
                "thresholds must satisfy 0 <= defer_max <= rule_out_max <= ica_min <= 100 (got {:?})",
                self.thresholds
            );
        }
        Ok(self)
    }
}

/// Load settings from an explicit path. Supports TOML or JSON formats.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let settings = parse_settings(&content, ext.as_str())
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    info!(target: "cadence::config", path = %path.display(), "settings loaded");
    Ok(settings)
}

/// Load settings using env var + fallbacks:
/// 1) $CADENCE_CONFIG_PATH
/// 2) config/cadence.toml
/// 3) config/cadence.json
/// 4) built-in defaults
pub fn load_settings_default() -> Result<Settings> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_settings_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(candidate);
        if pb.exists() {
            return load_settings_from(&pb);
        }
    }
    Ok(*Settings::defaults())
}

fn parse_settings(s: &str, hint_ext: &str) -> Result<Settings> {
    let parsed = match hint_ext {
        "json" => serde_json::from_str::<Settings>(s)?,
        "toml" => toml::from_str::<Settings>(s)?,
        // No usable extension: try JSON first, then TOML.
        _ => match serde_json::from_str::<Settings>(s) {
            Ok(v) => v,
            Err(_) => toml::from_str::<Settings>(s)
                .map_err(|e| anyhow!("unsupported settings format: {e}"))?,
        },
    };
    parsed.checked()
}
