//! Prompter settings.
//!
//! Localizable labels and timing constants. Hosts usually embed these in
//! their own TOML config and hand the table to [`PrompterSettings::from_toml_str`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default debounce applied to asynchronous free-text validation (milliseconds).
pub const DEFAULT_VALIDATION_DEBOUNCE_MS: u64 = 250;

/// Default settle delay before re-selecting the recent item (milliseconds).
pub const DEFAULT_RECENT_SETTLE_MS: u64 = 25;

/// Labels and timings used by the prompter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrompterSettings {
    /// Label of the row shown when nothing was loaded
    #[serde(default = "default_no_items_label")]
    pub no_items_label: String,

    /// Label of the row shown when loading failed
    #[serde(default = "default_error_label")]
    pub error_label: String,

    /// Detail shown on the free-text row while validation is pending
    #[serde(default = "default_checking_label")]
    pub checking_label: String,

    /// Appended to the description of recently used items
    #[serde(default = "default_recent_suffix")]
    pub recent_suffix: String,

    /// Description of the free-text row when the caller gave no label
    #[serde(default = "default_custom_input_description")]
    pub custom_input_description: String,

    /// Debounce for asynchronous validation
    #[serde(default = "default_validation_debounce_ms")]
    pub validation_debounce_ms: u64,

    /// Delay before recency matching runs after the picker is shown
    #[serde(default = "default_recent_settle_ms")]
    pub recent_settle_ms: u64,
}

impl Default for PrompterSettings {
    fn default() -> Self {
        Self {
            no_items_label: default_no_items_label(),
            error_label: default_error_label(),
            checking_label: default_checking_label(),
            recent_suffix: default_recent_suffix(),
            custom_input_description: default_custom_input_description(),
            validation_debounce_ms: default_validation_debounce_ms(),
            recent_settle_ms: default_recent_settle_ms(),
        }
    }
}

impl PrompterSettings {
    /// Parse settings from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn validation_debounce(&self) -> Duration {
        Duration::from_millis(self.validation_debounce_ms)
    }

    pub fn recent_settle(&self) -> Duration {
        Duration::from_millis(self.recent_settle_ms)
    }
}

fn default_no_items_label() -> String {
    "No matching resources found.".to_string()
}

fn default_error_label() -> String {
    "Error loading items".to_string()
}

fn default_checking_label() -> String {
    "Checking...".to_string()
}

fn default_recent_suffix() -> String {
    "(recently used)".to_string()
}

fn default_custom_input_description() -> String {
    "(custom input)".to_string()
}

fn default_validation_debounce_ms() -> u64 {
    DEFAULT_VALIDATION_DEBOUNCE_MS
}

fn default_recent_settle_ms() -> u64 {
    DEFAULT_RECENT_SETTLE_MS
}
