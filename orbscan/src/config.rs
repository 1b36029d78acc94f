//! Scan tuning configuration.
//!
//! # Example Configuration (INI)
//!
//! ```ini
//! [scan]
//! time_warp_resolution = 20
//! tick_interval_ms = 1000
//! scan_background = true
//! convergence_deg = 1.0
//! ```
//!
//! Missing keys keep their defaults. Unknown keys and sections are ignored.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

/// Default maximum bisection depth per vehicle pass.
pub const DEFAULT_MAX_RESOLUTION: u32 = 20;

/// Largest accepted bisection depth.
///
/// Work per pass grows as `2^depth`, so deeper settings are rejected.
pub const MAX_RESOLUTION_LIMIT: u32 = 30;

/// Default minimum real time between two ticks.
pub const DEFAULT_MIN_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default angular distance below which bisection stops (degrees).
pub const DEFAULT_CONVERGENCE_DEG: f64 = 1.0;

const SECTION: &str = "scan";

/// Errors loading a [`ScanConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed as INI.
    #[error("failed to load config: {0}")]
    Load(#[from] ini::Error),

    /// The text could not be parsed as INI.
    #[error("failed to parse config: {0}")]
    Parse(#[from] ini::ParseError),

    /// A key had a value of the wrong type or out of range.
    #[error("invalid value for [scan] {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Tuning for the scan controller and sampler.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Maximum bisection depth per vehicle pass.
    ///
    /// Bounds the work of one pass regardless of how much time elapsed
    /// since the previous tick.
    pub max_resolution: u32,

    /// Minimum real time between two ticks.
    pub min_tick_interval: Duration,

    /// Scan vehicles around every body, not only the focus body.
    pub scan_background: bool,

    /// Angular distance below which interpolated samples stop (degrees).
    pub convergence_deg: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_resolution: DEFAULT_MAX_RESOLUTION,
            min_tick_interval: DEFAULT_MIN_TICK_INTERVAL,
            scan_background: true,
            convergence_deg: DEFAULT_CONVERGENCE_DEG,
        }
    }
}

impl ScanConfig {
    /// Set the maximum bisection depth.
    pub fn with_max_resolution(mut self, depth: u32) -> Self {
        self.max_resolution = depth;
        self
    }

    /// Set the minimum real time between ticks.
    pub fn with_min_tick_interval(mut self, interval: Duration) -> Self {
        self.min_tick_interval = interval;
        self
    }

    /// Set whether vehicles away from the focus body are scanned.
    pub fn with_scan_background(mut self, enabled: bool) -> Self {
        self.scan_background = enabled;
        self
    }

    /// Set the convergence threshold in degrees.
    pub fn with_convergence_deg(mut self, degrees: f64) -> Self {
        self.convergence_deg = degrees;
        self
    }

    /// Load from an INI file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path.as_ref())?;
        Self::from_ini(&ini)
    }

    /// Parse from INI text.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text)?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let Some(section) = ini.section(Some(SECTION)) else {
            return Ok(config);
        };

        if let Some(value) = section.get("time_warp_resolution") {
            let depth: u32 = parse_value("time_warp_resolution", value, "expected an integer")?;
            if depth > MAX_RESOLUTION_LIMIT {
                return Err(invalid("time_warp_resolution", value, "must be at most 30"));
            }
            config.max_resolution = depth;
        }

        if let Some(value) = section.get("tick_interval_ms") {
            let millis: u64 = parse_value("tick_interval_ms", value, "expected milliseconds")?;
            config.min_tick_interval = Duration::from_millis(millis);
        }

        if let Some(value) = section.get("scan_background") {
            config.scan_background = parse_bool(value)
                .ok_or_else(|| invalid("scan_background", value, "expected true or false"))?;
        }

        if let Some(value) = section.get("convergence_deg") {
            let degrees: f64 = parse_value("convergence_deg", value, "expected a number")?;
            if !degrees.is_finite() || degrees <= 0.0 {
                return Err(invalid("convergence_deg", value, "must be positive"));
            }
            config.convergence_deg = degrees;
        }

        tracing::debug!(?config, "Loaded scan config");
        Ok(config)
    }
}

fn parse_value<T: FromStr>(
    key: &'static str,
    value: &str,
    reason: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value, reason))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(key: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason,
    }
}
