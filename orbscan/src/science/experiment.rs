//! Mapping experiments and which sensors feed them.

use std::fmt;
use std::str::FromStr;

use crate::ephemeris::Body;
use crate::sensor::SensorType;

/// An experiment that mapping data can be submitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Experiment {
    /// Low resolution altimetry map.
    AltimetryLoRes,
    /// High resolution altimetry map.
    AltimetryHiRes,
    /// Biome and anomaly survey.
    BiomeAnomaly,
}

impl Experiment {
    /// Selection order when a mask feeds several experiments.
    pub const ALL: [Experiment; 3] = [
        Experiment::AltimetryLoRes,
        Experiment::AltimetryHiRes,
        Experiment::BiomeAnomaly,
    ];

    /// Stable identifier.
    pub fn id(&self) -> &'static str {
        match self {
            Experiment::AltimetryLoRes => "altimetry-lo-res",
            Experiment::AltimetryHiRes => "altimetry-hi-res",
            Experiment::BiomeAnomaly => "biome-anomaly",
        }
    }

    /// Title for display.
    pub fn title(&self) -> &'static str {
        match self {
            Experiment::AltimetryLoRes => "Low resolution altimetry scan",
            Experiment::AltimetryHiRes => "High resolution altimetry scan",
            Experiment::BiomeAnomaly => "Biome survey",
        }
    }

    /// The sensor that must be present for this experiment to be chosen.
    pub fn trigger(&self) -> SensorType {
        match self {
            Experiment::AltimetryLoRes => SensorType::ALTIMETRY_LO_RES,
            Experiment::AltimetryHiRes => SensorType::ALTIMETRY_HI_RES,
            Experiment::BiomeAnomaly => SensorType::BIOME,
        }
    }

    /// The coverage mask the experiment's value is computed from.
    pub fn coverage_mask(&self) -> SensorType {
        match self {
            Experiment::AltimetryLoRes => SensorType::ALTIMETRY_LO_RES,
            Experiment::AltimetryHiRes => SensorType::ALTIMETRY_HI_RES,
            Experiment::BiomeAnomaly => SensorType::BIOME | SensorType::ANOMALY,
        }
    }

    /// Whether the body has anything for this experiment to map.
    pub fn applies_to(&self, body: &Body) -> bool {
        match self {
            Experiment::AltimetryLoRes | Experiment::AltimetryHiRes => body.has_terrain,
            Experiment::BiomeAnomaly => body.has_biomes,
        }
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Experiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Experiment::ALL
            .into_iter()
            .find(|experiment| experiment.id() == s)
            .ok_or_else(|| format!("unknown experiment: {}", s))
    }
}

/// The experiment a sensor mask maps to on `body`, if any.
///
/// Altimetry wins over biome data; low resolution wins over high.
pub fn select_experiment(body: &Body, mask: SensorType) -> Option<Experiment> {
    Experiment::ALL
        .into_iter()
        .find(|experiment| mask.intersects(experiment.trigger()) && experiment.applies_to(body))
}
