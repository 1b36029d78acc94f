//! Sensor capability flags.

use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Sensor capabilities a vehicle can carry.
    ///
    /// Single-bit members are the unit of configuration: each one owns its
    /// own [`SensorConfig`](super::SensorConfig). Composite values such as
    /// [`SensorType::ALTIMETRY`] are only used for bulk queries and
    /// mutations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct SensorType: u32 {
        /// Low-resolution radar altimetry.
        const ALTIMETRY_LO_RES = 1 << 0;
        /// High-resolution radar altimetry.
        const ALTIMETRY_HI_RES = 1 << 1;
        /// Both altimetry resolutions.
        const ALTIMETRY = Self::ALTIMETRY_LO_RES.bits() | Self::ALTIMETRY_HI_RES.bits();
        /// Multispectral biome mapping.
        const BIOME = 1 << 3;
        /// Anomaly detection from orbit.
        const ANOMALY = 1 << 4;
        /// Close-range anomaly identification.
        const ANOMALY_DETAIL = 1 << 5;
        /// Every capability.
        const EVERYTHING = Self::ALTIMETRY.bits()
            | Self::BIOME.bits()
            | Self::ANOMALY.bits()
            | Self::ANOMALY_DETAIL.bits();
    }
}

impl SensorType {
    /// The individual sensor bits, lowest first.
    pub const SINGLE_BITS: [SensorType; 5] = [
        SensorType::ALTIMETRY_LO_RES,
        SensorType::ALTIMETRY_HI_RES,
        SensorType::BIOME,
        SensorType::ANOMALY,
        SensorType::ANOMALY_DETAIL,
    ];

    /// True when exactly one capability bit is set.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.bits().count_ones() == 1
    }

    /// Decompose a mask into its known single-bit members.
    pub fn single_bits(self) -> impl Iterator<Item = SensorType> {
        Self::SINGLE_BITS
            .into_iter()
            .filter(move |bit| self.contains(*bit))
    }

    /// Short name for logs and reports.
    pub fn label(&self) -> &'static str {
        const LABELS: [(SensorType, &str); 7] = [
            (SensorType::ALTIMETRY_LO_RES, "altimetry-lo"),
            (SensorType::ALTIMETRY_HI_RES, "altimetry-hi"),
            (SensorType::ALTIMETRY, "altimetry"),
            (SensorType::BIOME, "biome"),
            (SensorType::ANOMALY, "anomaly"),
            (SensorType::ANOMALY_DETAIL, "anomaly-detail"),
            (SensorType::EVERYTHING, "everything"),
        ];

        if self.is_empty() {
            return "nothing";
        }
        LABELS
            .iter()
            .find(|(mask, _)| mask == self)
            .map(|(_, label)| *label)
            .unwrap_or("mixed")
    }
}

impl std::fmt::Display for SensorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for SensorType {
    type Err = String;

    /// Parse a comma separated list of labels, e.g. `"altimetry-lo,biome"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mask = SensorType::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            mask |= match part.to_lowercase().as_str() {
                "altimetry-lo" | "lores" => SensorType::ALTIMETRY_LO_RES,
                "altimetry-hi" | "hires" => SensorType::ALTIMETRY_HI_RES,
                "altimetry" => SensorType::ALTIMETRY,
                "biome" => SensorType::BIOME,
                "anomaly" => SensorType::ANOMALY,
                "anomaly-detail" => SensorType::ANOMALY_DETAIL,
                "everything" | "all" => SensorType::EVERYTHING,
                other => return Err(format!("unknown sensor type '{}'", other)),
            };
        }
        Ok(mask)
    }
}
