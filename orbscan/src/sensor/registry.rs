//! Per-vehicle sensor registry.
//!
//! The registry is the authority on which sensors each vehicle carries and
//! where each vehicle was last sampled. Entries are created on first
//! registration and are never removed by the scanning core; only the
//! persistence collaborator purges them.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{SensorConfig, SensorEnvelope, SensorType};
use crate::coord::{normalize_latitude, normalize_longitude};

/// Stable identity of a vehicle.
///
/// Vehicles are keyed by id, never by name: names change and collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub Uuid);

impl VehicleId {
    /// Generate a fresh random id.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for VehicleId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VehicleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Registry lookups that found nothing.
///
/// Vehicles and sensors come and go during normal operation, so these are
/// ordinary "not found" answers rather than failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The vehicle has never been registered.
    #[error("unknown vehicle {0}")]
    UnknownVehicle(VehicleId),

    /// The vehicle exists but does not carry this sensor.
    #[error("vehicle {vehicle} has no {sensor} sensor")]
    UnknownSensor {
        vehicle: VehicleId,
        sensor: SensorType,
    },
}

/// Everything the registry tracks about one vehicle.
#[derive(Debug, Clone)]
pub struct VehicleState {
    /// Vehicle identity.
    pub id: VehicleId,
    /// Display name, informational only.
    pub name: Option<String>,
    /// Name of the body the vehicle orbited at its last sample.
    pub body: Option<String>,
    /// Registered sensors, one entry per single sensor bit.
    pub sensors: BTreeMap<SensorType, SensorConfig>,
    /// Normalized latitude of the last sample.
    pub last_latitude: f64,
    /// Normalized longitude of the last sample.
    pub last_longitude: f64,
    /// Frame number of the last sample (0 = never sampled).
    pub last_frame: u64,
    /// Universal time of the last sample (0 = never sampled).
    pub last_universal_time: f64,
}

impl VehicleState {
    fn new(id: VehicleId) -> Self {
        Self {
            id,
            name: None,
            body: None,
            sensors: BTreeMap::new(),
            last_latitude: 0.0,
            last_longitude: 0.0,
            last_frame: 0,
            last_universal_time: 0.0,
        }
    }

    /// Union of all registered sensor bits.
    pub fn active_sensors(&self) -> SensorType {
        self.sensors
            .keys()
            .fold(SensorType::empty(), |acc, bit| acc | *bit)
    }

    /// Whether a previous sample exists to interpolate back towards.
    #[inline]
    pub fn has_anchor(&self) -> bool {
        self.last_universal_time > 0.0 && self.last_frame > 0
    }

    /// Record the sample a tick ended on.
    ///
    /// Time and frame never move backwards; a stale update only refreshes
    /// the position.
    pub fn record_anchor(
        &mut self,
        body: &str,
        latitude: f64,
        longitude: f64,
        frame: u64,
        universal_time: f64,
    ) {
        if self.body.as_deref() != Some(body) {
            self.body = Some(body.to_string());
        }
        self.last_latitude = normalize_latitude(latitude);
        self.last_longitude = normalize_longitude(longitude);
        self.last_frame = self.last_frame.max(frame);
        if universal_time > self.last_universal_time {
            self.last_universal_time = universal_time;
        }
    }
}

/// Owns the sensor configuration of every known vehicle.
#[derive(Debug, Default)]
pub struct SensorRegistry {
    vehicles: HashMap<VehicleId, VehicleState>,
}

impl SensorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every single sensor bit in `mask` on a vehicle.
    ///
    /// Existing configurations for those bits are overwritten. When the
    /// envelope requests defaults, each bit gets its own default profile.
    pub fn register_sensors(&mut self, id: VehicleId, mask: SensorType, envelope: SensorEnvelope) {
        let vehicle = self
            .vehicles
            .entry(id)
            .or_insert_with(|| VehicleState::new(id));

        for bit in mask.single_bits() {
            let resolved = envelope.resolve_for(bit);
            vehicle
                .sensors
                .entry(bit)
                .and_modify(|config| config.apply(resolved))
                .or_insert_with(|| SensorConfig::new(bit, resolved));
        }

        tracing::debug!(
            vehicle = %id,
            sensors = ?mask,
            active = ?vehicle.active_sensors(),
            "Registered sensors"
        );
    }

    /// Register sensors and seed the vehicle's position from a live sample.
    pub fn register_sensors_at(
        &mut self,
        id: VehicleId,
        mask: SensorType,
        envelope: SensorEnvelope,
        latitude: f64,
        longitude: f64,
    ) {
        self.register_sensors(id, mask, envelope);
        if let Some(vehicle) = self.vehicles.get_mut(&id) {
            vehicle.last_latitude = normalize_latitude(latitude);
            vehicle.last_longitude = normalize_longitude(longitude);
        }
    }

    /// Set a vehicle's display name.
    pub fn set_vehicle_name(
        &mut self,
        id: VehicleId,
        name: impl Into<String>,
    ) -> Result<(), LookupError> {
        self.vehicle_mut(id)?.name = Some(name.into());
        Ok(())
    }

    /// Remove every sensor bit in `mask` from a vehicle.
    ///
    /// Bits that are not registered, and unknown vehicles, are ignored. The
    /// vehicle entry itself is kept even when its last sensor goes.
    pub fn unregister_sensors(&mut self, id: VehicleId, mask: SensorType) {
        let Some(vehicle) = self.vehicles.get_mut(&id) else {
            return;
        };

        vehicle.sensors.retain(|bit, _| !mask.contains(*bit));

        tracing::debug!(
            vehicle = %id,
            sensors = ?mask,
            remaining = ?vehicle.active_sensors(),
            "Unregistered sensors"
        );
    }

    /// Whether the vehicle carries at least one sensor.
    pub fn is_known(&self, id: VehicleId) -> bool {
        self.vehicles
            .get(&id)
            .is_some_and(|vehicle| !vehicle.sensors.is_empty())
    }

    /// Whether the vehicle carries any sensor in `mask`.
    pub fn is_known_with(&self, id: VehicleId, mask: SensorType) -> bool {
        self.active_sensors(id).intersects(mask)
    }

    /// Union of the vehicle's registered sensor bits.
    pub fn active_sensors(&self, id: VehicleId) -> SensorType {
        self.vehicles
            .get(&id)
            .map(VehicleState::active_sensors)
            .unwrap_or_else(SensorType::empty)
    }

    /// Configuration of one sensor bit on a vehicle.
    pub fn sensor_status(
        &self,
        id: VehicleId,
        sensor: SensorType,
    ) -> Result<&SensorConfig, LookupError> {
        let vehicle = self
            .vehicles
            .get(&id)
            .ok_or(LookupError::UnknownVehicle(id))?;
        vehicle.sensors.get(&sensor).ok_or(LookupError::UnknownSensor {
            vehicle: id,
            sensor,
        })
    }

    /// Full state of a vehicle.
    pub fn vehicle(&self, id: VehicleId) -> Result<&VehicleState, LookupError> {
        self.vehicles
            .get(&id)
            .ok_or(LookupError::UnknownVehicle(id))
    }

    /// Mutable state of a vehicle.
    pub fn vehicle_mut(&mut self, id: VehicleId) -> Result<&mut VehicleState, LookupError> {
        self.vehicles
            .get_mut(&id)
            .ok_or(LookupError::UnknownVehicle(id))
    }

    /// Iterate over all vehicle entries, including ones with no sensors.
    pub fn vehicles(&self) -> impl Iterator<Item = &VehicleState> {
        self.vehicles.values()
    }

    /// Number of vehicle entries.
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Whether the registry has no vehicle entries.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Drop a vehicle entry entirely.
    ///
    /// Only the persistence layer calls this; scanning never deletes
    /// vehicles.
    pub fn purge(&mut self, id: VehicleId) -> Option<VehicleState> {
        self.vehicles.remove(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle() -> VehicleId {
        VehicleId(Uuid::from_u128(0x5ca4_0001))
    }

    #[test]
    fn test_register_creates_vehicle() {
        let mut registry = SensorRegistry::new();
        assert!(!registry.is_known(vehicle()));

        registry.register_sensors(vehicle(), SensorType::BIOME, SensorEnvelope::DEFAULTS);

        assert!(registry.is_known(vehicle()));
        assert_eq!(registry.active_sensors(vehicle()), SensorType::BIOME);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_unions_with_existing() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(vehicle(), SensorType::BIOME, SensorEnvelope::DEFAULTS);
        registry.register_sensors(vehicle(), SensorType::ALTIMETRY, SensorEnvelope::DEFAULTS);

        assert_eq!(
            registry.active_sensors(vehicle()),
            SensorType::BIOME | SensorType::ALTIMETRY
        );
    }

    #[test]
    fn test_mixed_mask_gets_per_bit_defaults() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(
            vehicle(),
            SensorType::ALTIMETRY | SensorType::ANOMALY_DETAIL,
            SensorEnvelope::DEFAULTS,
        );

        let lo = registry
            .sensor_status(vehicle(), SensorType::ALTIMETRY_LO_RES)
            .unwrap();
        let hi = registry
            .sensor_status(vehicle(), SensorType::ALTIMETRY_HI_RES)
            .unwrap();
        let detail = registry
            .sensor_status(vehicle(), SensorType::ANOMALY_DETAIL)
            .unwrap();

        assert_eq!(lo.fov, 5.0);
        assert_eq!(hi.fov, 3.0);
        assert_eq!(detail.fov, 1.0);
        assert_eq!(detail.max_altitude, 2_000.0);
    }

    #[test]
    fn test_register_overwrites_envelope() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(vehicle(), SensorType::BIOME, SensorEnvelope::DEFAULTS);
        registry.register_sensors(
            vehicle(),
            SensorType::BIOME,
            SensorEnvelope::new(2.0, 10.0, 100.0, 50.0),
        );

        let biome = registry.sensor_status(vehicle(), SensorType::BIOME).unwrap();
        assert_eq!(biome.envelope(), SensorEnvelope::new(2.0, 10.0, 100.0, 50.0));
        assert_eq!(registry.vehicle(vehicle()).unwrap().sensors.len(), 1);
    }

    #[test]
    fn test_unregister_last_sensor_keeps_entry() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(vehicle(), SensorType::BIOME, SensorEnvelope::DEFAULTS);
        registry.unregister_sensors(vehicle(), SensorType::BIOME);

        assert!(!registry.is_known(vehicle()));
        assert!(registry.vehicle(vehicle()).is_ok());
        assert_eq!(registry.active_sensors(vehicle()), SensorType::empty());
    }

    #[test]
    fn test_unregister_ignores_missing_bits() {
        let mut registry = SensorRegistry::new();
        registry.unregister_sensors(vehicle(), SensorType::EVERYTHING);
        assert!(registry.is_empty());

        registry.register_sensors(vehicle(), SensorType::ANOMALY, SensorEnvelope::DEFAULTS);
        registry.unregister_sensors(vehicle(), SensorType::BIOME);
        assert_eq!(registry.active_sensors(vehicle()), SensorType::ANOMALY);
    }

    #[test]
    fn test_is_known_with_mask() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(
            vehicle(),
            SensorType::ALTIMETRY_HI_RES,
            SensorEnvelope::DEFAULTS,
        );

        assert!(registry.is_known_with(vehicle(), SensorType::ALTIMETRY));
        assert!(!registry.is_known_with(vehicle(), SensorType::BIOME));
        assert!(!registry.is_known_with(VehicleId::new_random(), SensorType::EVERYTHING));
    }

    #[test]
    fn test_sensor_status_not_found() {
        let mut registry = SensorRegistry::new();
        let other = VehicleId::new_random();
        assert_eq!(
            registry.sensor_status(other, SensorType::BIOME),
            Err(LookupError::UnknownVehicle(other))
        );

        registry.register_sensors(vehicle(), SensorType::ANOMALY, SensorEnvelope::DEFAULTS);
        assert!(matches!(
            registry.sensor_status(vehicle(), SensorType::BIOME),
            Err(LookupError::UnknownSensor { .. })
        ));
    }

    #[test]
    fn test_register_at_normalizes_position() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors_at(
            vehicle(),
            SensorType::BIOME,
            SensorEnvelope::DEFAULTS,
            -95.0,
            185.0,
        );

        let state = registry.vehicle(vehicle()).unwrap();
        assert_eq!(state.last_latitude, 85.0);
        assert_eq!(state.last_longitude, -175.0);
        assert!(!state.has_anchor());
    }

    #[test]
    fn test_record_anchor_is_monotonic() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(vehicle(), SensorType::BIOME, SensorEnvelope::DEFAULTS);
        let state = registry.vehicle_mut(vehicle()).unwrap();

        state.record_anchor("Kerbin", 10.0, 20.0, 5, 1_000.0);
        state.record_anchor("Kerbin", 11.0, 21.0, 3, 900.0);

        assert_eq!(state.last_frame, 5);
        assert_eq!(state.last_universal_time, 1_000.0);
        assert_eq!(state.last_latitude, 11.0);
        assert_eq!(state.body.as_deref(), Some("Kerbin"));
        assert!(state.has_anchor());
    }

    #[test]
    fn test_purge_removes_entry() {
        let mut registry = SensorRegistry::new();
        registry.register_sensors(vehicle(), SensorType::BIOME, SensorEnvelope::DEFAULTS);
        assert!(registry.purge(vehicle()).is_some());
        assert!(registry.vehicle(vehicle()).is_err());
    }

    #[test]
    fn test_lookup_error_display() {
        let err = LookupError::UnknownSensor {
            vehicle: vehicle(),
            sensor: SensorType::BIOME,
        };
        assert!(err.to_string().contains("no biome sensor"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_register_then_unregister_all(
                existing in 0u32..64,
                added in 0u32..64,
            ) {
                let existing = SensorType::from_bits_truncate(existing);
                let added = SensorType::from_bits_truncate(added);
                let id = VehicleId(Uuid::from_u128(7));
                let mut registry = SensorRegistry::new();

                registry.register_sensors(id, existing, SensorEnvelope::DEFAULTS);
                registry.register_sensors(id, added, SensorEnvelope::DEFAULTS);

                let active = registry.active_sensors(id);
                prop_assert_eq!(active, existing | added);

                registry.unregister_sensors(id, active);
                prop_assert_eq!(registry.active_sensors(id), SensorType::empty());
                prop_assert!(!registry.is_known(id));
            }
        }
    }
}
