//! Vibration profile types for the Asycube's four-actuator platform.
//!
//! A profile names up to four actuator slots, each carrying drive
//! parameters, plus a playback duration. Profiles are also deserializable
//! from the JSON document shape used by the plant tooling:
//!
//! ```json
//! {
//!     "B": {
//!         "1": { "amplitude": 60, "frequency": 150, "phase": 0, "waveform": "1" },
//!         "2": { "amplitude": 75, "frequency": 150 },
//!         "duration": 1200
//!     }
//! }
//! ```
//!
//! Slot keys are the actuator numbers 1-4; `duration` is a sibling key in
//! milliseconds. Absent parameter fields take the device defaults
//! (amplitude/frequency/phase 0, waveform 1), and `waveform` may be either
//! a number or a numeral string.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::IntoEnumIterator;

/// Playback duration used when a profile does not specify one.
pub const DEFAULT_DURATION_MS: u32 = 1000;

/// Asycube actuator slot identifiers (1-based).
///
/// The platform drives up to 4 actuators, numbered 1-4. Every encoded
/// profile carries a block for all four slots whether or not parameters
/// were supplied for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
#[repr(u8)]
pub enum Actuator {
    /// Slot 1
    Actuator1 = 1,
    /// Slot 2
    Actuator2 = 2,
    /// Slot 3
    Actuator3 = 3,
    /// Slot 4
    Actuator4 = 4,
}

impl Actuator {
    /// Get the 1-based slot number.
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Get the slot key used in profile documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Actuator::Actuator1 => "1",
            Actuator::Actuator2 => "2",
            Actuator::Actuator3 => "3",
            Actuator::Actuator4 => "4",
        }
    }

    fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for Actuator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Actuator::Actuator1),
            "2" => Ok(Actuator::Actuator2),
            "3" => Ok(Actuator::Actuator3),
            "4" => Ok(Actuator::Actuator4),
            _ => Err(format!("Invalid actuator slot: {s}, expected 1-4")),
        }
    }
}

/// Drive parameters for a single actuator slot.
///
/// No field-level validation is performed here: values are encoded onto
/// the wire verbatim and the device rejects anything it cannot run (in its
/// reply text, which this crate does not interpret). Amplitude is 0-100 by
/// convention and frequency is in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorParams {
    /// Vibration amplitude (0-100 by convention).
    pub amplitude: i32,
    /// Vibration frequency in Hz.
    pub frequency: i32,
    /// Phase offset in device units.
    pub phase: i32,
    /// Waveform selector, encoded as a numeral.
    #[serde(deserialize_with = "numeral")]
    pub waveform: i32,
}

impl Default for ActuatorParams {
    /// Device defaults: zero drive with the standard waveform (1).
    fn default() -> Self {
        Self {
            amplitude: 0,
            frequency: 0,
            phase: 0,
            waveform: 1,
        }
    }
}

/// Profile documents carry `waveform` as either a bare number or a numeral
/// string ("1"); accept both.
fn numeral<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumeralVisitor;

    impl Visitor<'_> for NumeralVisitor {
        type Value = i32;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a numeral string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i32, E> {
            i32::try_from(v).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i32, E> {
            i32::try_from(v).map_err(E::custom)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i32, E> {
            v.trim().parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(NumeralVisitor)
}

/// Identifier naming a vibration profile on the device (e.g. "B").
///
/// The client does not interpret the token; it is spliced into the SC and
/// C command bodies as-is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(String);

impl ProfileId {
    /// Wrap a profile identifier token.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as sent on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProfileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<char> for ProfileId {
    fn from(id: char) -> Self {
        Self(id.to_string())
    }
}

/// A named vibration configuration: up to four actuator slots plus a
/// playback duration in milliseconds.
///
/// Slots left unset are not the same as slots set to
/// [`ActuatorParams::default()`]: an unset slot encodes as the literal
/// idle block `0;0;0;0;` (waveform 0), while a default-constructed slot
/// carries the standard waveform 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VibrationProfile {
    slots: [Option<ActuatorParams>; 4],
    duration_ms: u32,
}

impl Default for VibrationProfile {
    fn default() -> Self {
        Self {
            slots: [None; 4],
            duration_ms: DEFAULT_DURATION_MS,
        }
    }
}

impl VibrationProfile {
    /// Empty profile with the default 1000 ms duration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty profile with an explicit playback duration.
    pub fn with_duration(duration_ms: u32) -> Self {
        Self {
            slots: [None; 4],
            duration_ms,
        }
    }

    /// Set the drive parameters for one actuator slot.
    pub fn set_slot(&mut self, actuator: Actuator, params: ActuatorParams) {
        self.slots[actuator.index()] = Some(params);
    }

    /// Clear one actuator slot back to idle.
    pub fn clear_slot(&mut self, actuator: Actuator) {
        self.slots[actuator.index()] = None;
    }

    /// Drive parameters for one slot, if set.
    pub fn slot(&self, actuator: Actuator) -> Option<ActuatorParams> {
        self.slots[actuator.index()]
    }

    /// Number of slots with parameters set (0-4).
    pub fn active_slots(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Playback duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Set the playback duration in milliseconds.
    pub fn set_duration_ms(&mut self, duration_ms: u32) {
        self.duration_ms = duration_ms;
    }
}

impl Serialize for VibrationProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.active_slots() + 1))?;
        for actuator in Actuator::iter() {
            if let Some(params) = self.slot(actuator) {
                map.serialize_entry(actuator.as_str(), &params)?;
            }
        }
        map.serialize_entry("duration", &self.duration_ms)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for VibrationProfile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProfileVisitor;

        impl<'de> Visitor<'de> for ProfileVisitor {
            type Value = VibrationProfile;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of actuator slots (\"1\"-\"4\") and an optional \"duration\"")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut profile = VibrationProfile::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == "duration" {
                        profile.duration_ms = map.next_value()?;
                    } else {
                        let actuator: Actuator = key.parse().map_err(de::Error::custom)?;
                        profile.set_slot(actuator, map.next_value()?);
                    }
                }
                Ok(profile)
            }
        }

        deserializer.deserialize_map(ProfileVisitor)
    }
}

/// Profile document: vibration profiles keyed by identifier.
///
/// Backed by a sorted map so that applying a multi-profile document has a
/// defined order (and one response per identifier) instead of depending on
/// document key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileSet(BTreeMap<ProfileId, VibrationProfile>);

impl ProfileSet {
    /// Empty profile set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a profile document from JSON text.
    pub fn from_json(doc: &str) -> serde_json::Result<Self> {
        serde_json::from_str(doc)
    }

    /// Insert or replace the profile stored under `id`.
    pub fn insert(
        &mut self,
        id: impl Into<ProfileId>,
        profile: VibrationProfile,
    ) -> Option<VibrationProfile> {
        self.0.insert(id.into(), profile)
    }

    /// The profile stored under `id`, if any.
    pub fn get(&self, id: &ProfileId) -> Option<&VibrationProfile> {
        self.0.get(id)
    }

    /// Iterate profiles in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProfileId, &VibrationProfile)> {
        self.0.iter()
    }

    /// Number of profiles in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the set holds no profiles.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ProfileId, VibrationProfile)> for ProfileSet {
    fn from_iter<T: IntoIterator<Item = (ProfileId, VibrationProfile)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actuator_roundtrip() {
        for actuator in Actuator::iter() {
            let parsed: Actuator = actuator.as_str().parse().unwrap();
            assert_eq!(parsed, actuator);
            assert_eq!(actuator.to_string(), actuator.as_str());
        }
    }

    #[test]
    fn test_actuator_rejects_out_of_range() {
        assert!("0".parse::<Actuator>().is_err());
        assert!("5".parse::<Actuator>().is_err());
        assert!("duration".parse::<Actuator>().is_err());
    }

    #[test]
    fn test_params_default_waveform_is_one() {
        let params = ActuatorParams::default();
        assert_eq!(params.amplitude, 0);
        assert_eq!(params.frequency, 0);
        assert_eq!(params.phase, 0);
        assert_eq!(params.waveform, 1);
    }

    #[test]
    fn test_params_missing_fields_take_defaults() {
        let params: ActuatorParams = serde_json::from_str(r#"{"amplitude": 75}"#).unwrap();
        assert_eq!(params.amplitude, 75);
        assert_eq!(params.frequency, 0);
        assert_eq!(params.waveform, 1);
    }

    #[test]
    fn test_waveform_accepts_numeral_string() {
        let params: ActuatorParams = serde_json::from_str(r#"{"waveform": "2"}"#).unwrap();
        assert_eq!(params.waveform, 2);

        let params: ActuatorParams = serde_json::from_str(r#"{"waveform": 2}"#).unwrap();
        assert_eq!(params.waveform, 2);
    }

    #[test]
    fn test_waveform_rejects_non_numeral_string() {
        let result = serde_json::from_str::<ActuatorParams>(r#"{"waveform": "sine"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_document_shape() {
        let doc = r#"
        {
            "B": {
                "1": { "amplitude": 50, "frequency": 100, "phase": 0, "waveform": "1" },
                "2": { "amplitude": 75, "frequency": 150, "phase": 0, "waveform": "1" },
                "duration": 1200
            }
        }"#;

        let set = ProfileSet::from_json(doc).unwrap();
        assert_eq!(set.len(), 1);

        let profile = set.get(&ProfileId::new("B")).unwrap();
        assert_eq!(profile.duration_ms(), 1200);
        assert_eq!(profile.active_slots(), 2);

        let slot1 = profile.slot(Actuator::Actuator1).unwrap();
        assert_eq!(slot1.amplitude, 50);
        assert_eq!(slot1.frequency, 100);
        assert!(profile.slot(Actuator::Actuator3).is_none());
    }

    #[test]
    fn test_profile_duration_defaults_to_1000() {
        let doc = r#"{"A": {"1": {"amplitude": 10}}}"#;
        let set = ProfileSet::from_json(doc).unwrap();
        let profile = set.get(&ProfileId::new("A")).unwrap();
        assert_eq!(profile.duration_ms(), DEFAULT_DURATION_MS);
    }

    #[test]
    fn test_profile_rejects_out_of_range_slot_key() {
        let doc = r#"{"A": {"5": {"amplitude": 10}}}"#;
        assert!(ProfileSet::from_json(doc).is_err());
    }

    #[test]
    fn test_profile_serialize_roundtrip() {
        let mut profile = VibrationProfile::with_duration(1500);
        profile.set_slot(
            Actuator::Actuator2,
            ActuatorParams {
                amplitude: 40,
                frequency: 120,
                ..ActuatorParams::default()
            },
        );

        let json = serde_json::to_string(&profile).unwrap();
        let back: VibrationProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_profile_set_orders_by_identifier() {
        let set: ProfileSet = ["C", "A", "B"]
            .into_iter()
            .map(|id| (ProfileId::new(id), VibrationProfile::new()))
            .collect();

        let ids: Vec<&str> = set.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn test_insert_replaces_existing_profile() {
        let mut set = ProfileSet::new();
        assert!(set.insert("A", VibrationProfile::new()).is_none());

        let replaced = set.insert("A", VibrationProfile::with_duration(2000));
        assert_eq!(replaced, Some(VibrationProfile::new()));
        assert_eq!(set.get(&ProfileId::new("A")).unwrap().duration_ms(), 2000);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_clear_slot() {
        let mut profile = VibrationProfile::new();
        profile.set_slot(Actuator::Actuator1, ActuatorParams::default());
        assert_eq!(profile.active_slots(), 1);

        profile.clear_slot(Actuator::Actuator1);
        assert_eq!(profile.active_slots(), 0);
        assert!(profile.slot(Actuator::Actuator1).is_none());
    }
}
