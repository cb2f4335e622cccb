//! Wire grammar for the Asycube's braced plaintext command protocol.
//!
//! Every command is a short ASCII body wrapped as `{body}\r\n`. Three body
//! shapes cover the driver's surface:
//!
//! - Profile-set: `SC<id>=(a1;f1;p1;w1;...;a4;f4;p4;w4;<durationMs>)`
//!   loads a vibration profile into the device's profile store. All four
//!   actuator blocks are always present, slot 1 first; slots the profile
//!   does not populate render as the literal idle block `0;0;0;0;`.
//! - Commit: `C<id>` starts playback of the named profile.
//! - Parameter-set: `WP<address>=<value>` writes one field of one
//!   actuator's parameter bank, with `address = actuator * 100 + offset`.
//!
//! Replies carry no documented framing and are treated as raw text by the
//! link layer; nothing here parses them.

use strum::IntoEnumIterator;

use crate::profile::{Actuator, ProfileId, VibrationProfile};

/// Block encoded for an actuator slot with no parameters supplied.
pub const EMPTY_SLOT_BLOCK: &str = "0;0;0;0;";

/// Writable fields of an actuator's parameter bank.
///
/// The device maps each actuator to a bank of 100 addresses; the
/// discriminant is the field's offset within the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ParamField {
    /// Vibration amplitude (0-100 by convention).
    Amplitude = 1,
    /// Vibration frequency in Hz.
    Frequency = 2,
}

impl ParamField {
    /// Device address of this field on the given actuator.
    ///
    /// Actuator ids are expected in 1-26 but are not range-checked; the
    /// device answers unmapped addresses with an error reply.
    pub fn address(self, actuator_id: u8) -> u32 {
        u32::from(actuator_id) * 100 + self as u32
    }
}

/// Render the profile-set body for one profile.
///
/// ```
/// use asycube::command::profile_set_body;
/// use asycube::profile::{ProfileId, VibrationProfile};
///
/// let body = profile_set_body(&ProfileId::new("A"), &VibrationProfile::new());
/// assert_eq!(body, "SCA=(0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;0;1000)");
/// ```
pub fn profile_set_body(id: &ProfileId, profile: &VibrationProfile) -> String {
    let mut body = format!("SC{id}=(");
    for actuator in Actuator::iter() {
        match profile.slot(actuator) {
            Some(p) => {
                body.push_str(&format!(
                    "{};{};{};{};",
                    p.amplitude, p.frequency, p.phase, p.waveform
                ));
            }
            None => body.push_str(EMPTY_SLOT_BLOCK),
        }
    }
    body.push_str(&format!("{})", profile.duration_ms()));
    body
}

/// Render the commit body that starts playback of a stored profile.
pub fn commit_body(id: &ProfileId) -> String {
    format!("C{id}")
}

/// Render the parameter-set body for one actuator field.
pub fn param_set_body(actuator_id: u8, field: ParamField, value: i32) -> String {
    format!("WP{}={}", field.address(actuator_id), value)
}

/// Wrap a body in the device's command framing: `{body}\r\n`.
pub fn frame(body: &str) -> String {
    format!("{{{body}}}\r\n")
}
