//! Driver for the Asyril Asycube vibratory feeder.
//!
//! The Asycube is a four-actuator vibration platform used to singulate
//! bulk parts for pick-and-place. It is controlled over a plain TCP socket
//! (factory default `192.168.127.254:4001`) speaking a braced plaintext
//! protocol: each command is an ASCII body framed as `{body}\r\n`, and
//! each reply is raw text with no documented framing.
//!
//! The crate splits into:
//!
//! - [`profile`]: vibration profile types ([`VibrationProfile`],
//!   [`ProfileSet`]), deserializable from the plant JSON document shape
//! - [`command`]: the pure wire grammar (profile-set, commit,
//!   parameter-set bodies and the `{...}\r\n` framing)
//! - [`link`]: the synchronous TCP command/response link
//!   ([`CommandLink`]) and the [`CubeError`] taxonomy
//! - [`asycube`]: the typed driver ([`Asycube`])
//!
//! # Example
//!
//! ```no_run
//! use asycube::{Asycube, ProfileSet};
//!
//! let doc = r#"{"B": {"1": {"amplitude": 60, "frequency": 150}, "duration": 1000}}"#;
//! let profiles = ProfileSet::from_json(doc)?;
//!
//! let mut cube = Asycube::default();
//! cube.connect()?;
//! for (id, response) in cube.apply(&profiles)? {
//!     println!("{id}: {}", response.trim());
//! }
//! cube.disconnect();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod asycube;
pub mod command;
pub mod link;
pub mod profile;

pub use asycube::Asycube;
pub use command::ParamField;
pub use link::{CommandLink, CubeError, CubeResult, DEFAULT_HOST, DEFAULT_PORT};
pub use profile::{
    Actuator, ActuatorParams, ProfileId, ProfileSet, VibrationProfile, DEFAULT_DURATION_MS,
};
