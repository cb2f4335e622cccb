//! High-level driver for the Asycube vibratory feeder.
//!
//! Wraps a [`CommandLink`] with typed operations: loading and triggering
//! vibration profiles, applying multi-profile documents, and writing
//! single actuator parameters. Device replies are returned as raw text
//! for the caller to interpret.
//!
//! # Example
//!
//! ```no_run
//! use asycube::{Actuator, ActuatorParams, Asycube, ProfileId, VibrationProfile};
//!
//! let mut cube = Asycube::new("192.168.127.254", 4001);
//! cube.connect()?;
//!
//! let mut profile = VibrationProfile::new();
//! profile.set_slot(
//!     Actuator::Actuator1,
//!     ActuatorParams { amplitude: 60, frequency: 150, ..ActuatorParams::default() },
//! );
//! let reply = cube.set_profile(&ProfileId::new("B"), &profile)?;
//! println!("device said: {}", reply.trim());
//!
//! cube.disconnect();
//! # Ok::<(), asycube::CubeError>(())
//! ```

use std::time::Duration;

use tracing::debug;

use crate::command::{self, ParamField};
use crate::link::{CommandLink, CubeResult};
use crate::profile::{ProfileId, ProfileSet, VibrationProfile};

/// Driver for one Asycube feeder.
pub struct Asycube {
    link: CommandLink,
}

impl Asycube {
    /// Driver for a feeder at `host:port`, not yet connected.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            link: CommandLink::new(host, port),
        }
    }

    /// Open the TCP connection to the feeder.
    pub fn connect(&mut self) -> CubeResult<()> {
        self.link.connect()
    }

    /// Close the connection. A no-op when not connected.
    pub fn disconnect(&mut self) {
        self.link.disconnect();
    }

    /// True while the connection is live.
    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// How long to wait for the first response bytes of each exchange.
    pub fn set_response_timeout(&mut self, timeout: Duration) {
        self.link.set_response_timeout(timeout);
    }

    /// Idle gap after which a response is considered complete.
    pub fn set_drain_window(&mut self, window: Duration) {
        self.link.set_drain_window(window);
    }

    /// Load a vibration profile and immediately trigger playback.
    ///
    /// Sends the profile-set command followed by the commit for the same
    /// identifier. Returns the profile-set response; the commit's response
    /// is logged and discarded. A transport failure on either exchange
    /// propagates: a lost commit means the profile never played.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use asycube::{Actuator, ActuatorParams, Asycube, ProfileId, VibrationProfile};
    /// # let mut cube = Asycube::default();
    /// # cube.connect()?;
    /// let mut profile = VibrationProfile::with_duration(500);
    /// profile.set_slot(
    ///     Actuator::Actuator2,
    ///     ActuatorParams { amplitude: 75, frequency: 150, ..ActuatorParams::default() },
    /// );
    /// cube.set_profile(&ProfileId::new("B"), &profile)?;
    /// # Ok::<(), asycube::CubeError>(())
    /// ```
    pub fn set_profile(&mut self, id: &ProfileId, profile: &VibrationProfile) -> CubeResult<String> {
        let response = self.link.exchange(&command::profile_set_body(id, profile))?;
        let commit = self.link.exchange(&command::commit_body(id))?;
        debug!("commit {id}: {:?}", commit.trim());
        Ok(response)
    }

    /// Apply every profile in a set, in identifier order.
    ///
    /// Each profile gets its own set-then-commit pair and its own
    /// profile-set response. Stops at the first transport error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use asycube::{Asycube, ProfileSet};
    /// # let mut cube = Asycube::default();
    /// # cube.connect()?;
    /// let doc = r#"{"A": {"1": {"amplitude": 30, "frequency": 100}}}"#;
    /// for (id, response) in cube.apply(&ProfileSet::from_json(doc)?)? {
    ///     println!("{id}: {}", response.trim());
    /// }
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn apply(&mut self, set: &ProfileSet) -> CubeResult<Vec<(ProfileId, String)>> {
        let mut responses = Vec::with_capacity(set.len());
        for (id, profile) in set.iter() {
            let response = self.set_profile(id, profile)?;
            responses.push((id.clone(), response));
        }
        Ok(responses)
    }

    /// Write the amplitude parameter of one actuator (0-100 by
    /// convention). The value is encoded verbatim; out-of-range values are
    /// the device's to reject, in its reply text.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use asycube::Asycube;
    /// # let mut cube = Asycube::default();
    /// # cube.connect()?;
    /// cube.set_amplitude(3, 40)?; // sends WP301=40
    /// # Ok::<(), asycube::CubeError>(())
    /// ```
    pub fn set_amplitude(&mut self, actuator_id: u8, amplitude: i32) -> CubeResult<String> {
        self.link
            .exchange(&command::param_set_body(actuator_id, ParamField::Amplitude, amplitude))
    }

    /// Write the frequency parameter of one actuator, in Hz.
    pub fn set_frequency(&mut self, actuator_id: u8, frequency: i32) -> CubeResult<String> {
        self.link
            .exchange(&command::param_set_body(actuator_id, ParamField::Frequency, frequency))
    }

    /// Send an arbitrary command body, framed, and return the raw reply.
    ///
    /// Escape hatch for device commands the typed surface does not cover.
    pub fn send_raw(&mut self, body: &str) -> CubeResult<String> {
        self.link.exchange(body)
    }
}

impl Default for Asycube {
    /// Driver for the factory-default peer,
    /// [`DEFAULT_HOST`](crate::DEFAULT_HOST):[`DEFAULT_PORT`](crate::DEFAULT_PORT).
    fn default() -> Self {
        Self {
            link: CommandLink::default(),
        }
    }
}
