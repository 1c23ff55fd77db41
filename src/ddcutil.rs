//! [`DdcBackend`] implementation backed by the `ddcutil` command-line tool.
//!
//! Every operation is one short-lived child process:
//!
//! - `ddcutil detect` for discovery,
//! - `ddcutil --bus=<N> getvcp <code>` for reads,
//! - `ddcutil --bus=<N> setvcp <code> <value>` for writes.
//!
//! The tool addresses monitors by I2C bus number; feature codes come from
//! [`VcpFeature::code`]. No persistent handle to the hardware is held, so
//! serializing concurrent access is the caller's job (see
//! [`MonitorController`](crate::monitor::MonitorController)).

use crate::display::{parse_current_value, VcpFeature};
use crate::tool::{run_capture, ToolError};
use crate::traits::DdcBackend;

/// DDC backend that shells out to `ddcutil`.
pub struct Ddcutil {
    program: String,
}

impl Default for Ddcutil {
    fn default() -> Self {
        Self::new("ddcutil")
    }
}

impl Ddcutil {
    /// Create a backend invoking `program` (normally just `"ddcutil"`,
    /// overridable through the config for wrapper scripts or absolute
    /// paths).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DdcBackend for Ddcutil {
    type Error = ToolError;

    fn detect(&self) -> Result<String, ToolError> {
        run_capture(&self.program, &["detect"])
    }

    fn get_vcp(&self, bus: u8, feature: VcpFeature) -> Result<u8, ToolError> {
        let bus_arg = format!("--bus={}", bus);
        let out = run_capture(&self.program, &[bus_arg.as_str(), "getvcp", feature.code()])?;
        parse_current_value(&out).ok_or_else(|| ToolError::Parse {
            program: self.program.clone(),
            detail: format!("no current value in getvcp output: {}", out.trim()),
        })
    }

    fn set_vcp(&self, bus: u8, feature: VcpFeature, value: u8) -> Result<(), ToolError> {
        let bus_arg = format!("--bus={}", bus);
        let value = value.to_string();
        run_capture(
            &self.program,
            &[bus_arg.as_str(), "setvcp", feature.code(), value.as_str()],
        )
        .map(|_| ())
    }
}
