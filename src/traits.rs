//! Core traits that decouple the deck from the concrete command-line tools
//! and from any specific command transport.
//!
//! Every external collaborator sits behind one of these traits: the DDC
//! monitor tool behind [`DdcBackend`], the radio tools behind [`Radio`], and
//! the command transports behind [`CommandSource`]. The
//! [`Deck`](crate::deck::Deck) and
//! [`MonitorController`](crate::monitor::MonitorController) only depend on
//! the abstractions, so tests substitute recording mocks for real
//! subprocesses.

use crate::command::Command;
use crate::display::VcpFeature;
use std::sync::mpsc;

/// Abstraction over the DDC/CI monitor-control tool.
///
/// The real implementation ([`Ddcutil`](crate::ddcutil::Ddcutil)) shells out
/// to `ddcutil`; test doubles return canned text and record calls.
///
/// `detect` returns the raw detection stdout rather than parsed records:
/// parsing is the deck's own logic
/// ([`parse_detect`](crate::display::parse_detect)) and is tested against
/// text fixtures, while the backend seam stays a thin process wrapper.
pub trait DdcBackend {
    /// The error type produced by this backend.
    type Error: std::error::Error + Send + 'static;

    /// Run display detection and return the tool's stdout verbatim.
    fn detect(&self) -> Result<String, Self::Error>;

    /// Read the current value of `feature` on the monitor at `bus`.
    fn get_vcp(&self, bus: u8, feature: VcpFeature) -> Result<u8, Self::Error>;

    /// Write `value` to `feature` on the monitor at `bus`.
    ///
    /// Only the exit status matters; the tool prints nothing on success.
    fn set_vcp(&self, bus: u8, feature: VcpFeature, value: u8) -> Result<(), Self::Error>;
}

/// A switchable radio (Wi-Fi, Bluetooth).
///
/// Implementations poll and flip power state by invoking the host's network
/// tools; there is no cached state at this layer.
pub trait Radio {
    /// The error type produced by this radio.
    type Error: std::error::Error + Send + 'static;

    /// Whether the radio is currently powered.
    fn is_powered(&self) -> Result<bool, Self::Error>;

    /// Power the radio on or off.
    fn set_powered(&self, on: bool) -> Result<(), Self::Error>;
}

//  Command Source

/// A source of [`Command`]s.
///
/// Implementations listen on some transport — the daemon's stdin, a Unix
/// socket, an in-memory channel in tests — and forward parsed commands into
/// the provided [`mpsc::Sender`]. The main loop does not know (or care)
/// which transport a command arrived on.
///
/// # Contract
///
/// * [`run`](CommandSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received command must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait CommandSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Command`] into `sink`.
    ///
    /// This method blocks the calling thread. To run multiple sources
    /// concurrently, spawn each one on its own thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error>;
}
