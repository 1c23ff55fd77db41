//! [`Radio`](crate::traits::Radio) implementations backed by the host's
//! network command-line tools.
//!
//! Wi-Fi goes through NetworkManager's `nmcli`, Bluetooth through BlueZ's
//! `bluetoothctl`. Both are stateless wrappers: every query and toggle is
//! one child process, and the deck layer decides when to poll.

pub mod bluetoothctl;
pub mod nmcli;

pub use bluetoothctl::BluetoothctlRadio;
pub use nmcli::NmcliWifi;
