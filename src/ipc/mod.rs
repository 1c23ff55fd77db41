//! Command transports for the daemon.
//!
//! Both sources speak the same framing: one JSON-encoded
//! [`Command`](crate::command::Command) per line. [`StdinSource`] serves a
//! panel applet that spawns the daemon as a child and pipes into it;
//! [`UnixSocketListener`] serves external clients (scripts, a second panel
//! instance) at a well-known socket path.

pub mod listener;
pub mod stdin;

pub use listener::UnixSocketListener;
pub use stdin::StdinSource;
