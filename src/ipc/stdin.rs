//! Standard-input [`CommandSource`] implementation.
//!
//! The intended deployment has the panel applet spawn the daemon and hold
//! its stdin/stdout pipes: commands go down stdin, events come back on
//! stdout. EOF on stdin therefore means the applet is gone and the source
//! ends, which closes the daemon's main loop once the other sources finish.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::io::BufRead;
use std::sync::mpsc;

/// A [`CommandSource`] reading newline-delimited JSON commands from the
/// process's standard input.
#[derive(Debug, Default)]
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

/// Forward every parsable command line from `reader` into `sink`.
///
/// Malformed lines are logged and skipped; the stream keeps going. Returns
/// when the reader is exhausted or the sink has closed.
fn forward_lines(reader: impl BufRead, sink: &mpsc::Sender<Command>) -> std::io::Result<()> {
    for line in reader.lines() {
        let text = line?;
        if text.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(&text) {
            Ok(cmd) => {
                debug!("stdin command: {:?}", cmd);
                if sink.send(cmd).is_err() {
                    info!("sink closed, stdin source shutting down");
                    return Ok(());
                }
            }
            Err(e) => {
                error!("bad command: {} ({})", text, e);
            }
        }
    }
    Ok(())
}

impl CommandSource for StdinSource {
    type Error = std::io::Error;

    /// Read stdin until EOF. Blocks; run on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let stdin = std::io::stdin();
        let result = forward_lines(stdin.lock(), &sink);
        info!("stdin closed");
        result
    }
}
