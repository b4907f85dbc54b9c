//! Accept/cancel gestures read from stdin.

use std::io::{BufRead, BufReader};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// What the user asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Capture,
    Cancel,
}

/// Maps one input line to a gesture. Unknown input is ignored.
pub fn parse_gesture(line: &str) -> Option<Gesture> {
    // A bare space or ESC is significant, so only strip the line ending
    let raw = line.trim_end_matches(['\r', '\n']);
    if raw == " " || raw.is_empty() {
        return Some(Gesture::Capture);
    }
    if raw.starts_with('\x1b') {
        return Some(Gesture::Cancel);
    }

    match raw.trim().to_ascii_lowercase().as_str() {
        "c" | "capture" => Some(Gesture::Capture),
        "q" | "quit" | "esc" => Some(Gesture::Cancel),
        _ => None,
    }
}

/// Something that can be asked for the next gesture.
pub trait GestureSource {
    /// Blocks until a gesture arrives or `timeout` elapses. A timeout and the
    /// end of input both count as cancel.
    fn wait(&mut self, timeout: Duration) -> Gesture;
}

/// Gestures typed on stdin, one per line. A reader thread feeds a channel so
/// the wait can time out.
pub struct StdinGestures {
    lines: Receiver<String>,
}

impl StdinGestures {
    pub fn spawn() -> Self {
        Self::from_reader(BufReader::new(std::io::stdin()))
    }

    fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in reader.lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }
}

impl GestureSource for StdinGestures {
    fn wait(&mut self, timeout: Duration) -> Gesture {
        loop {
            match self.lines.recv_timeout(timeout) {
                Ok(line) => match parse_gesture(&line) {
                    Some(gesture) => return gesture,
                    None => log::info!("Ignoring input {:?}; press Enter to capture, q to quit", line),
                },
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("No input for {}s, stopping", timeout.as_secs());
                    return Gesture::Cancel;
                }
                Err(RecvTimeoutError::Disconnected) => return Gesture::Cancel,
            }
        }
    }
}
