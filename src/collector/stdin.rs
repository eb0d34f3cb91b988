//! Live sample producer reading line-delimited JSON from stdin.
//!
//! Whatever bridges the device sensor to this process (a serial relay, a
//! websocket dump, `cat` over a recorded stream) writes one `RawSample`
//! object per line. Lines that are not valid JSON are skipped with a
//! warning; samples with a missing gravity vector pass through, since
//! rejecting those is the session's job.

use crate::collector::types::RawSample;
use crate::collector::CollectorError;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Reads samples from stdin on a background thread.
pub struct StdinCollector {
    sender: Option<Sender<RawSample>>,
    receiver: Receiver<RawSample>,
    running: Arc<AtomicBool>,
}

impl StdinCollector {
    pub fn new() -> Self {
        let (sender, receiver) = bounded(10_000);
        Self {
            sender: Some(sender),
            receiver,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start reading lines from stdin.
    ///
    /// The channel disconnects on EOF or after `stop()`.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        let sender = self.sender.take().ok_or(CollectorError::AlreadyRunning)?;
        let running = self.running.clone();
        running.store(true, Ordering::SeqCst);

        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }

                let line = match line {
                    Ok(line) => line,
                    Err(_) => break,
                };
                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<RawSample>(&line) {
                    Ok(sample) => {
                        if sender.send(sample).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        eprintln!("Warning: Skipping unparseable sample line: {e}");
                    }
                }
            }
        });

        Ok(())
    }

    /// Stop reading. The reader thread exits at the next line boundary.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the receiver for incoming samples.
    pub fn receiver(&self) -> &Receiver<RawSample> {
        &self.receiver
    }
}

impl Default for StdinCollector {
    fn default() -> Self {
        Self::new()
    }
}
