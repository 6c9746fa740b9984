//! Signal-driven shutdown plumbing.
//!
//! A termination signal can arrive between the loop's flag check and its
//! blocking wait; the flag alone would leave the wait parked forever. A
//! self-pipe closes that gap: the signal both sets the flag and writes one
//! byte to a pipe the poll watches, so a signal at any instant either
//! flips the flag before the check or wakes the poll right after it.

use mio::unix::pipe::{self, Receiver, Sender};
use std::io::{self, Read, Write};
use std::os::raw::c_int;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiving side, owned by the event loop.
pub struct Shutdown {
    flag: Arc<AtomicBool>,
    receiver: Receiver,
}

/// Sending side: wired to a signal in production, driven directly by
/// tests.
pub struct Trigger {
    flag: Arc<AtomicBool>,
    sender: Sender,
}

/// Create a connected trigger/shutdown pair.
pub fn channel() -> io::Result<(Trigger, Shutdown)> {
    let flag = Arc::new(AtomicBool::new(false));
    let (sender, receiver) = pipe::new()?;
    Ok((
        Trigger {
            flag: Arc::clone(&flag),
            sender,
        },
        Shutdown { flag, receiver },
    ))
}

impl Trigger {
    /// Wire the trigger to a signal. Both registered actions are
    /// async-signal-safe: an atomic store and a write(2) on the pipe.
    pub fn install(self, signal: c_int) -> io::Result<()> {
        signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        signal_hook::low_level::pipe::register(signal, self.sender)?;
        Ok(())
    }

    /// Request shutdown without a signal.
    pub fn notify(&mut self) -> io::Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        self.sender.write_all(&[1])
    }
}

impl Shutdown {
    /// Whether shutdown has been requested.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Empty the wake pipe. The pipe is watched edge-triggered, so it must
    /// be fully drained on every wake for a later byte to raise a fresh
    /// edge.
    pub(crate) fn drain(&mut self) {
        let mut buf = [0u8; 16];
        while let Ok(n) = self.receiver.read(&mut buf) {
            if n == 0 {
                break;
            }
        }
    }

    pub(crate) fn receiver_mut(&mut self) -> &mut Receiver {
        &mut self.receiver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_sets_flag_and_wakes_pipe() {
        let (mut trigger, mut shutdown) = channel().unwrap();
        assert!(!shutdown.is_set());

        trigger.notify().unwrap();
        assert!(shutdown.is_set());

        let mut buf = [0u8; 4];
        let n = shutdown.receiver_mut().read(&mut buf).unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_drain_empties_pipe() {
        let (mut trigger, mut shutdown) = channel().unwrap();
        trigger.notify().unwrap();
        trigger.notify().unwrap();

        shutdown.drain();
        let err = shutdown.receiver_mut().read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }
}
