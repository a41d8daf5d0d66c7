// src/cancel.rs

//! Cancellation shared between the worker pool and its jobs
//!
//! A [`CancelToken`] is tripped when the user interrupts the run or when a
//! worker hits a pool-level error. Jobs check it before starting, before
//! each command, and while waiting on child processes.

use crate::error::{Error, Result};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Set from the SIGINT handler
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the interrupt flag instead of killing the process
///
/// Tokens created with [`CancelToken::with_interrupts`] observe the flag.
pub fn install_interrupt_handler() -> Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_interrupt),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe.
    unsafe { sigaction(Signal::SIGINT, &action) }
        .map_err(|e| Error::ConfigError(format!("Failed to install SIGINT handler: {}", e)))?;
    debug!("SIGINT handler installed");
    Ok(())
}

/// Cooperative cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    interrupts: bool,
}

impl CancelToken {
    /// A token that is only cancelled explicitly
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is also cancelled by SIGINT
    pub fn with_interrupts() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            interrupts: true,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || (self.interrupts && INTERRUPTED.load(Ordering::SeqCst))
    }

    /// Return `WorkerInterrupted` once cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::WorkerInterrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(worker.check().is_ok());

        token.cancel();
        assert!(worker.is_cancelled());
        assert!(matches!(worker.check(), Err(Error::WorkerInterrupted)));
    }

    #[test]
    fn test_plain_token_ignores_interrupt_flag() {
        let token = CancelToken::new();
        assert!(!token.interrupts);
        assert!(!token.is_cancelled());
    }
}
