//! Signal handling for graceful shutdown.
//!
//! `ShutdownFlag` is set by the Ctrl+C handler and polled by the poll loop
//! between cycles and once per second while waiting. A second Ctrl+C while
//! the loop is still winding down exits immediately.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::exit::codes;

/// Trait for checking shutdown status.
pub trait ShutdownCheck: Send + Sync {
    /// Returns true if shutdown has been requested.
    fn should_stop(&self) -> bool;
}

/// Flag that tracks whether shutdown has been requested.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create a new shutdown flag and register the Ctrl+C handler.
    ///
    /// If the handler cannot be registered the flag is still returned and
    /// can be triggered manually; the failure is logged.
    pub fn install() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = flag.clone();

        let result = ctrlc::set_handler(move || {
            if handler_flag.swap(true, Ordering::SeqCst) {
                std::process::exit(codes::SIGINT);
            }
        });
        if let Err(e) = result {
            log::warn!("cannot install Ctrl+C handler: {}", e);
        }

        Self { flag }
    }

    /// Create a shutdown flag without registering a handler.
    pub fn manual() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Manually trigger shutdown.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Shutdown checker that never signals shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverShutdown;

impl ShutdownCheck for NeverShutdown {
    fn should_stop(&self) -> bool {
        false
    }
}

/// Shutdown checker that always signals shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysShutdown;

impl ShutdownCheck for AlwaysShutdown {
    fn should_stop(&self) -> bool {
        true
    }
}

/// Shutdown checker that trips after `n` checks returned false.
///
/// Lets tests stop an endless poll loop at a precise point.
#[derive(Debug)]
pub struct ShutdownAfter {
    remaining: AtomicUsize,
}

impl ShutdownAfter {
    pub fn new(checks: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(checks),
        }
    }
}

impl ShutdownCheck for ShutdownAfter {
    fn should_stop(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_flag_initially_false() {
        let flag = ShutdownFlag::manual();
        assert!(!flag.should_stop());
    }

    #[test]
    fn test_shutdown_flag_trigger() {
        let flag = ShutdownFlag::manual();
        flag.trigger();
        assert!(flag.should_stop());
    }

    #[test]
    fn test_shutdown_flag_clone_shares_state() {
        let flag1 = ShutdownFlag::manual();
        let flag2 = flag1.clone();
        flag1.trigger();
        assert!(flag2.should_stop());
    }

    #[test]
    fn test_never_and_always() {
        assert!(!NeverShutdown.should_stop());
        assert!(AlwaysShutdown.should_stop());
    }

    #[test]
    fn test_shutdown_after() {
        let check = ShutdownAfter::new(2);
        assert!(!check.should_stop());
        assert!(!check.should_stop());
        assert!(check.should_stop());
        assert!(check.should_stop());
    }

    #[test]
    fn test_shutdown_after_zero() {
        assert!(ShutdownAfter::new(0).should_stop());
    }

    #[test]
    fn test_shutdown_check_trait_object() {
        let checker: Box<dyn ShutdownCheck> = Box::new(NeverShutdown);
        assert!(!checker.should_stop());
    }
}
