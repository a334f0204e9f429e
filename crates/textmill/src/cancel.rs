//! Cooperative cancellation token.
//!
//! Extraction is blocking and runs on a single worker; cancellation is a
//! polled flag, not preemption. The token is cloned into every page and
//! archive-entry loop, which checks it at each iteration boundary. Once
//! observed, the current file's remaining pages or entries are abandoned but
//! text accumulated so far is preserved.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag shared between the worker and its controller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// The only mutator. `true` requests a cooperative stop.
    pub fn set_cancelled(&self, cancelled: bool) {
        self.flag.store(cancelled, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_clear() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancelToken::new();
        let clone = token.clone();
        token.set_cancelled(true);
        assert!(clone.is_cancelled());
        clone.set_cancelled(false);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_visible_across_threads() {
        let token = CancelToken::new();
        let clone = token.clone();
        let handle = std::thread::spawn(move || clone.set_cancelled(true));
        handle.join().unwrap();
        assert!(token.is_cancelled());
    }
}
