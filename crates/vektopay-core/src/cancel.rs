//! # Cooperative Cancellation
//!
//! Mount operations span awaits (script load, widget creation) while the
//! host component may unmount at any point. A [`CancelToken`] lets the
//! host flag the operation as stale; the operation re-checks the token
//! after each await and drops its result silently once cancelled.

use std::cell::Cell;
use std::rc::Rc;

/// Clonable cancellation flag shared between a mount operation and its host.
///
/// Widget mounting happens on the main browser thread, so the flag is a
/// plain `Cell` behind an `Rc`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    /// Create a fresh, un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the operation as cancelled
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    /// Whether the operation has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_starts_live() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_cancel_visible_through_clones() {
        let token = CancelToken::new();
        let observer = token.clone();

        token.cancel();

        assert!(observer.is_cancelled());
    }
}
