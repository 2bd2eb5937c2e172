//! Disposal handles
//!
//! Effects that hold on to resources (scheduled frames, spawned elements)
//! hand back a [`Disposer`]. Calling it releases the resources; calling it
//! again must be harmless, so every action wrapped here is expected to be
//! idempotent. [`DisposeGuard`] ties a disposer to a scope.

use std::fmt;
use std::rc::Rc;

/// A cloneable release action
#[derive(Clone, Default)]
pub struct Disposer {
    action: Option<Rc<dyn Fn()>>,
}

impl Disposer {
    pub fn new(action: impl Fn() + 'static) -> Self {
        Self {
            action: Some(Rc::new(action)),
        }
    }

    /// A disposer that does nothing
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        self.action.is_none()
    }

    pub fn dispose(&self) {
        if let Some(action) = &self.action {
            action();
        }
    }

    /// Run this disposer when the returned guard is dropped
    pub fn guard(self) -> DisposeGuard {
        DisposeGuard {
            disposer: Some(self),
        }
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("noop", &self.is_noop())
            .finish()
    }
}

/// Disposes on drop unless [`DisposeGuard::release`]d first
#[derive(Debug)]
pub struct DisposeGuard {
    disposer: Option<Disposer>,
}

impl DisposeGuard {
    /// Dispose now instead of at drop
    pub fn dispose(mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer.dispose();
        }
    }

    /// Give the disposer back without running it
    pub fn release(mut self) -> Disposer {
        self.disposer.take().unwrap_or_default()
    }
}

impl Drop for DisposeGuard {
    fn drop(&mut self) {
        if let Some(disposer) = self.disposer.take() {
            disposer.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting() -> (Rc<Cell<u32>>, Disposer) {
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        (count, Disposer::new(move || counter.set(counter.get() + 1)))
    }

    #[test]
    fn test_noop_disposer() {
        let disposer = Disposer::noop();
        assert!(disposer.is_noop());
        disposer.dispose();
        disposer.dispose();
    }

    #[test]
    fn test_clones_share_action() {
        let (count, disposer) = counting();
        let clone = disposer.clone();
        disposer.dispose();
        clone.dispose();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_guard_disposes_on_drop() {
        let (count, disposer) = counting();
        {
            let _guard = disposer.guard();
            assert_eq!(count.get(), 0);
        }
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_guard_release_skips_dispose() {
        let (count, disposer) = counting();
        let released = disposer.guard().release();
        assert_eq!(count.get(), 0);
        released.dispose();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_guard_explicit_dispose_runs_once() {
        let (count, disposer) = counting();
        disposer.guard().dispose();
        assert_eq!(count.get(), 1);
    }
}
