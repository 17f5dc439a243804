//! Debug-only reentrancy check.
//!
//! `ChainedHashMap` calls back into caller code (the hash and compare
//! functions) while a bucket walk is in progress. A callback that reaches
//! back into the same map would observe a half-updated chain, so in debug
//! builds each guarded operation records its name and a nested entry
//! panics with both names. In release builds this compiles to a no-op.

use core::cell::Cell;
use core::marker::PhantomData;

/// Per-map tracker. Guard an operation with
/// `let _g = self.reentrancy.enter("put");`.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    #[cfg(debug_assertions)]
    active: Cell<Option<&'static str>>,
    // Send but never Sync, in every build profile.
    _unsync: PhantomData<Cell<()>>,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            active: Cell::new(None),
            _unsync: PhantomData,
        }
    }

    /// Mark `op` as running until the returned guard drops. In debug builds,
    /// panics if another guarded operation is already running.
    #[inline]
    pub(crate) fn enter(&self, op: &'static str) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            if let Some(outer) = self.active.get() {
                panic!("reentrant call to `{op}` while `{outer}` is running on the same map");
            }
            self.active.set(Some(op));
            return ReentrancyGuard { owner: self };
        }

        #[cfg(not(debug_assertions))]
        {
            let _ = op;
            return ReentrancyGuard { _owner: PhantomData };
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears the running operation on drop, including during unwinding.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _owner: PhantomData<&'a ()>,
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            debug_assert!(self.owner.active.get().is_some());
            self.owner.active.set(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DebugReentrancy;

    #[test]
    fn sequential_operations_are_fine() {
        let r = DebugReentrancy::new();
        {
            let _g = r.enter("get");
        }
        let _g = r.enter("put");
    }

    #[cfg(debug_assertions)]
    #[test]
    fn nested_entry_panics_with_both_names() {
        let r = DebugReentrancy::new();
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _outer = r.enter("put");
            let _inner = r.enter("get");
        }));
        let err = res.expect_err("nested entry must panic in debug builds");
        let msg = err
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(msg.contains("`get`") && msg.contains("`put`"), "{msg}");

        // The outer guard was dropped during unwinding.
        let _g = r.enter("remove");
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn nested_entry_is_a_noop_in_release() {
        let r = DebugReentrancy::new();
        let _g1 = r.enter("put");
        let _g2 = r.enter("get");
    }
}
