//! Copy semantics shared by all copiers.
//!
//! Copying into an existing target either refills the target in place or
//! builds a fresh value that replaces it. Which one happens depends on what
//! the target type can do:
//!
//! | shape                       | example                     | policy            |
//! |-----------------------------|-----------------------------|-------------------|
//! | mutable list, set, map      | `Vec<T>`, `HashSet<T>`      | `Reuse`           |
//! | read-only list              | `Cow<'static, [T]>`         | `ReuseIfMutable`  |
//! | read-only collection        | `Box<[T]>`                  | `ReuseIfMutable`  |
//! | immutable list              | `Arc<[T]>`                  | `Fresh`           |
//! | shared handle               | `Arc<RwLock<T>>`            | `Reuse`           |
//!
//! `ReuseIfMutable` refills the target only when its storage can grow at
//! runtime, e.g. a `Cow::Owned`. A boxed slice never can, so it always gets
//! a fresh value; it keeps the policy because the decision is made per
//! instance, not per type.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

// -----------------------------------------------------------------------------
// CopyPolicy

/// How a copier treats an existing target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyPolicy {
    /// The target is always refilled in place.
    Reuse,
    /// The target is refilled in place if its storage is growable.
    ReuseIfMutable,
    /// The target is always replaced.
    Fresh,
}

impl CopyPolicy {
    /// Returns `true` if an existing target may be refilled.
    #[inline]
    pub const fn may_reuse(self) -> bool {
        !matches!(self, CopyPolicy::Fresh)
    }
}

// -----------------------------------------------------------------------------
// CopyOutcome

/// Result of copying into an existing, type-erased target.
pub enum CopyOutcome {
    /// The target now holds the copy.
    Reused,
    /// The target was left alone; the caller must replace it with this value.
    Fresh(Box<dyn Any>),
}

impl CopyOutcome {
    #[inline]
    pub const fn is_reused(&self) -> bool {
        matches!(self, CopyOutcome::Reused)
    }
}

impl fmt::Debug for CopyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyOutcome::Reused => f.write_str("Reused"),
            CopyOutcome::Fresh(_) => f.write_str("Fresh(..)"),
        }
    }
}
