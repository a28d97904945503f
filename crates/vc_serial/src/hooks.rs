//! Post-read hooks.
//!
//! A hook must only observe a fully built object graph, so reading never
//! runs one directly. Serializers queue hooks on the [`HookContext`] of the
//! current read and the outermost read runs them, in queue order, once every
//! nested read has returned.

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// AfterDeserialize

/// Implemented by types that finish their own construction after a read.
///
/// Register the hook with
/// [`SerializerRegistry::register_hook`](crate::SerializerRegistry::register_hook).
/// It runs for the value a top-level read returns and for values read
/// behind a shared handle (`Arc<RwLock<T>>`), after the whole read has
/// finished. A hooked value nested by value in another one, such as an
/// element of a `Vec<T>`, has no stable place to run the hook on later;
/// reading it logs a warning and skips the hook.
///
/// # Example
///
/// ```
/// use vc_serial::{AfterDeserialize, HookError};
///
/// #[derive(Default)]
/// struct Mesh {
///     vertices: Vec<f32>,
///     vertex_count: usize,
/// }
///
/// impl AfterDeserialize for Mesh {
///     fn after_deserialization(&mut self) -> Result<(), HookError> {
///         if self.vertices.len() % 3 != 0 {
///             return Err(HookError::new("vertex data is not a multiple of 3"));
///         }
///         self.vertex_count = self.vertices.len() / 3;
///         Ok(())
///     }
/// }
/// ```
pub trait AfterDeserialize: 'static {
    fn after_deserialization(&mut self) -> Result<(), HookError>;
}

// -----------------------------------------------------------------------------
// HookError

/// The failure of a single hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookError {
    type_path: Option<&'static str>,
    message: Cow<'static, str>,
}

impl HookError {
    #[inline]
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            type_path: None,
            message: message.into(),
        }
    }

    /// The type whose hook failed, once the error went through a flush.
    #[inline]
    pub fn type_path(&self) -> Option<&'static str> {
        self.type_path
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    fn with_type_path(mut self, type_path: &'static str) -> Self {
        self.type_path.get_or_insert(type_path);
        self
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_path {
            Some(path) => write!(f, "`{path}`: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl core::error::Error for HookError {}

// -----------------------------------------------------------------------------
// HookFailure

/// Every hook error of one flush, in the order the hooks ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    errors: Vec<HookError>,
}

impl HookFailure {
    #[inline]
    pub fn errors(&self) -> &[HookError] {
        &self.errors
    }

    #[inline]
    pub fn into_errors(self) -> Vec<HookError> {
        self.errors
    }
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} post-read hook(s) failed", self.errors.len())?;
        for (index, error) in self.errors.iter().enumerate() {
            f.write_str(if index == 0 { ": " } else { "; " })?;
            fmt::Display::fmt(error, f)?;
        }
        Ok(())
    }
}

impl core::error::Error for HookFailure {}

// -----------------------------------------------------------------------------
// HookContext

/// When queued hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookMode {
    /// The outermost read using the context flushes it before returning.
    Immediate,
    /// The caller flushes, e.g. after reading a batch of documents.
    Deferred,
}

/// Lifecycle of a [`HookContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookState {
    Collecting,
    Flushing,
    Done,
}

struct DeferredHook {
    type_path: &'static str,
    run: Box<dyn FnOnce() -> Result<(), HookError>>,
}

/// Queue of post-read hooks owned by one top-level read.
///
/// The context moves from [`Collecting`] to [`Flushing`] to [`Done`].
/// Deferring a hook onto a finished context drops it with a warning, and
/// flushing a finished context does nothing.
///
/// # Example
///
/// ```
/// use vc_serial::{HookContext, HookError, HookState};
///
/// let mut hooks = HookContext::deferred();
/// hooks.defer("first", || Ok(()));
/// hooks.defer("second", || Err(HookError::new("broken")));
/// hooks.defer("third", || Ok(()));
///
/// let failure = hooks.flush().unwrap_err();
/// assert_eq!(failure.errors().len(), 1);
/// assert_eq!(failure.errors()[0].type_path(), Some("second"));
/// assert_eq!(hooks.state(), HookState::Done);
/// ```
///
/// [`Collecting`]: HookState::Collecting
/// [`Flushing`]: HookState::Flushing
/// [`Done`]: HookState::Done
pub struct HookContext {
    mode: HookMode,
    state: HookState,
    depth: usize,
    // Queue length when the current outermost read started.
    mark: usize,
    queue: Vec<DeferredHook>,
}

impl HookContext {
    /// A context flushed by the outermost read that uses it.
    #[inline]
    pub const fn new() -> Self {
        Self::with_mode(HookMode::Immediate)
    }

    /// A context the caller flushes with [`HookContext::flush`].
    #[inline]
    pub const fn deferred() -> Self {
        Self::with_mode(HookMode::Deferred)
    }

    #[inline]
    pub const fn with_mode(mode: HookMode) -> Self {
        Self {
            mode,
            state: HookState::Collecting,
            depth: 0,
            mark: 0,
            queue: Vec::new(),
        }
    }

    #[inline]
    pub const fn mode(&self) -> HookMode {
        self.mode
    }

    #[inline]
    pub const fn state(&self) -> HookState {
        self.state
    }

    /// Number of queued hooks.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queues `hook` to run at the next flush.
    ///
    /// `type_path` names the value the hook belongs to and is attached to
    /// the hook's error, if any.
    pub fn defer(
        &mut self,
        type_path: &'static str,
        hook: impl FnOnce() -> Result<(), HookError> + 'static,
    ) {
        if self.state != HookState::Collecting {
            log::warn!("hook for `{type_path}` deferred on a finished hook context, dropping it");
            return;
        }
        self.queue.push(DeferredHook {
            type_path,
            run: Box::new(hook),
        });
    }

    /// Runs every queued hook in order, even after a failure.
    ///
    /// Returns all failures together. Flushing twice is a no-op.
    pub fn flush(&mut self) -> Result<(), HookFailure> {
        if self.state == HookState::Done {
            return Ok(());
        }
        self.state = HookState::Flushing;
        log::trace!("flushing {} post-read hook(s)", self.queue.len());

        let errors: Vec<HookError> = self
            .queue
            .drain(..)
            .filter_map(|hook| {
                (hook.run)()
                    .err()
                    .map(|err| err.with_type_path(hook.type_path))
            })
            .collect();

        self.state = HookState::Done;
        if errors.is_empty() {
            Ok(())
        } else {
            Err(HookFailure { errors })
        }
    }

    /// Flushes the queue, then runs `last` and reports its error together
    /// with those of the queue.
    pub(crate) fn flush_then(
        &mut self,
        type_path: &'static str,
        last: impl FnOnce() -> Result<(), HookError>,
    ) -> Result<(), HookFailure> {
        let mut errors = match self.flush() {
            Ok(()) => Vec::new(),
            Err(failure) => failure.errors,
        };
        if let Err(err) = last() {
            errors.push(err.with_type_path(type_path));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(HookFailure { errors })
        }
    }

    #[inline]
    pub(crate) fn enter(&mut self) {
        if self.depth == 0 {
            self.mark = self.queue.len();
        }
        self.depth += 1;
    }

    /// Returns `true` once the outermost read has returned.
    #[inline]
    pub(crate) fn exit(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        self.depth == 0
    }

    /// Drops the hooks queued since the outermost read started.
    ///
    /// Hooks of earlier reads in a deferred batch stay queued.
    pub(crate) fn discard(&mut self) {
        let dropped = self.queue.len().saturating_sub(self.mark);
        if dropped != 0 {
            log::debug!("read failed, dropping {dropped} queued hook(s)");
        }
        self.queue.truncate(self.mark);
        if self.mode == HookMode::Immediate {
            self.state = HookState::Done;
        }
    }
}

/// Runs one hook outside of any queue.
pub(crate) fn run_hook(
    type_path: &'static str,
    hook: impl FnOnce() -> Result<(), HookError>,
) -> Result<(), HookFailure> {
    hook().map_err(|err| HookFailure {
        errors: alloc::vec![err.with_type_path(type_path)],
    })
}

impl Default for HookContext {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HookContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookContext")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("queued", &self.queue.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests
