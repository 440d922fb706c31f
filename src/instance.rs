//! Process-wide holder for the audited security service.
//!
//! The audited service is built once, on first use, and shared afterwards.
//! Construction is serialized by a mutex so concurrent first callers wire
//! the backing service exactly once. The current instance sits behind an
//! `ArcSwapOption`, so reads never touch that mutex, even while a
//! construction is in progress.
//!
//! The holder is an ordinary value. Servers usually keep one in a `static`
//! and pass the resulting `Arc` into request handlers; tests create their
//! own holder so nothing leaks between them.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;

/// Lazily constructed, shared service instance.
///
/// # Examples
///
/// ```
/// use audited_security::SecurityInstance;
/// use std::sync::Arc;
///
/// static INSTANCE: SecurityInstance<String> = SecurityInstance::new();
///
/// let first = INSTANCE
///     .get_or_try_init(|| Ok::<_, std::convert::Infallible>("service".to_string()))
///     .unwrap();
/// let second = INSTANCE
///     .get_or_try_init(|| Ok::<_, std::convert::Infallible>("other".to_string()))
///     .unwrap();
///
/// assert!(Arc::ptr_eq(&first, &second));
/// assert_eq!(*second, "service");
/// ```
pub struct SecurityInstance<T> {
    current: ArcSwapOption<T>,
    construction: Mutex<()>,
}

impl<T> SecurityInstance<T> {
    /// Creates an empty holder.
    pub const fn new() -> Self {
        Self {
            current: ArcSwapOption::const_empty(),
            construction: parking_lot::const_mutex(()),
        }
    }

    /// Returns the instance, constructing it with `init` if none exists.
    ///
    /// `init` runs while the construction lock is held, so at most one
    /// caller runs it at a time and it runs at most once per successful
    /// construction. If `init` fails the holder stays empty and the error
    /// is returned; a later call may try again.
    ///
    /// # Errors
    ///
    /// Returns whatever `init` returns.
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        if let Some(existing) = self.current.load_full() {
            return Ok(existing);
        }

        let _guard = self.construction.lock();
        // Another caller may have finished while we waited.
        if let Some(existing) = self.current.load_full() {
            return Ok(existing);
        }

        let instance = Arc::new(init()?);
        self.current.store(Some(Arc::clone(&instance)));
        tracing::debug!("security instance constructed");
        Ok(instance)
    }

    /// Returns the instance if it has been constructed.
    ///
    /// Lock-free; never waits on a construction in progress.
    pub fn get(&self) -> Option<Arc<T>> {
        self.current.load_full()
    }

    /// Returns `true` once an instance has been constructed.
    pub fn is_initialized(&self) -> bool {
        self.current.load().is_some()
    }

    /// Drops the held instance and returns it.
    ///
    /// Callers that already hold an `Arc` keep a working service; the next
    /// [`get_or_try_init`](Self::get_or_try_init) builds a new one.
    pub fn reset(&self) -> Option<Arc<T>> {
        let _guard = self.construction.lock();
        let previous = self.current.swap(None);
        if previous.is_some() {
            tracing::debug!("security instance reset");
        }
        previous
    }
}

impl<T> Default for SecurityInstance<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for SecurityInstance<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityInstance")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
