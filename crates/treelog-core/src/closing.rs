//! Scoped resources that close on scope exit
//!
//! A [`Closing`] value owns something that must be released exactly once.
//! Wrapping it in [`Scoped`] (via [`Closing::enter`]) makes the release part
//! of the scope: it runs on normal exit, on early return and while unwinding.
//!
//! [`ClosingIter`] adapts an iterator whose `Drop` performs cleanup (for
//! instance popping a log context). It clears the wrapped iterator when it is
//! exhausted, so a later `close` reports that nothing was open. If it is
//! dropped while still open outside of a [`Scoped`] it is closed anyway, and
//! a leak warning is reported through [`crate::diagnostics`].

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::diag_warn;

static LEAK_WARNINGS: AtomicUsize = AtomicUsize::new(0);

/// Number of leak warnings raised by this process so far
pub fn leak_warnings() -> usize {
    LEAK_WARNINGS.load(Ordering::SeqCst)
}

fn warn_unclosed(what: &str) {
    LEAK_WARNINGS.fetch_add(1, Ordering::SeqCst);
    diag_warn!("unclosed object {}", what);
}

/// A resource with an idempotent release step
pub trait Closing {
    /// Release the resource
    ///
    /// Returns `true` if the resource was open at the time of the call.
    /// Calling it again is a no-op that returns `false`.
    fn close(&mut self) -> bool;

    /// Enter a scope that closes this resource when it ends
    fn enter(self) -> Scoped<Self>
    where
        Self: Sized,
    {
        Scoped { inner: self }
    }
}

/// Scope guard around a [`Closing`] resource
///
/// Dereferences to the resource and iterates when the resource does.
pub struct Scoped<C: Closing> {
    inner: C,
}

impl<C: Closing> Deref for Scoped<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: Closing> DerefMut for Scoped<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.inner
    }
}

impl<C: Closing> Drop for Scoped<C> {
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl<C: Closing + Iterator> Iterator for Scoped<C> {
    type Item = C::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<C: Closing + std::fmt::Debug> std::fmt::Debug for Scoped<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Scoped").field(&self.inner).finish()
    }
}

/// Iterator that tracks whether it was exhausted or closed
///
/// Closing drops the wrapped iterator, which is where that iterator runs its
/// own cleanup.
pub struct ClosingIter<I> {
    inner: Option<I>,
}

impl<I: Iterator> ClosingIter<I> {
    /// Wrap an unstarted iterator
    pub fn new(iter: I) -> Self {
        Self { inner: Some(iter) }
    }

    /// Whether the wrapped iterator is still live
    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }
}

impl<I: Iterator> Iterator for ClosingIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        let item = self.inner.as_mut()?.next();
        if item.is_none() {
            self.inner = None;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            Some(iter) => iter.size_hint(),
            None => (0, Some(0)),
        }
    }
}

impl<I> Closing for ClosingIter<I> {
    fn close(&mut self) -> bool {
        self.inner.take().is_some()
    }
}

impl<I> Drop for ClosingIter<I> {
    fn drop(&mut self) {
        if self.close() {
            warn_unclosed(std::any::type_name::<Self>());
        }
    }
}

impl<I> std::fmt::Debug for ClosingIter<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosingIter")
            .field("open", &self.inner.is_some())
            .finish()
    }
}
