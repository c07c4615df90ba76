//! # Session Registry
//!
//! Counts the handles currently open on the service. Sessions carry no state
//! of their own and are never addressed individually; only their number is
//! tracked.
//!
//! The counter lives in a single atomic word. [`SessionRegistry::LOCKED`] is a
//! sentinel value: once the service fails to initialize the registry is
//! locked, after which it never changes again and refuses every open and
//! close.

use core::sync::atomic::{AtomicU32, Ordering};

/// Refusals reported by the [`SessionRegistry`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session registry is locked after a failed initialization")]
    Locked,
    #[error("session count exhausted")]
    Exhausted,
}

pub struct SessionRegistry {
    /// Open handle count, or [`Self::LOCKED`].
    count: AtomicU32,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Sentinel reported by [`query`](Self::query) once the registry is locked.
    pub const LOCKED: u32 = u32::MAX;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Records a newly opened session and returns the new count.
    ///
    /// # Errors
    /// [`SessionError::Locked`] once [`lock`](Self::lock) has been called;
    /// [`SessionError::Exhausted`] if one more session would collide with the
    /// sentinel. The count is left untouched in both cases.
    pub fn open(&self) -> Result<u32, SessionError> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| match c {
                Self::LOCKED => None,
                c if c == Self::LOCKED - 1 => None,
                c => Some(c + 1),
            })
            .map(|prev| prev + 1)
            .map_err(|c| {
                if c == Self::LOCKED {
                    SessionError::Locked
                } else {
                    SessionError::Exhausted
                }
            })
    }

    /// Records a closed session and returns the new count.
    ///
    /// A close without a matching open leaves the count at zero rather than
    /// wrapping it into the sentinel.
    ///
    /// # Errors
    /// [`SessionError::Locked`] once [`lock`](Self::lock) has been called.
    pub fn close(&self) -> Result<u32, SessionError> {
        match self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| match c {
                Self::LOCKED | 0 => None,
                c => Some(c - 1),
            }) {
            Ok(prev) => Ok(prev - 1),
            Err(Self::LOCKED) => Err(SessionError::Locked),
            Err(_) => {
                log::warn!("session close without a matching open; count stays at zero");
                Ok(0)
            }
        }
    }

    /// Current count, or [`Self::LOCKED`].
    #[must_use]
    pub fn query(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.query() == Self::LOCKED
    }

    /// Permanently refuses all further sessions.
    ///
    /// Called when the service failed to initialize.
    pub fn lock(&self) {
        let prev = self.count.swap(Self::LOCKED, Ordering::AcqRel);
        if prev != Self::LOCKED {
            log::warn!("session registry locked with {prev} session(s) recorded");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn balanced_open_close_restores_count() {
        let r = SessionRegistry::new();
        let before = r.query();
        for n in 1..=16 {
            assert_eq!(r.open(), Ok(n));
        }
        for n in (0..16).rev() {
            assert_eq!(r.close(), Ok(n));
        }
        assert_eq!(r.query(), before);
    }

    #[test]
    fn locked_registry_never_moves() {
        let r = SessionRegistry::new();
        r.open().unwrap();
        r.lock();
        assert!(r.is_locked());
        assert_eq!(r.open(), Err(SessionError::Locked));
        assert_eq!(r.close(), Err(SessionError::Locked));
        assert_eq!(r.query(), SessionRegistry::LOCKED);
        r.lock();
        assert_eq!(r.query(), SessionRegistry::LOCKED);
    }

    #[test]
    fn unmatched_close_is_clamped() {
        let r = SessionRegistry::new();
        assert_eq!(r.close(), Ok(0));
        assert_eq!(r.query(), 0);
        assert!(!r.is_locked());
    }

    #[test]
    fn open_never_reaches_the_sentinel() {
        let r = SessionRegistry {
            count: AtomicU32::new(SessionRegistry::LOCKED - 1),
        };
        assert_eq!(r.open(), Err(SessionError::Exhausted));
        assert_eq!(r.query(), SessionRegistry::LOCKED - 1);
    }

    #[test]
    fn concurrent_sessions_balance() {
        let threads = 8;
        let iters = 2_000;
        let r = Arc::new(SessionRegistry::new());

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let r = Arc::clone(&r);
                thread::spawn(move || {
                    for _ in 0..iters {
                        r.open().unwrap();
                        r.close().unwrap();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(r.query(), 0);
    }
}
