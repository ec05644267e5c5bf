// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deferred value handle.
//!
//! A [`DeferredValue`] is created by [`LazyCodec::decode`](super::LazyCodec) in
//! place of the real value. It remembers where the value starts in the buffer
//! and runs the wrapped codec on first access:
//!
//! ```text
//!   Unresolved --first access, decode ok--> Resolved (terminal)
//!       |
//!       +--------first access, decode err--> Poisoned  (FailurePolicy::Poison)
//!       +--------first access, decode err--> Unresolved (FailurePolicy::Retry)
//! ```
//!
//! The triggering access saves the caller's cursor, seeks to the saved
//! position, decodes, and seeks back, so the buffer is left exactly where the
//! caller found it.
//!
//! # Concurrency
//!
//! First use is serialized per handle by a mutex around the state transition,
//! so concurrent accesses to the same handle decode at most once and all see
//! the same value. The buffer itself is not protected: resolving a handle
//! while another traversal (or another handle on another thread) reads the
//! same buffer interleaves cursor moves. Keep one traversal per buffer in
//! flight at a time.
//!
//! The lock is reentrant: a wrapped codec that reaches back into the handle it
//! is resolving (a self-referential record, say) gets `InvalidData` instead
//! of deadlocking the thread.

use crate::buffer::SharedBitBuffer;
use crate::codec::{Builder, Codec, Resolver};
use crate::config::{FailurePolicy, LazyConfig};
use crate::error::{DecodingError, Result};
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Everything needed to run the real decode later.
pub(crate) struct Pending<T> {
    pub(crate) codec: Arc<dyn Codec<T>>,
    pub(crate) buffer: SharedBitBuffer,
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) builder: Arc<dyn Builder>,
}

enum State<T> {
    Unresolved(Pending<T>),
    Resolved,
    Poisoned(DecodingError),
}

struct Inner<T> {
    // Published before `state` leaves Unresolved; never overwritten.
    value: OnceLock<T>,
    state: ReentrantMutex<RefCell<State<T>>>,
    position: u64,
    size: u64,
    config: LazyConfig,
}

/// Stand-in for a value whose decode runs on first access.
///
/// Cloning is cheap and every clone shares the same cache.
pub struct DeferredValue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for DeferredValue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> DeferredValue<T> {
    pub(crate) fn new(pending: Pending<T>, position: u64, size: u64, config: LazyConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: OnceLock::new(),
                state: ReentrantMutex::new(RefCell::new(State::Unresolved(pending))),
                position,
                size,
                config,
            }),
        }
    }

    /// Resolve (on first call) and borrow the decoded value.
    pub fn get(&self) -> Result<&T> {
        if let Some(value) = self.inner.value.get() {
            return Ok(value);
        }

        let guard = self.inner.state.lock();
        // Already borrowed on this thread: the wrapped decode reached its own handle
        let mut state = guard.try_borrow_mut().map_err(|_| self.reentered())?;
        let outcome = match &*state {
            // Another caller resolved it while we waited on the lock
            State::Resolved => {
                debug_assert!(self.inner.value.get().is_some());
                return self.inner.value.get().ok_or_else(|| self.released());
            }
            State::Poisoned(cause) => return Err(self.poisoned(cause)),
            State::Unresolved(pending) => self.resolve(pending),
        };

        match outcome {
            Ok(value) => {
                let value = self.inner.value.get_or_init(|| value);
                // Drops the codec, buffer, resolver and builder references
                *state = State::Resolved;
                Ok(value)
            }
            Err(err) => {
                match self.inner.config.failure_policy {
                    FailurePolicy::Poison => {
                        log::debug!(
                            "[lazy] poisoning deferred value at bit {}: {}",
                            self.inner.position,
                            err
                        );
                        *state = State::Poisoned(err.clone());
                    }
                    FailurePolicy::Retry => {
                        log::debug!(
                            "[lazy] deferred value at bit {} failed, will retry: {}",
                            self.inner.position,
                            err
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Invoke a capability on the decoded value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        self.get().map(f)
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.value.get().is_some()
    }

    pub fn is_poisoned(&self) -> bool {
        let guard = self.inner.state.lock();
        let poisoned = matches!(guard.try_borrow().as_deref(), Ok(State::Poisoned(_)));
        poisoned
    }

    /// Bit position the value starts at.
    pub fn position(&self) -> u64 {
        self.inner.position
    }

    /// Encoded size in bits, as computed when the value was deferred.
    pub fn size(&self) -> u64 {
        self.inner.size
    }

    /// Take the decoded value out of a resolved handle with no other clones.
    pub fn try_into_inner(self) -> std::result::Result<T, Self> {
        let inner = match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner,
            Err(inner) => return Err(Self { inner }),
        };
        let Inner {
            value,
            state,
            position,
            size,
            config,
        } = inner;
        match value.into_inner() {
            Some(value) => Ok(value),
            None => Err(Self {
                inner: Arc::new(Inner {
                    value: OnceLock::new(),
                    state,
                    position,
                    size,
                    config,
                }),
            }),
        }
    }

    fn resolve(&self, pending: &Pending<T>) -> Result<T> {
        let caller = pending.buffer.bit_pos();
        log::debug!(
            "[lazy] resolving {} bits at bit {} (caller at bit {})",
            self.inner.size,
            self.inner.position,
            caller
        );

        pending.buffer.set_bit_pos(self.inner.position);
        let result = pending
            .codec
            .decode(&pending.buffer, &pending.resolver, &pending.builder);

        if result.is_ok() || self.inner.config.restore_cursor_on_failure {
            pending.buffer.set_bit_pos(caller);
        }
        result
    }

    fn poisoned(&self, cause: &DecodingError) -> DecodingError {
        DecodingError::Poisoned {
            position: self.inner.position,
            cause: Box::new(cause.clone()),
        }
    }

    fn reentered(&self) -> DecodingError {
        DecodingError::InvalidData {
            position: self.inner.position,
            reason: "deferred value accessed from its own decode".into(),
        }
    }

    // Unreachable: the value is published before the state becomes Resolved.
    fn released(&self) -> DecodingError {
        DecodingError::InvalidData {
            position: self.inner.position,
            reason: "deferred value released without a result".into(),
        }
    }

    fn state_name(&self) -> &'static str {
        match self.inner.state.try_lock() {
            Some(guard) => {
                let name = match guard.try_borrow().as_deref() {
                    Ok(State::Unresolved(_)) => "unresolved",
                    Ok(State::Resolved) => "resolved",
                    Ok(State::Poisoned(_)) => "poisoned",
                    Err(_) => "resolving",
                };
                name
            }
            None => "resolving",
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DeferredValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DeferredValue");
        s.field("position", &self.inner.position)
            .field("size", &self.inner.size);
        match self.inner.value.get() {
            Some(value) => s.field("value", value),
            None => s.field("state", &self.state_name()),
        };
        s.finish()
    }
}
