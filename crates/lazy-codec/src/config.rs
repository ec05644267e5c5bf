// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Lazy decoding configuration.
//!
//! A [`LazyConfig`] is owned by the [`LazyLoadingDecorator`](crate::LazyLoadingDecorator)
//! and copied into every lazy codec it builds, so all deferred values produced
//! for one decode tree share the same failure handling.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// What a deferred value does after its triggering decode failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// Remember the failure and return it (as `Poisoned`) on every later
    /// access without touching the buffer again.
    #[default]
    Poison,
    /// Stay unresolved; the next access runs the decode again.
    Retry,
}

/// Configuration shared by lazy codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LazyConfig {
    /// Failure handling for deferred values.
    pub failure_policy: FailurePolicy,

    /// Put the cursor back where the triggering caller left it even when the
    /// deferred decode fails.
    pub restore_cursor_on_failure: bool,
}

impl LazyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure policy.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set cursor restoration on failure.
    pub fn restore_cursor_on_failure(mut self, restore: bool) -> Self {
        self.restore_cursor_on_failure = restore;
        self
    }
}

impl Default for LazyConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::Poison,
            restore_cursor_on_failure: true,
        }
    }
}
