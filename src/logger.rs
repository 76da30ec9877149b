// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The selector's warning stream (`spec.md` §4.3) is the only observable side effect of this
//! crate. It's modeled as a capability parameter passed explicitly at
//! [`Filter`](crate::Filter) construction, not a process-global, so that embedding tools can
//! route warnings wherever they like -- or nowhere at all.

use std::fmt;

use crate::error::Warning;

/// Receives warnings emitted during catalog filtering.
///
/// Implementations must be cheap to call; `filter_catalog` may invoke `warn` once per forced
/// spine inclusion, which in the worst case is once per channel entry.
pub trait Logger: fmt::Debug + Send + Sync {
    /// Called for each [`Warning`] raised while filtering.
    fn warn(&self, warning: &Warning);
}

/// The default [`Logger`]: discards every warning.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warn(&self, _warning: &Warning) {}
}

/// A [`Logger`] that forwards warnings to the `tracing` crate at `WARN` level.
///
/// Use this when the embedding application already has a `tracing` subscriber installed and
/// wants filter warnings to show up alongside its other diagnostics.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn warn(&self, warning: &Warning) {
        tracing::warn!(target: "catalog_filter", "{}", warning);
    }
}
