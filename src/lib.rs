// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative filtering of file-based operator catalogs (FBC).
//!
//! An FBC catalog is a stream of typed objects -- packages, channels, bundles, deprecations, and
//! opaque "other" meta objects -- that together describe which operator bundles exist, how they
//! are grouped into update channels, and how bundles replace or skip one another inside those
//! channels. Given a user-supplied [`config::FilterConfig`] (a set of packages, optionally
//! narrowed to specific channels, optionally further narrowed to a semver range), [`Filter`]
//! produces a new, internally consistent catalog containing only the retained packages, channels,
//! and bundles, with the surviving deprecation references pruned to match.
//!
//! This crate is the filter engine only: it consumes a fully materialized [`catalog::Catalog`]
//! value (or, via [`Filter::keep_meta`], pre-screens individual meta objects in a stream) and
//! returns a filtered one. Reading or writing catalogs from images, directories or a database,
//! and any CLI surface, are the caller's concern.
//!
//! # Optional features
//!
//! * `proptest1`: property-based tests (used internally; exposes nothing to downstream crates).
//!
//! # Examples
//!
//! ```
//! use catalog_filter::config::FilterConfig;
//! use catalog_filter::Filter;
//!
//! let config = FilterConfig::keep_packages(["etcd-operator"]);
//! let filter = Filter::new(config);
//! assert!(filter.config().retains_package("etcd-operator"));
//! assert!(!filter.config().retains_package("prometheus-operator"));
//! ```

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod logger;

mod filter;
mod graph;
mod reconcile;

pub use error::{Error, Errors, Warning};
pub use filter::Filter;
pub use logger::{Logger, NullLogger, TracingLogger};

// Public re-export for the upstream crate used throughout the catalog/config APIs. The
// `no_inline` ensures this shows up as a re-export in documentation rather than a fresh type.
#[doc(no_inline)]
pub use semver::Version;
