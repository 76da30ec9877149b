// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for a handful of the universal invariants in `spec.md` §8, run over randomly
//! generated single-channel catalogs built as a plain `replaces` chain (head = highest version,
//! tail = lowest). Compiled only when the `proptest1` feature is enabled; this whole file is a
//! no-op otherwise, the same gate the teacher uses for its own `proptest1` feature.

#![cfg(feature = "proptest1")]

use catalog_filter::catalog::{schema, Bundle, Catalog, Channel, ChannelEntry, Package, Property};
use catalog_filter::config::{ChannelFilter, FilterConfig};
use catalog_filter::Filter;
use proptest::prelude::*;
use serde_json::json;

/// A chain of `len` bundles: `b1` (newest, version `len`) replaces `b2` (version `len - 1`)
/// replaces ... replaces `b{len}` (oldest, version 1).
fn chain_catalog(len: usize) -> Catalog {
    let mut entries = Vec::with_capacity(len);
    let mut bundles = Vec::with_capacity(len);
    for i in 1..=len {
        let name = format!("b{i}");
        let replaces = (i < len).then(|| format!("b{}", i + 1));
        entries.push(ChannelEntry {
            name: name.clone(),
            replaces,
            skips: Vec::new(),
        });
        let version = len - i + 1;
        bundles.push(Bundle {
            package: "pkg".to_string(),
            name,
            properties: vec![Property {
                property_type: schema::PACKAGE.to_string(),
                value: json!({ "packageName": "pkg", "version": format!("{version}.0.0") }),
            }],
        });
    }

    Catalog {
        packages: vec![Package {
            name: "pkg".to_string(),
            default_channel: "ch".to_string(),
            icon: None,
            description: None,
        }],
        channels: vec![Channel {
            package: "pkg".to_string(),
            name: "ch".to_string(),
            entries,
        }],
        bundles,
        deprecations: Vec::new(),
        others: Vec::new(),
    }
}

fn chain_len() -> impl Strategy<Value = usize> {
    1usize..12
}

/// Picks `(len, lo, hi)` with `1 <= lo <= hi <= len`, used to build both the chain and the range
/// `>=lo.0.0 <hi+1.0.0` that is meant to cover it.
fn chain_and_range_bounds() -> impl Strategy<Value = (usize, usize, usize)> {
    chain_len().prop_flat_map(|len| {
        (1..=len).prop_flat_map(move |lo| (Just(len), Just(lo), lo..=len))
    })
}

proptest! {
    /// Invariant 5 (version coverage) + invariant 1 (package containment): every bundle whose
    /// version falls in the configured range survives, and every surviving package is the one
    /// named in the config.
    #[test]
    fn version_range_selection_covers_every_in_range_bundle(
        (len, lo, hi) in chain_and_range_bounds(),
    ) {
        let catalog = chain_catalog(len);
        let range = format!(">={lo}.0.0 <{}.0.0", hi + 1);
        let config = FilterConfig::keep_packages(["pkg"]).with_range("ch", &range);

        let filter = Filter::new(config);
        let result = filter.filter_catalog(Some(catalog));

        if let Ok(Some(out)) = result {
            prop_assert_eq!(out.packages.len(), 1);
            prop_assert_eq!(&out.packages[0].name, "pkg");

            let kept: std::collections::HashSet<&str> =
                out.bundles.iter().map(|b| b.name.as_str()).collect();
            for i in 1..=len {
                let version = len - i + 1;
                if version >= lo && version <= hi {
                    prop_assert!(kept.contains(format!("b{i}").as_str()));
                }
            }
        }
        // When the range selects nothing at all (e.g. lo > the highest version present via a
        // gap), `filter_catalog` reports `EmptyChannelAfterFilter` -- also an acceptable outcome,
        // not a property violation.
    }

    /// Invariant 8 (idempotence): filtering a catalog and filtering the result again with the
    /// same config yields the same catalog.
    #[test]
    fn filtering_is_idempotent((len, lo, hi) in chain_and_range_bounds()) {
        let catalog = chain_catalog(len);
        let range = format!(">={lo}.0.0 <{}.0.0", hi + 1);
        let config = FilterConfig::keep_packages(["pkg"]).with_range("ch", &range);

        let filter = Filter::new(config);
        if let Ok(Some(once)) = filter.filter_catalog(Some(catalog)) {
            let twice = filter
                .filter_catalog(Some(once.clone()))
                .expect("already-filtered catalog re-filters cleanly")
                .expect("catalog present");
            prop_assert_eq!(once, twice);
        }
    }

    /// Invariant 9: `keep_meta` agrees with whether `filter_catalog` would retain that package.
    #[test]
    fn keep_meta_matches_package_retention(
        configured in prop::collection::hash_set("[a-c]", 1..3),
        candidate in "[a-d]",
    ) {
        let config = FilterConfig::keep_packages(configured.iter().cloned());
        let filter = Filter::new(config.clone());
        let meta = catalog_filter::catalog::Meta {
            schema: schema::BUNDLE.to_string(),
            package: Some(candidate.clone()),
            name: Some("b1".to_string()),
            raw: json!({}),
        };
        prop_assert_eq!(filter.keep_meta(&meta), config.retains_package(&candidate));
    }
}

trait WithRange {
    fn with_range(self, channel: &str, range: &str) -> Self;
}

impl WithRange for FilterConfig {
    fn with_range(mut self, channel: &str, range: &str) -> Self {
        self.packages[0].channels = Some(vec![ChannelFilter {
            name: channel.to_string(),
            version_range: Some(range.to_string()),
        }]);
        self
    }
}
