// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The catalog filter driver (`spec.md` §4.5): composes the configuration loader, channel graph
//! builder, version-range selector and default-channel reconciler into a whole-catalog operation,
//! plus the streaming [`Filter::keep_meta`] predicate.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use semver::{Version, VersionReq};

use crate::catalog::{schema, Bundle, Catalog, ChannelEntry, Meta, PackageProperty};
use crate::config::FilterConfig;
use crate::error::{Error, Errors};
use crate::graph::{select_entries, ChannelGraph};
use crate::logger::{Logger, NullLogger};
use crate::reconcile::reconcile_default_channel;

/// Filters file-based catalogs according to an immutable [`FilterConfig`].
///
/// A `Filter` carries no mutable state: construct one per configuration and reuse it across
/// catalogs. `Send + Sync` since its only fields are an immutable config and a logger capability.
#[derive(Debug)]
pub struct Filter {
    config: FilterConfig,
    logger: Box<dyn Logger>,
}

impl Filter {
    /// Builds a filter that discards every warning.
    pub fn new(config: FilterConfig) -> Self {
        Self::with_logger(config, NullLogger)
    }

    /// Builds a filter that reports warnings through `logger`.
    pub fn with_logger(config: FilterConfig, logger: impl Logger + 'static) -> Self {
        Filter {
            config,
            logger: Box::new(logger),
        }
    }

    /// The configuration this filter was built with.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filters a whole catalog value (`spec.md` §4.5). `None` in, `None` out.
    ///
    /// On success, returns the filtered catalog. On failure, returns every error encountered
    /// across every package, aggregated; no partial result is produced.
    pub fn filter_catalog(&self, catalog: Option<Catalog>) -> Result<Option<Catalog>, Errors> {
        match catalog {
            None => Ok(None),
            Some(catalog) => self.filter_catalog_present(catalog).map(Some),
        }
    }

    fn filter_catalog_present(&self, mut catalog: Catalog) -> Result<Catalog, Errors> {
        let mut errors: Vec<Error> = Vec::new();

        // Steps 2-6: prune top-level collections by package membership.
        catalog
            .packages
            .retain(|p| self.config.retains_package(&p.name));
        catalog.channels.retain(|c| {
            self.config
                .package(&c.package)
                .map(|pf| pf.retains_channel(&c.name))
                .unwrap_or(false)
        });
        catalog
            .bundles
            .retain(|b| self.config.retains_package(&b.package));
        catalog
            .deprecations
            .retain(|d| self.config.retains_package(&d.package));
        catalog.others.retain(|m| match m.package.as_deref() {
            Some(pkg) if !pkg.is_empty() => self.config.retains_package(pkg),
            _ => true,
        });

        // Step 7: surviving channel names per package.
        let mut surviving_channels: IndexMap<String, IndexSet<String>> = IndexMap::new();
        for channel in &catalog.channels {
            surviving_channels
                .entry(channel.package.clone())
                .or_default()
                .insert(channel.name.clone());
        }

        // Step 8: reconcile default channels.
        for package in &mut catalog.packages {
            let survivors = surviving_channels
                .get(&package.name)
                .cloned()
                .unwrap_or_default();
            let Some(package_filter) = self.config.package(&package.name) else {
                continue;
            };
            match reconcile_default_channel(
                &package.name,
                &package.default_channel,
                package_filter,
                &survivors,
            ) {
                Ok(new_default) => package.default_channel = new_default,
                Err(err) => errors.push(err),
            }
        }

        // Step 9: build the version map from every surviving bundle's `olm.package` property.
        let mut version_map: IndexMap<String, IndexMap<String, Version>> = IndexMap::new();
        for bundle in &catalog.bundles {
            match bundle_version(bundle) {
                Ok(version) => {
                    version_map
                        .entry(bundle.package.clone())
                        .or_default()
                        .insert(bundle.name.clone(), version);
                }
                Err(err) => errors.push(err),
            }
        }

        // Step 10: narrow each channel's entries, ranged channels via the selector, unranged
        // channels via the raw reference closure (`spec.md` §9, the asymmetry is intentional).
        //
        // A package is "subject to entry narrowing" -- and therefore has its bundles pruned to
        // the kept-entries set at step 11 -- iff its package filter names an explicit `channels`
        // list, whether or not any of those channels also carries a `versionRange`. A package
        // filter with no `channels` list at all means "keep every channel and every bundle
        // unchanged" (`spec.md` §8 S8); that's the only carve-out.
        let mut kept_bundles: IndexMap<String, IndexSet<String>> = IndexMap::new();
        let mut narrowed_packages: IndexSet<String> = IndexSet::new();
        let empty_versions: IndexMap<String, Version> = IndexMap::new();

        for channel in &mut catalog.channels {
            let Some(package_filter) = self.config.package(&channel.package) else {
                continue;
            };
            if package_filter.channels.is_some() {
                narrowed_packages.insert(channel.package.clone());
            }
            let version_range = package_filter
                .channel(&channel.name)
                .and_then(|c| c.version_range.as_deref());

            let kept_names: IndexSet<String> = match version_range {
                None => unranged_closure(&channel.entries),
                Some(range_str) => {
                    let versions = version_map
                        .get(&channel.package)
                        .unwrap_or(&empty_versions);
                    match select_channel(
                        &channel.package,
                        &channel.name,
                        &channel.entries,
                        range_str,
                        versions,
                        self.logger.as_ref(),
                    ) {
                        Ok(names) => names,
                        Err(err) => {
                            errors.push(err);
                            IndexSet::new()
                        }
                    }
                }
            };

            channel.entries.retain(|e| kept_names.contains(&e.name));
            kept_bundles
                .entry(channel.package.clone())
                .or_default()
                .extend(kept_names);
        }

        // Step 11: prune bundles for packages that underwent entry narrowing.
        catalog.bundles.retain(|b| {
            if narrowed_packages.contains(&b.package) {
                kept_bundles
                    .get(&b.package)
                    .map(|kept| kept.contains(&b.name))
                    .unwrap_or(false)
            } else {
                true
            }
        });

        // Step 12: prune deprecation entries whose target didn't survive.
        let surviving_channel_pairs: HashSet<(String, String)> = catalog
            .channels
            .iter()
            .map(|c| (c.package.clone(), c.name.clone()))
            .collect();
        for deprecation in &mut catalog.deprecations {
            let package = deprecation.package.clone();
            deprecation.entries.retain(|entry| {
                match (entry.reference.schema.as_str(), &entry.reference.name) {
                    (schema::BUNDLE, Some(name)) => kept_bundles
                        .get(&package)
                        .map(|kept| kept.contains(name))
                        .unwrap_or(false),
                    (schema::CHANNEL, Some(name)) => {
                        surviving_channel_pairs.contains(&(package.clone(), name.clone()))
                    }
                    (schema::PACKAGE, _) => true,
                    _ => true,
                }
            });
        }

        if errors.is_empty() {
            Ok(catalog)
        } else {
            Err(Errors(errors))
        }
    }

    /// A coarse, package-level pre-screen for streaming decoders (`spec.md` §4.5): returns true
    /// iff the package `meta` belongs to is retained by this filter. Never errors. Meta objects
    /// with no identifiable package (catalog-wide globals) are always kept, matching how
    /// [`Filter::filter_catalog`] treats package-less "other" objects.
    pub fn keep_meta(&self, meta: &Meta) -> bool {
        let package = if meta.schema == schema::PACKAGE {
            meta.name.as_deref()
        } else {
            meta.package.as_deref()
        };
        match package {
            Some(name) if !name.is_empty() => self.config.retains_package(name),
            _ => true,
        }
    }
}

/// The kept-entry set for a channel with no configured version range: every entry's own name,
/// plus every name its entries mention via `replaces` or `skips`, whether or not that name
/// resolves to a first-class entry (`spec.md` §9, open question).
fn unranged_closure(entries: &[ChannelEntry]) -> IndexSet<String> {
    let mut kept = IndexSet::with_capacity(entries.len());
    for entry in entries {
        kept.insert(entry.name.clone());
        if let Some(replaces) = &entry.replaces {
            kept.insert(replaces.clone());
        }
        kept.extend(entry.skips.iter().cloned());
    }
    kept
}

fn select_channel(
    package: &str,
    channel: &str,
    entries: &[ChannelEntry],
    range_str: &str,
    versions: &IndexMap<String, Version>,
    logger: &dyn Logger,
) -> Result<IndexSet<String>, Error> {
    let range = VersionReq::parse(range_str).map_err(|source| Error::VersionRangeInvalid {
        package: package.to_string(),
        channel: channel.to_string(),
        range: range_str.to_string(),
        source,
    })?;
    let graph = ChannelGraph::build(package, channel, entries)?;
    let kept = select_entries(package, channel, &graph, &range, range_str, versions, logger)?;
    Ok(kept.into_iter().collect())
}

fn bundle_version(bundle: &Bundle) -> Result<Version, Error> {
    let property = bundle
        .properties
        .iter()
        .find(|p| p.property_type == schema::PACKAGE)
        .ok_or_else(|| missing_version(bundle, "no \"olm.package\" property present"))?;

    let parsed: PackageProperty = serde_json::from_value(property.value.clone())
        .map_err(|err| missing_version(bundle, &format!("malformed \"olm.package\" property: {}", err)))?;

    Version::parse(&parsed.version).map_err(|err| {
        missing_version(
            bundle,
            &format!("invalid semver version \"{}\": {}", parsed.version, err),
        )
    })
}

fn missing_version(bundle: &Bundle, reason: &str) -> Error {
    Error::BundleMissingVersion {
        package: bundle.package.clone(),
        bundle: bundle.name.clone(),
        reason: reason.to_string(),
    }
}
