// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The file-based catalog (FBC) object model: packages, channels, bundles, deprecations and
//! opaque "other" meta objects.
//!
//! This module models the data that flows in and out of [`crate::Filter`]. It does not concern
//! itself with how a `Catalog` is read from or written to disk -- that's the job of an external
//! collaborator (`spec.md` §1).

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Schema tags used to route meta objects (`spec.md` §6).
pub mod schema {
    /// Schema for package meta objects.
    pub const PACKAGE: &str = "olm.package";
    /// Schema for channel meta objects.
    pub const CHANNEL: &str = "olm.channel";
    /// Schema for bundle meta objects.
    pub const BUNDLE: &str = "olm.bundle";
    /// Schema for deprecation meta objects.
    pub const DEPRECATION: &str = "olm.deprecation";
}

/// A full catalog value: the input to, and output of, [`crate::Filter::filter_catalog`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Catalog {
    /// Packages in the catalog.
    #[serde(default)]
    pub packages: Vec<Package>,
    /// Channels in the catalog, across all packages.
    #[serde(default)]
    pub channels: Vec<Channel>,
    /// Bundles in the catalog, across all packages.
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    /// Deprecation markers in the catalog.
    #[serde(default)]
    pub deprecations: Vec<Deprecation>,
    /// Opaque meta objects whose schema this crate doesn't interpret.
    #[serde(default)]
    pub others: Vec<Meta>,
}

/// A package: the top-level grouping of channels and bundles.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Package {
    /// The package name.
    pub name: String,
    /// The channel name a consumer gets when it doesn't ask for one by name.
    #[serde(default, rename = "defaultChannel")]
    pub default_channel: String,
    /// Optional icon data; carried through unexamined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<JsonValue>,
    /// Optional human-readable description; carried through unexamined.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named, ordered upgrade stream of bundles within a package.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Channel {
    /// The package this channel belongs to.
    pub package: String,
    /// The channel's name, unique within its package.
    pub name: String,
    /// The channel's upgrade-graph entries.
    #[serde(default)]
    pub entries: Vec<ChannelEntry>,
}

/// A node in a channel's upgrade graph, naming a bundle and its direct predecessors.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "proptest1", derive(proptest_derive::Arbitrary))]
pub struct ChannelEntry {
    /// The bundle name this entry represents.
    pub name: String,
    /// The single predecessor this entry replaces, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaces: Option<String>,
    /// The peers this entry's upgrade bypasses.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skips: Vec<String>,
}

/// A single deployable unit of an operator at a specific version.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Bundle {
    /// The package this bundle belongs to.
    pub package: String,
    /// The bundle's name, referenced by [`ChannelEntry::name`].
    pub name: String,
    /// Bundle properties, including the mandatory `olm.package` version property.
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// One property attached to a [`Bundle`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Property {
    /// The property's type tag, e.g. `"olm.package"`.
    #[serde(rename = "type")]
    pub property_type: String,
    /// The property's value, opaque except where this crate interprets it.
    pub value: JsonValue,
}

/// The value of an `olm.package` bundle property.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PackageProperty {
    /// The package name this bundle belongs to.
    #[serde(rename = "packageName")]
    pub package_name: String,
    /// The bundle's strict-semver version.
    pub version: String,
}

/// A marker declaring that a package, channel, or bundle is no longer recommended.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Deprecation {
    /// The package this deprecation belongs to.
    pub package: String,
    /// The individual deprecation entries.
    #[serde(default)]
    pub entries: Vec<DeprecationEntry>,
}

/// A single deprecation entry, referencing a package, channel, or bundle.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeprecationEntry {
    /// The reference this entry deprecates.
    pub reference: DeprecationReference,
}

/// The target of a [`DeprecationEntry`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeprecationReference {
    /// The schema of the referenced object (`olm.package`, `olm.channel` or `olm.bundle`).
    pub schema: String,
    /// The name of the referenced channel or bundle. Absent for `olm.package` references, since
    /// the package is implied by [`Deprecation::package`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An opaque meta object whose schema this crate doesn't interpret, carried through unchanged.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Meta {
    /// The object's schema tag.
    pub schema: String,
    /// The package this object belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// The object's name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The rest of the object, preserved verbatim.
    #[serde(flatten)]
    pub raw: JsonValue,
}
