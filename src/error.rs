// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains types that describe errors and warnings that `catalog-filter` methods can return.

use std::error;
use std::fmt;

use Error::*;

/// Error type describing the sorts of errors `catalog-filter` can return.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The filter configuration document failed structural validation. Every failure found is
    /// reported together, not just the first.
    ConfigurationInvalid(Vec<String>),
    /// The configuration document could not be parsed as YAML or JSON at all.
    ConfigurationParseError(String),
    /// A retained bundle has no parseable `olm.package` version property.
    BundleMissingVersion {
        /// The package the bundle belongs to.
        package: String,
        /// The bundle's name.
        bundle: String,
        /// Why the version couldn't be read.
        reason: String,
    },
    /// A configured `versionRange` failed to parse as a semver constraint.
    VersionRangeInvalid {
        /// The package the channel belongs to.
        package: String,
        /// The channel the range was configured for.
        channel: String,
        /// The offending range expression.
        range: String,
        /// The underlying semver parse error.
        source: semver::Error,
    },
    /// A channel's upgrade graph violates one of the invariants in §3 of the specification
    /// (duplicate entry name, self-reference, cycle, zero or multiple heads).
    ChannelInvalid {
        /// The package the channel belongs to.
        package: String,
        /// The channel whose graph is invalid.
        channel: String,
        /// A human-readable description of the violation.
        reason: String,
    },
    /// A channel's configured version range excluded every bundle on its spine.
    EmptyChannelAfterFilter {
        /// The package the channel belongs to.
        package: String,
        /// The channel that ended up with no retained entries.
        channel: String,
    },
    /// A package's default channel could not be resolved after filtering.
    DefaultChannelUnresolved {
        /// The package whose default channel is unresolved.
        package: String,
        /// A human-readable description of why.
        reason: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationInvalid(messages) => {
                write!(f, "invalid filter configuration: {}", messages.join("; "))
            }
            ConfigurationParseError(msg) => {
                write!(f, "error while parsing filter configuration: {}", msg)
            }
            BundleMissingVersion {
                package,
                bundle,
                reason,
            } => write!(
                f,
                "package '{}': bundle '{}' is missing a usable version: {}",
                package, bundle, reason
            ),
            VersionRangeInvalid {
                package,
                channel,
                range,
                source,
            } => write!(
                f,
                "package '{}', channel '{}': invalid version range '{}': {}",
                package, channel, range, source
            ),
            ChannelInvalid {
                package,
                channel,
                reason,
            } => write!(
                f,
                "package '{}', channel '{}': {}",
                package, channel, reason
            ),
            EmptyChannelAfterFilter { package, channel } => write!(
                f,
                "package '{}', channel '{}': empty channel",
                package, channel
            ),
            DefaultChannelUnresolved { package, reason } => {
                write!(f, "package '{}': {}", package, reason)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            VersionRangeInvalid { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// An aggregate of one or more [`Error`]s, one per offending package (or a single configuration
/// error). The driver never stops at the first package-level failure; it collects every one and
/// returns them together.
#[derive(Debug)]
pub struct Errors(pub Vec<Error>);

impl Errors {
    /// Returns true if no errors were collected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the individual errors that were collected.
    pub fn errors(&self) -> &[Error] {
        &self.0
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("\n"))
    }
}

impl error::Error for Errors {}

impl From<Error> for Errors {
    fn from(err: Error) -> Self {
        Errors(vec![err])
    }
}

/// Describes warnings emitted while selecting a version range (`spec.md` §4.3). These never
/// become errors; they're surfaced through the [`crate::logger::Logger`] capability.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Warning {
    /// A spine entry outside the configured range was kept to preserve connectivity.
    ForcedInclusionOutOfRange {
        /// The package the channel belongs to.
        package: String,
        /// The channel the entry belongs to.
        channel: String,
        /// The entry (bundle) name.
        bundle: String,
        /// The bundle's version.
        version: semver::Version,
        /// The range it fell outside of.
        range: String,
    },
    /// A spine entry with no known version was kept to preserve connectivity.
    ForcedInclusionUnversioned {
        /// The package the channel belongs to.
        package: String,
        /// The channel the entry belongs to.
        channel: String,
        /// The entry (bundle) name.
        bundle: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Warning::*;
        match self {
            ForcedInclusionOutOfRange {
                bundle,
                version,
                range,
                ..
            } => write!(
                f,
                "including bundle \"{}\" with version \"{}\": it falls outside the specified range of \"{}\" but is required to ensure inclusion of all bundles in the range",
                bundle, version, range
            ),
            ForcedInclusionUnversioned { bundle, .. } => write!(
                f,
                "including bundle \"{}\": it is unversioned but is required to ensure inclusion of all bundles in the range",
                bundle
            ),
        }
    }
}
