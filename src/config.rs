// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The filter configuration document (`spec.md` §4.1, §6) and its validator.

use serde::{Deserialize, Serialize};

use crate::error::Error;

const API_VERSION: &str = "olm.operatorframework.io/v1alpha1";
const KIND: &str = "FilterConfiguration";

/// A validated filter configuration document.
///
/// Construct one with [`FilterConfig::parse`] (accepts YAML or JSON),
/// [`FilterConfig::parse_yaml`], [`FilterConfig::parse_json`], or
/// [`FilterConfig::keep_packages`] for the "keep everything for these packages" shorthand.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FilterConfig {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    /// The packages to retain, and how to narrow each one.
    pub packages: Vec<PackageFilter>,
}

/// Filtering instructions for a single package.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct PackageFilter {
    /// The package name to retain.
    pub name: String,
    /// Override for the package's default channel after filtering. Absent means "inherit the
    /// catalog's current default, unless it was pruned."
    #[serde(default, rename = "defaultChannel", skip_serializing_if = "Option::is_none")]
    pub default_channel: Option<String>,
    /// The channels to retain. Absent means "keep every channel of this package."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<Vec<ChannelFilter>>,
}

/// Filtering instructions for a single channel.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ChannelFilter {
    /// The channel name to retain.
    pub name: String,
    /// A semver constraint expression. Absent means "keep every bundle in this channel."
    #[serde(default, rename = "versionRange", skip_serializing_if = "Option::is_none")]
    pub version_range: Option<String>,
}

impl FilterConfig {
    /// Parses and validates a filter configuration, trying YAML first and falling back to JSON.
    ///
    /// JSON is a subset of the YAML this crate accepts, so this is almost always what callers
    /// want; use [`FilterConfig::parse_yaml`] or [`FilterConfig::parse_json`] directly when the
    /// format is already known.
    pub fn parse(bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        let bytes = bytes.as_ref();
        match Self::parse_yaml(bytes) {
            Ok(config) => Ok(config),
            Err(yaml_err) => Self::parse_json(bytes).map_err(|_| yaml_err),
        }
    }

    /// Parses and validates a filter configuration from a YAML document.
    pub fn parse_yaml(bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        let raw: RawFilterConfig = serde_yaml::from_slice(bytes.as_ref())
            .map_err(|err| Error::ConfigurationParseError(err.to_string()))?;
        raw.validate()
    }

    /// Parses and validates a filter configuration from a JSON document.
    pub fn parse_json(bytes: impl AsRef<[u8]>) -> Result<Self, Error> {
        let raw: RawFilterConfig = serde_json::from_slice(bytes.as_ref())
            .map_err(|err| Error::ConfigurationParseError(err.to_string()))?;
        raw.validate()
    }

    /// Builds the configuration equivalent of the `--alpha-keep-packages` CLI shorthand
    /// (`spec.md` §6): keep every channel of each named package, no version ranges, no default
    /// channel overrides.
    pub fn keep_packages(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        FilterConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            packages: names
                .into_iter()
                .map(|name| PackageFilter {
                    name: name.into(),
                    default_channel: None,
                    channels: None,
                })
                .collect(),
        }
    }

    /// Looks up the filter for a given package, if the configuration mentions it.
    pub fn package(&self, name: &str) -> Option<&PackageFilter> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Returns true if the configuration retains this package.
    pub fn retains_package(&self, name: &str) -> bool {
        self.package(name).is_some()
    }
}

impl PackageFilter {
    /// Returns true if this package filter retains the given channel name.
    pub fn retains_channel(&self, channel_name: &str) -> bool {
        match &self.channels {
            None => true,
            Some(channels) => channels.iter().any(|c| c.name == channel_name),
        }
    }

    /// Looks up the filter for a given channel, if this package filter names it.
    pub fn channel(&self, channel_name: &str) -> Option<&ChannelFilter> {
        self.channels
            .as_ref()
            .and_then(|channels| channels.iter().find(|c| c.name == channel_name))
    }
}

/// The same shape as [`FilterConfig`], but not yet validated -- used only as the serde
/// deserialization target so that validation can run over the whole document and aggregate every
/// failure, instead of serde bailing out at the first structural problem it notices.
#[derive(Clone, Debug, Deserialize)]
struct RawFilterConfig {
    #[serde(rename = "apiVersion", default)]
    api_version: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    packages: Vec<RawPackageFilter>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawPackageFilter {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "defaultChannel")]
    default_channel: Option<String>,
    #[serde(default)]
    channels: Option<Vec<RawChannelFilter>>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawChannelFilter {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "versionRange")]
    version_range: Option<String>,
}

impl RawFilterConfig {
    fn validate(self) -> Result<FilterConfig, Error> {
        let mut problems = Vec::new();

        if self.api_version != API_VERSION {
            problems.push(format!(
                "unsupported apiVersion '{}', expected '{}'",
                self.api_version, API_VERSION
            ));
        }
        if self.kind != KIND {
            problems.push(format!(
                "unsupported kind '{}', expected '{}'",
                self.kind, KIND
            ));
        }
        if self.packages.is_empty() {
            problems.push("packages list must not be empty".to_string());
        }

        let mut packages = Vec::with_capacity(self.packages.len());
        for (i, raw_package) in self.packages.into_iter().enumerate() {
            if raw_package.name.is_empty() {
                problems.push(format!("packages[{}]: name must not be empty", i));
            }

            let channels = match raw_package.channels {
                None => None,
                Some(raw_channels) => {
                    let mut channels = Vec::with_capacity(raw_channels.len());
                    for (j, raw_channel) in raw_channels.into_iter().enumerate() {
                        if raw_channel.name.is_empty() {
                            problems.push(format!(
                                "packages[{}].channels[{}]: name must not be empty",
                                i, j
                            ));
                        }
                        channels.push(ChannelFilter {
                            name: raw_channel.name,
                            version_range: raw_channel.version_range,
                        });
                    }
                    Some(channels)
                }
            };

            packages.push(PackageFilter {
                name: raw_package.name,
                default_channel: raw_package.default_channel,
                channels,
            });
        }

        if !problems.is_empty() {
            return Err(Error::ConfigurationInvalid(problems));
        }

        Ok(FilterConfig {
            api_version: self.api_version,
            kind: self.kind,
            packages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_minimal_yaml() {
        let yaml = r#"
apiVersion: olm.operatorframework.io/v1alpha1
kind: FilterConfiguration
packages:
  - name: etcd-operator
"#;
        let config = FilterConfig::parse_yaml(yaml).expect("valid config");
        assert_eq!(config.packages.len(), 1);
        assert_eq!(config.packages[0].name, "etcd-operator");
        assert!(config.packages[0].channels.is_none());
    }

    #[test]
    fn parses_full_json() {
        let json = r#"{
            "apiVersion": "olm.operatorframework.io/v1alpha1",
            "kind": "FilterConfiguration",
            "packages": [
                {
                    "name": "etcd-operator",
                    "defaultChannel": "stable",
                    "channels": [
                        { "name": "stable", "versionRange": ">=1.0.0 <2.0.0" },
                        { "name": "alpha" }
                    ]
                }
            ]
        }"#;
        let config = FilterConfig::parse_json(json).expect("valid config");
        let package = &config.packages[0];
        assert_eq!(package.default_channel.as_deref(), Some("stable"));
        let channels = package.channels.as_ref().unwrap();
        assert_eq!(channels[0].version_range.as_deref(), Some(">=1.0.0 <2.0.0"));
        assert_eq!(channels[1].version_range, None);
    }

    #[test]
    fn aggregates_every_validation_failure() {
        let json = r#"{
            "apiVersion": "wrong",
            "kind": "wrong",
            "packages": [ { "name": "" } ]
        }"#;
        let err = FilterConfig::parse_json(json).expect_err("invalid config");
        assert_matches!(err, Error::ConfigurationInvalid(ref problems) if problems.len() == 3);
    }

    #[test]
    fn empty_packages_list_is_rejected() {
        let json = r#"{
            "apiVersion": "olm.operatorframework.io/v1alpha1",
            "kind": "FilterConfiguration",
            "packages": []
        }"#;
        let err = FilterConfig::parse_json(json).expect_err("invalid config");
        assert_matches!(
            err,
            Error::ConfigurationInvalid(ref problems)
                if problems.iter().any(|p| p.contains("packages list must not be empty"))
        );
    }

    #[test]
    fn keep_packages_shorthand() {
        let config = FilterConfig::keep_packages(["a", "b"]);
        assert!(config.retains_package("a"));
        assert!(config.retains_package("b"));
        assert!(!config.retains_package("c"));
        assert!(config.package("a").unwrap().retains_channel("anything"));
    }
}
