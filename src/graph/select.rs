// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use semver::{Version, VersionReq};

use crate::error::{Error, Warning};
use crate::graph::build::ChannelGraph;
use crate::logger::Logger;

/// A requirement of "*" filters out pre-release versions with the `semver` crate's default
/// matching rules, but FBC version ranges mean "match everything" when written that way. Same
/// crate, same caveat as `cargo_version_matches` in the teacher this was ported from.
fn range_matches(req: &VersionReq, version: &Version) -> bool {
    static WILDCARD: Lazy<VersionReq> = Lazy::new(|| VersionReq::parse("*").unwrap());
    req == &*WILDCARD || req.matches(version)
}

/// Selects the entries to retain from a validated channel graph for a given semver range
/// (`spec.md` §4.3). `versions` maps a bundle name to its parsed version; a name absent from the
/// map is treated as unversioned.
///
/// Returns the set of entry names to keep. Emits a [`Warning`] via `logger` for every kept spine
/// entry whose version falls outside `range` or is unversioned.
pub(crate) fn select_entries(
    package: &str,
    channel: &str,
    graph: &ChannelGraph,
    range: &VersionReq,
    range_str: &str,
    versions: &IndexMap<String, Version>,
    logger: &dyn Logger,
) -> Result<BTreeSet<String>, Error> {
    let spine = graph.spine();
    let in_range = |name: &str| -> bool {
        versions
            .get(name)
            .map(|v| range_matches(range, v))
            .unwrap_or(false)
    };

    // count(spine[i]) = number of unique in-range bundles contributed by spine[i] and every
    // entry below it on the spine (its "ancestors" via `replaces`), plus the skip targets of
    // spine[i] and those ancestors. Computed with a single pass from the tail (index len-1)
    // up to the head (index 0), accumulating into a shared `seen` set so each concrete bundle
    // is counted at most once anywhere in the channel.
    let mut counts = vec![0usize; spine.len()];
    let mut seen: HashSet<&str> = HashSet::new();
    for i in (0..spine.len()).rev() {
        let name = spine[i];
        if in_range(name) {
            seen.insert(name);
        }
        for skip in graph.skips_of(name) {
            if in_range(skip) {
                seen.insert(skip);
            }
        }
        counts[i] = seen.len();
    }

    if spine.is_empty() {
        return Err(Error::EmptyChannelAfterFilter {
            package: package.to_string(),
            channel: channel.to_string(),
        });
    }

    let max_count = counts[0];

    // New head: the deepest spine entry whose count still equals the overall maximum -- i.e.
    // the point past which walking further toward head contributes nothing new.
    let mut new_head_ix = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count == max_count {
            new_head_ix = i;
        }
    }

    // Tail: the first (shallowest) spine entry with a zero count; it's an exclusive terminator,
    // never kept.
    let tail_ix = counts
        .iter()
        .position(|&count| count == 0)
        .unwrap_or(spine.len());

    if new_head_ix >= tail_ix {
        return Err(Error::EmptyChannelAfterFilter {
            package: package.to_string(),
            channel: channel.to_string(),
        });
    }

    let mut kept: BTreeSet<String> = BTreeSet::new();
    for &name in &spine[new_head_ix..tail_ix] {
        kept.insert(name.to_string());

        match versions.get(name) {
            Some(version) if !range_matches(range, version) => {
                logger.warn(&Warning::ForcedInclusionOutOfRange {
                    package: package.to_string(),
                    channel: channel.to_string(),
                    bundle: name.to_string(),
                    version: version.clone(),
                    range: range_str.to_string(),
                });
            }
            None => {
                logger.warn(&Warning::ForcedInclusionUnversioned {
                    package: package.to_string(),
                    channel: channel.to_string(),
                    bundle: name.to_string(),
                });
            }
            _ => {}
        }

        for skip in graph.skips_of(name) {
            if in_range(skip) {
                kept.insert(skip.to_string());
            }
        }
    }

    if kept.is_empty() {
        return Err(Error::EmptyChannelAfterFilter {
            package: package.to_string(),
            channel: channel.to_string(),
        });
    }

    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ChannelEntry;
    use crate::logger::NullLogger;
    use pretty_assertions::assert_eq;

    fn entry(name: &str, replaces: Option<&str>, skips: &[&str]) -> ChannelEntry {
        ChannelEntry {
            name: name.to_string(),
            replaces: replaces.map(str::to_string),
            skips: skips.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn spec_scenario_s2_connector_minimization() {
        // b10 <- b9 <- b8 <- b6 <- b5 <- b4 <- b3, b8 skips b7.
        let entries = vec![
            entry("b10", Some("b9"), &[]),
            entry("b9", Some("b8"), &[]),
            entry("b8", Some("b6"), &["b7"]),
            entry("b6", Some("b5"), &[]),
            entry("b5", Some("b4"), &[]),
            entry("b4", Some("b3"), &[]),
            entry("b3", None, &[]),
        ];
        let graph = ChannelGraph::build("pkg1", "ch2", &entries).unwrap();

        let mut versions = IndexMap::new();
        versions.insert("b10".to_string(), v("10.0.0"));
        versions.insert("b9".to_string(), v("9.0.0"));
        versions.insert("b8".to_string(), v("8.0.0"));
        versions.insert("b7".to_string(), v("7.0.0"));
        versions.insert("b6".to_string(), v("6.0.0"));
        versions.insert("b5".to_string(), v("5.0.0"));
        versions.insert("b4".to_string(), v("4.0.0"));
        versions.insert("b3".to_string(), v("3.0.0"));

        let range = VersionReq::parse(">=4.0.0, <8.0.0").unwrap();
        let kept = select_entries(
            "pkg1",
            "ch2",
            &graph,
            &range,
            ">=4.0.0 <8.0.0",
            &versions,
            &NullLogger,
        )
        .unwrap();

        let expected: BTreeSet<String> = ["b8", "b7", "b6", "b5", "b4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(kept, expected);
    }

    #[test]
    fn spec_scenario_s3_range_excludes_everything() {
        let entries = vec![entry("b1", None, &[])];
        let graph = ChannelGraph::build("pkg1", "ch1", &entries).unwrap();
        let mut versions = IndexMap::new();
        versions.insert("b1".to_string(), v("1.0.0"));

        let range = VersionReq::parse(">100.0.0").unwrap();
        let err = select_entries(
            "pkg1",
            "ch1",
            &graph,
            &range,
            ">100.0.0",
            &versions,
            &NullLogger,
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptyChannelAfterFilter { .. }));
    }

    #[test]
    fn unversioned_kept_bundle_warns() {
        let entries = vec![entry("b2", Some("b1"), &[]), entry("b1", None, &[])];
        let graph = ChannelGraph::build("pkg1", "ch1", &entries).unwrap();
        let mut versions = IndexMap::new();
        versions.insert("b1".to_string(), v("1.0.0"));
        // b2 has no version entry at all.

        let range = VersionReq::parse(">=1.0.0").unwrap();
        let kept = select_entries(
            "pkg1",
            "ch1",
            &graph,
            &range,
            ">=1.0.0",
            &versions,
            &NullLogger,
        )
        .unwrap();
        assert!(kept.contains("b2"));
        assert!(kept.contains("b1"));
    }
}
