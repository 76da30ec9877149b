// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::{HashMap, HashSet};

use petgraph::prelude::*;
use petgraph::visit::EdgeRef;

use crate::catalog::ChannelEntry;
use crate::error::Error;

/// The kind of edge in a channel's upgrade graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum EdgeKind {
    Replaces,
    Skips,
}

/// The construction states a channel passes through on the way to becoming a validated
/// [`ChannelGraph`] (`spec.md` §4.6): `Unvalidated -> Indexed -> HeadsComputed -> Traversed`.
/// Tracked only to assert the step ordering in debug builds via [`ChannelGraph::build`]'s
/// `debug_assert_eq!` calls; a failure at any step returns `Err` directly (the "Rejected"
/// terminal state) instead of advancing, so there is no variant for it here.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BuildState {
    Unvalidated,
    Indexed,
    HeadsComputed,
    Traversed,
}

/// A validated, head-rooted internal representation of one package's channel (`spec.md` §3,
/// "internal entities", and §4.2).
///
/// Built with [`ChannelGraph::build`] from a channel's raw `entries`. Construction fails if the
/// entries violate any of the invariants in `spec.md` §3: duplicate names, self-references, or a
/// cycle/zero-or-multiple-heads in the upgrade graph.
pub(crate) struct ChannelGraph {
    graph: DiGraph<Box<str>, EdgeKind, u32>,
    index: HashMap<Box<str>, NodeIndex>,
    head: NodeIndex,
}

impl ChannelGraph {
    /// Builds and validates a channel graph from its raw entries.
    ///
    /// `package` and `channel` are used only to label error messages.
    pub(crate) fn build(
        package: &str,
        channel: &str,
        entries: &[ChannelEntry],
    ) -> Result<Self, Error> {
        let mut state = BuildState::Unvalidated;

        if entries.is_empty() {
            return Err(invalid(package, channel, "channel has no entries"));
        }

        let mut graph = DiGraph::<Box<str>, EdgeKind, u32>::with_capacity(
            entries.len(),
            entries.len(),
        );
        let mut index: HashMap<Box<str>, NodeIndex> = HashMap::with_capacity(entries.len());

        for entry in entries {
            if index.contains_key(entry.name.as_str()) {
                return Err(invalid(
                    package,
                    channel,
                    &format!("duplicate channel entry name '{}'", entry.name),
                ));
            }
            let ix = graph.add_node(entry.name.as_str().into());
            index.insert(entry.name.as_str().into(), ix);
        }

        debug_assert_eq!(state, BuildState::Unvalidated);
        state = BuildState::Indexed;

        for entry in entries {
            if let Some(replaces) = &entry.replaces {
                if replaces == &entry.name {
                    return Err(invalid(
                        package,
                        channel,
                        &format!("entry '{}' replaces itself", entry.name),
                    ));
                }
            }
            if entry.skips.iter().any(|s| s == &entry.name) {
                return Err(invalid(
                    package,
                    channel,
                    &format!("entry '{}' skips itself", entry.name),
                ));
            }

            let from = index[entry.name.as_str()];
            if let Some(replaces) = &entry.replaces {
                if let Some(&to) = index.get(replaces.as_str()) {
                    graph.add_edge(from, to, EdgeKind::Replaces);
                }
            }
            for skip in &entry.skips {
                if let Some(&to) = index.get(skip.as_str()) {
                    graph.add_edge(from, to, EdgeKind::Skips);
                }
            }
        }

        // Non-heads: every name that is the `replaces` target or a `skips` element of some
        // other entry.
        let mut non_heads: HashSet<&str> = HashSet::new();
        for entry in entries {
            if let Some(replaces) = &entry.replaces {
                non_heads.insert(replaces.as_str());
            }
            for skip in &entry.skips {
                non_heads.insert(skip.as_str());
            }
        }

        let mut heads: Vec<&str> = entries
            .iter()
            .map(|e| e.name.as_str())
            .filter(|name| !non_heads.contains(name))
            .collect();

        if heads.is_empty() {
            return Err(invalid(package, channel, "no channel heads found"));
        }
        if heads.len() > 1 {
            heads.sort_unstable();
            return Err(invalid(
                package,
                channel,
                &format!("multiple channel heads found: {:?}", heads),
            ));
        }

        debug_assert_eq!(state, BuildState::Indexed);
        state = BuildState::HeadsComputed;

        let head_name = heads[0];
        let head = index[head_name];

        detect_cycle(&graph, head, entries.len()).map_err(|()| {
            invalid(
                package,
                channel,
                "detected a cycle in the upgrade graph of the channel",
            )
        })?;

        debug_assert_eq!(state, BuildState::HeadsComputed);
        state = BuildState::Traversed;
        debug_assert_eq!(state, BuildState::Traversed);

        Ok(ChannelGraph { graph, index, head })
    }

    /// The name of the channel's unique head entry.
    pub(crate) fn head_name(&self) -> &str {
        &self.graph[self.head]
    }

    /// The spine: `[head, head.replaces, head.replaces.replaces, ...]`, terminating at the first
    /// entry whose `replaces` is absent or doesn't resolve to another first-class entry.
    pub(crate) fn spine(&self) -> Vec<&str> {
        let mut spine = Vec::new();
        let mut current = Some(self.head);
        let mut visited = HashSet::new();
        while let Some(ix) = current {
            if !visited.insert(ix) {
                break;
            }
            spine.push(self.graph[ix].as_ref());
            current = self
                .graph
                .edges(ix)
                .find(|e| *e.weight() == EdgeKind::Replaces)
                .map(|e| e.target());
        }
        spine
    }

    /// The names this entry `skips`, restricted to names that resolve to another first-class
    /// entry in this graph.
    pub(crate) fn skips_of<'a>(&'a self, name: &str) -> Vec<&'a str> {
        match self.index.get(name) {
            None => Vec::new(),
            Some(&ix) => self
                .graph
                .edges(ix)
                .filter(|e| *e.weight() == EdgeKind::Skips)
                .map(|e| self.graph[e.target()].as_ref())
                .collect(),
        }
    }

    /// Returns true if `name` is a first-class entry in this graph.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

fn invalid(package: &str, channel: &str, reason: &str) -> Error {
    Error::ChannelInvalid {
        package: package.to_string(),
        channel: channel.to_string(),
        reason: reason.to_string(),
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum Color {
    /// Currently on the path from `head` to the node being visited.
    OnPath,
    /// Fully explored; known not to lead back to anything on the current path.
    Done,
}

/// Depth-limited DFS from `head` following both `replaces` and `skips` edges. A node revisited
/// while still on the current path is a genuine back-edge (cycle); a node reached again after
/// being fully explored (e.g. two entries skipping the same older bundle) is an ordinary diamond
/// and not an error. `spec.md` §4.2 step 8 calls this "depth-limited" -- bound recursion by the
/// entry count so a malformed graph can't recurse unboundedly.
fn detect_cycle(
    graph: &DiGraph<Box<str>, EdgeKind, u32>,
    head: NodeIndex,
    entry_count: usize,
) -> Result<(), ()> {
    let mut color: HashMap<NodeIndex, Color> = HashMap::new();
    visit(graph, head, 0, entry_count, &mut color)
}

fn visit(
    graph: &DiGraph<Box<str>, EdgeKind, u32>,
    node: NodeIndex,
    depth: usize,
    limit: usize,
    color: &mut HashMap<NodeIndex, Color>,
) -> Result<(), ()> {
    if depth > limit {
        return Err(());
    }
    color.insert(node, Color::OnPath);
    for edge in graph.edges(node) {
        let target = edge.target();
        match color.get(&target) {
            Some(Color::OnPath) => return Err(()),
            Some(Color::Done) => continue,
            None => visit(graph, target, depth + 1, limit, color)?,
        }
    }
    color.insert(node, Color::Done);
    Ok(())
}
