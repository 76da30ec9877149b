// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The channel upgrade graph: builds a validated graph from a channel's raw entries
//! (`spec.md` §4.2) and selects the entries a configured version range retains from it
//! (`spec.md` §4.3).

mod build;
mod select;

pub(crate) use build::ChannelGraph;
pub(crate) use select::select_entries;
