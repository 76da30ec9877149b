// Copyright (c) The catalog-filter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Default-channel reconciliation (`spec.md` §4.4): after the driver has computed which channels
//! survive for a package, decide the package's new default channel.

use indexmap::IndexSet;

use crate::config::PackageFilter;
use crate::error::Error;

/// Resolves the default channel for a package after filtering, per the three rules in
/// `spec.md` §4.4, applied in order.
pub(crate) fn reconcile_default_channel(
    package: &str,
    current_default: &str,
    filter: &PackageFilter,
    surviving_channels: &IndexSet<String>,
) -> Result<String, Error> {
    let override_channel = filter.default_channel.as_deref().unwrap_or("");

    // Rule 1: both empty, nothing to do.
    if current_default.is_empty() && override_channel.is_empty() {
        return Ok(String::new());
    }

    // Rule 2: an override was configured.
    if !override_channel.is_empty() {
        return if surviving_channels.contains(override_channel) {
            Ok(override_channel.to_string())
        } else {
            Err(unresolved(
                package,
                &format!(
                    "specified default channel override \"{}\" does not exist in the filtered output",
                    override_channel
                ),
            ))
        };
    }

    // Rule 3: no override, fall back to the catalog's existing default.
    if surviving_channels.contains(current_default) {
        Ok(current_default.to_string())
    } else {
        Err(unresolved(
            package,
            &format!(
                "the default channel \"{}\" was filtered out, a new default channel must be configured for this package",
                current_default
            ),
        ))
    }
}

fn unresolved(package: &str, reason: &str) -> Error {
    Error::DefaultChannelUnresolved {
        package: package.to_string(),
        reason: reason.to_string(),
    }
}
