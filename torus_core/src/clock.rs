//! Wall-clock access, isolated so tests can avoid depending on real time.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as whole seconds since the Unix epoch.
///
/// A tile with `create_time == 0` is "uninitialised"; since this clock can
/// in principle return 0 at the epoch itself, that moment is
/// indistinguishable from "never" by design.
#[must_use]
pub fn now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}
