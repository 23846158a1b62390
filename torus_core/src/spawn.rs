//! The teleport port table: origin plus the four quadrant midpoints.
//!
//! Generalised over the compile-time torus dimensions rather than a fixed
//! size, so the table scales with whatever deployment this binary is built
//! for.

use crate::types::constants::{TILE_COLS, TILE_ROWS};

/// Number of defined teleport ports.
pub const PORT_COUNT: usize = 5;

/// `port`-th entry of the fixed teleport table: origin, then NW/NE/SE/SW
/// quadrant midpoints at +/- one quarter of the torus.
///
/// Returns `None` for `port >= PORT_COUNT`; invalid indices fail the client.
#[must_use]
pub fn port_tile(port: u8) -> Option<(u32, u32)> {
	let table: [(u32, u32); PORT_COUNT] = [
		(0, 0),
		(TILE_COLS * 3 / 4, TILE_ROWS * 3 / 4),
		(TILE_COLS * 1 / 4, TILE_ROWS * 3 / 4),
		(TILE_COLS * 1 / 4, TILE_ROWS * 1 / 4),
		(TILE_COLS * 3 / 4, TILE_ROWS * 1 / 4),
	];
	table.get(port as usize).copied()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn port_zero_is_origin() {
		assert_eq!(port_tile(0), Some((0, 0)));
	}

	#[test]
	fn out_of_range_port_is_none() {
		assert_eq!(port_tile(PORT_COUNT as u8), None);
		assert_eq!(port_tile(255), None);
	}
}
