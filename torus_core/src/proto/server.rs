//! Server -> client frames: `Tile`, `Move`, `Put`, `Cursor`, `Map`.
//!
//! `Tile` and `Map` are headers only; a bulk payload (one [`crate::Tile`]
//! record, or one [`MapRecord`]) follows on the same socket from the same
//! critical section.

use super::CURSOR_NONE;
use bytemuck::{Pod, Zeroable};

const TAG_TILE: u8 = 0;
const TAG_MOVE: u8 = 1;
const TAG_PUT: u8 = 2;
const TAG_CURSOR: u8 = 3;
const TAG_MAP: u8 = 4;

/// The exact bytes sent to a client: a 1-byte tag plus a 4-byte payload
/// wide enough for the largest variant (`Put`/`Cursor`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RawServerFrame {
	pub tag: u8,
	pub p0: u8,
	pub p1: u8,
	pub p2: u8,
	pub p3: u8,
}

/// Size in bytes of one server frame header.
pub const SERVER_FRAME_SIZE: usize = std::mem::size_of::<RawServerFrame>();

/// A server response or notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerFrame {
	/// Header only; a 4096-byte [`crate::Tile`] record follows.
	Tile,
	Move { cell_x: u8, cell_y: u8 },
	Put { cell_x: u8, cell_y: u8, color: u8, cell: u8 },
	Cursor { old_x: u8, old_y: u8, new_x: u8, new_y: u8 },
	/// Header only; a [`MapRecord`] follows.
	Map,
}

impl ServerFrame {
	/// A `Cursor` frame announcing a cursor's appearance at `(x, y)`.
	#[must_use]
	pub fn cursor_arrive(x: u8, y: u8) -> ServerFrame {
		ServerFrame::Cursor {
			old_x: CURSOR_NONE,
			old_y: CURSOR_NONE,
			new_x: x,
			new_y: y,
		}
	}

	/// A `Cursor` frame announcing a cursor's disappearance from `(x, y)`.
	#[must_use]
	pub fn cursor_depart(x: u8, y: u8) -> ServerFrame {
		ServerFrame::Cursor {
			old_x: x,
			old_y: y,
			new_x: CURSOR_NONE,
			new_y: CURSOR_NONE,
		}
	}
}

impl From<ServerFrame> for RawServerFrame {
	fn from(frame: ServerFrame) -> Self {
		match frame {
			ServerFrame::Tile => RawServerFrame {
				tag: TAG_TILE,
				p0: 0,
				p1: 0,
				p2: 0,
				p3: 0,
			},
			ServerFrame::Move { cell_x, cell_y } => RawServerFrame {
				tag: TAG_MOVE,
				p0: cell_x,
				p1: cell_y,
				p2: 0,
				p3: 0,
			},
			ServerFrame::Put { cell_x, cell_y, color, cell } => RawServerFrame {
				tag: TAG_PUT,
				p0: cell_x,
				p1: cell_y,
				p2: color,
				p3: cell,
			},
			ServerFrame::Cursor { old_x, old_y, new_x, new_y } => RawServerFrame {
				tag: TAG_CURSOR,
				p0: old_x,
				p1: old_y,
				p2: new_x,
				p3: new_y,
			},
			ServerFrame::Map => RawServerFrame {
				tag: TAG_MAP,
				p0: 0,
				p1: 0,
				p2: 0,
				p3: 0,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frame_size_is_five_bytes() {
		assert_eq!(SERVER_FRAME_SIZE, 5);
	}

	#[test]
	fn cursor_arrive_uses_none_on_old_side() {
		let raw = RawServerFrame::from(ServerFrame::cursor_arrive(10, 20));
		assert_eq!(raw.p0, CURSOR_NONE);
		assert_eq!(raw.p1, CURSOR_NONE);
		assert_eq!(raw.p2, 10);
		assert_eq!(raw.p3, 20);
	}

	#[test]
	fn cursor_depart_uses_none_on_new_side() {
		let raw = RawServerFrame::from(ServerFrame::cursor_depart(10, 20));
		assert_eq!(raw.p2, CURSOR_NONE);
		assert_eq!(raw.p3, CURSOR_NONE);
	}
}
