//! Client -> server frames: `Move`, `Flip`, `Put`, `Map`, `Tele`.

use bytemuck::{Pod, Zeroable};
use std::fmt;

const TAG_MOVE: u8 = 0;
const TAG_FLIP: u8 = 1;
const TAG_PUT: u8 = 2;
const TAG_MAP: u8 = 3;
const TAG_TELE: u8 = 4;

/// The exact bytes received from a client: a 1-byte tag plus a 2-byte
/// payload wide enough for the largest variant (`Move{dx,dy}` or
/// `Put{color,cell}`). `Flip`/`Map` ignore the payload bytes; `Tele` uses
/// only the first payload byte.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct RawClientFrame {
	pub tag: u8,
	pub p0: u8,
	pub p1: u8,
}

/// Size in bytes of one client frame — what the event loop `recv`s at a time.
pub const CLIENT_FRAME_SIZE: usize = std::mem::size_of::<RawClientFrame>();

/// A decoded client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientFrame {
	Move { dx: i8, dy: i8 },
	Flip,
	Put { color: u8, cell: u8 },
	Map,
	Tele { port: u8 },
}

/// The received frame carried a tag the protocol doesn't define.
///
/// A per-client fault: the client is disconnected, nothing is logged as an
/// error, nothing is sent back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDiscriminant(pub u8);

impl fmt::Display for InvalidDiscriminant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "invalid client frame discriminant: {}", self.0)
	}
}

impl std::error::Error for InvalidDiscriminant {}

impl TryFrom<RawClientFrame> for ClientFrame {
	type Error = InvalidDiscriminant;

	fn try_from(raw: RawClientFrame) -> Result<Self, Self::Error> {
		Ok(match raw.tag {
			TAG_MOVE => ClientFrame::Move {
				dx: raw.p0 as i8,
				dy: raw.p1 as i8,
			},
			TAG_FLIP => ClientFrame::Flip,
			TAG_PUT => ClientFrame::Put {
				color: raw.p0,
				cell: raw.p1,
			},
			TAG_MAP => ClientFrame::Map,
			TAG_TELE => ClientFrame::Tele { port: raw.p0 },
			other => return Err(InvalidDiscriminant(other)),
		})
	}
}
