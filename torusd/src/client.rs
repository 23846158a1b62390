//! A connected client's socket and cursor state.

use mio::net::UnixStream;
use torus_core::{CellCoord, TileCoord};

/// One connected client: its socket and where its cursor currently sits.
///
/// No intrusive links here — the arena slot [`crate::registry::Registry`]
/// owns this in is what gives it a stable identity.
pub struct Client {
	pub stream: UnixStream,
	pub tile: TileCoord,
	pub cell: CellCoord,
}

impl Client {
	#[must_use]
	pub fn new(stream: UnixStream, tile: TileCoord, cell: CellCoord) -> Client {
		Client { stream, tile, cell }
	}
}
