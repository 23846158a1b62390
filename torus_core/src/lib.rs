//! Shared data types for the torus canvas server.
//!
//! This crate carries everything external tools and the server agree on:
//! the page-sized [`types::Tile`] record mapped directly onto the
//! persistent file, torus coordinate arithmetic, and the fixed-size wire
//! frames exchanged between client and server. Nothing in here touches a
//! socket or a file; it is pure data and pure functions.

pub mod clock;
pub mod proto;
pub mod spawn;
pub mod types;

pub use types::cell::Cell;
pub use types::constants::{CELL_COLS, CELL_ROWS, PAGE_SIZE, TILE_COLS, TILE_ROWS};
pub use proto::MapRecord;
pub use types::coord::{move_cursor, wrap, CellCoord, TileCoord};
pub use types::tile::{Tile, TileMetaSnapshot};
