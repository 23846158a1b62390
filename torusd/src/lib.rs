//! The torus canvas server library: client registry, protocol handlers,
//! wire framing, and the event loop that ties them to a listening socket.
//! `src/main.rs` is a thin wrapper around [`run`].

pub mod cli;
pub mod client;
pub mod engine;
pub mod registry;
pub mod server;
pub mod sysexits;
pub mod wire;

use anyhow::{Context, Result};
use cli::Cli;
use std::path::Path;
use torus_core::types::constants::{TILE_COLS, TILE_ROWS};
use torus_store::TileStore;

/// Opens the tile store at the configured path, sized for the canonical
/// deployment's dimensions.
pub fn open_store(path: &Path) -> Result<TileStore> {
	TileStore::open(path, TILE_COLS, TILE_ROWS).with_context(|| format!("opening tile store at {}", path.display()))
}

/// Opens the tile store and the listening socket, then runs the event loop
/// until it returns a fatal error (everything else is handled as a
/// per-client fault and never escapes this far). Exposed as one call for
/// callers that don't need per-stage exit codes; `main` calls the stages
/// directly so it can classify which one failed.
pub fn run(cli: &Cli) -> Result<()> {
	let store = open_store(&cli.data)?;
	let mut server = server::Server::bind(&cli.socket, store)?;
	server.run()
}
