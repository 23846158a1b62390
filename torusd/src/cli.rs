//! Command-line configuration.
//!
//! One mode, no subcommands: point the server at a data file and a socket
//! path and it runs until killed. Verbosity follows `clap-verbosity-flag`
//! for `-v`/`-q`.

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::path::PathBuf;

/// A persistent, multi-user, toroidal ASCII canvas server.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
	/// Path to the persistent tile data file, created on first run if
	/// absent and reused (at its existing size) on every run after.
	#[arg(short = 'd', long, default_value = "torus.dat")]
	pub data: PathBuf,

	/// Path of the Unix domain socket clients connect to. Removed and
	/// recreated on startup if nothing is listening on it already.
	#[arg(short = 's', long, default_value = "torus.sock")]
	pub socket: PathBuf,

	/// Daemonise after startup succeeds, writing the child's pid to this
	/// file. Omit to run in the foreground.
	#[arg(short = 'p', long)]
	pub pid_file: Option<PathBuf>,

	#[command(flatten)]
	pub verbosity: Verbosity<InfoLevel>,
}
