//! Parses arguments, sets up logging, optionally daemonises, then hands
//! off to [`torusd::server::Server`]: parse, configure logging, dispatch,
//! translate any top-level failure into a process exit code.

use anyhow::{Context, Result};
use clap::Parser;
use fork::Fork;
use std::path::Path;
use torusd::cli::Cli;
use torusd::sysexits;

fn main() {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(e) => {
			e.print().ok();
			std::process::exit(sysexits::USAGE);
		}
	};

	env_logger::Builder::new().filter_level(cli.verbosity.log_level_filter()).format_timestamp(None).init();

	if let Some(pid_file) = &cli.pid_file {
		if let Err(e) = daemonize(pid_file) {
			log::error!("failed to daemonise: {e:#}");
			std::process::exit(sysexits::OSERR);
		}
	}

	let store = match torusd::open_store(&cli.data) {
		Ok(store) => store,
		Err(e) => {
			log::error!("{e:#}");
			std::process::exit(sysexits::classify(&e));
		}
	};

	let mut server = match torusd::server::Server::bind(&cli.socket, store) {
		Ok(server) => server,
		Err(e) => {
			log::error!("{e:#}");
			std::process::exit(sysexits::classify(&e));
		}
	};

	if let Err(e) = server.run() {
		log::error!("{e:#}");
		std::process::exit(sysexits::classify(&e));
	}
}

/// Forks once, writes the child's pid to `pid_file` from the parent (which
/// then exits), and detaches the child from its controlling terminal. The
/// child is the process that returns from this function and goes on to
/// serve.
fn daemonize(pid_file: &Path) -> Result<()> {
	match fork::fork().map_err(|errno| anyhow::anyhow!("fork() failed, errno {errno}"))? {
		Fork::Parent(child_pid) => {
			std::fs::write(pid_file, format!("{child_pid}\n"))
				.with_context(|| format!("writing pid file {}", pid_file.display()))?;
			std::process::exit(0);
		}
		Fork::Child => {
			fork::setsid().map_err(|errno| anyhow::anyhow!("setsid() failed, errno {errno}"))?;
			Ok(())
		}
	}
}
