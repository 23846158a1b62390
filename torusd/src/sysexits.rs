//! Process exit codes for startup failures.
//!
//! Gives each startup failure class its own conventional BSD `sysexits.h`
//! code so a process supervisor can tell them apart without parsing stderr.

/// The command line could not be parsed, or named an unusable path.
pub const USAGE: i32 = 64;
/// The tile data file does not exist and could not be created.
pub const NOINPUT: i32 = 66;
/// The socket path is already bound by another listener.
pub const UNAVAILABLE: i32 = 69;
/// A system call the server cannot proceed without failed (mmap, fork, ...).
pub const OSERR: i32 = 71;
/// A required file or directory could not be created.
pub const CANTCREAT: i32 = 73;
/// An I/O error occurred outside of any of the above.
pub const IOERR: i32 = 74;

use std::fmt;

/// A startup failure specific enough to map to its own exit code, as
/// opposed to a bare [`std::io::Error`] (classified by `io::ErrorKind` in
/// [`classify`]).
#[derive(Debug)]
pub enum StartupFault {
	/// Another process is already listening on the configured socket path.
	SocketInUse,
	/// Accepting a connection failed because the listener ran out of file descriptors.
	ListenerExhausted,
}

impl fmt::Display for StartupFault {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StartupFault::SocketInUse => write!(f, "socket is already in use by another server"),
			StartupFault::ListenerExhausted => write!(f, "listener ran out of file descriptors"),
		}
	}
}

impl std::error::Error for StartupFault {}

/// Picks an exit code for a startup failure, preferring a tagged
/// [`StartupFault`] where one was attached, then falling back to the
/// underlying [`std::io::Error`]'s kind, then a generic OS error.
#[must_use]
pub fn classify(err: &anyhow::Error) -> i32 {
	if let Some(fault) = err.chain().find_map(|cause| cause.downcast_ref::<StartupFault>()) {
		return match fault {
			StartupFault::SocketInUse => UNAVAILABLE,
			StartupFault::ListenerExhausted => OSERR,
		};
	}
	if let Some(io_err) = err.chain().find_map(|cause| cause.downcast_ref::<std::io::Error>()) {
		return match io_err.kind() {
			std::io::ErrorKind::NotFound => NOINPUT,
			std::io::ErrorKind::PermissionDenied => CANTCREAT,
			std::io::ErrorKind::AddrInUse => UNAVAILABLE,
			_ => IOERR,
		};
	}
	OSERR
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::Context;

	#[test]
	fn a_tagged_startup_fault_wins_over_everything_else() {
		let err = anyhow::Error::new(StartupFault::SocketInUse).context("binding socket");
		assert_eq!(classify(&err), UNAVAILABLE);
	}

	#[test]
	fn io_error_kind_is_classified_when_untagged() {
		let io_err = std::io::Error::from(std::io::ErrorKind::NotFound);
		let err = anyhow::Error::new(io_err).context("opening file");
		assert_eq!(classify(&err), NOINPUT);
	}

	#[test]
	fn a_listener_exhaustion_fault_maps_to_oserr() {
		let err = anyhow::Error::new(StartupFault::ListenerExhausted).context("accepting connection");
		assert_eq!(classify(&err), OSERR);
	}

	#[test]
	fn an_unrecognised_error_falls_back_to_oserr() {
		let err = anyhow::anyhow!("something unexpected").context("starting up");
		assert_eq!(classify(&err), OSERR);
	}
}
