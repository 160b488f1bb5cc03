//! Process plumbing shared by the binaries: logging setup and the mapping
//! of errors to sysexits(3) style exit codes.

use std::{error::Error, io, process::ExitCode};

use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;
use log::SetLoggerError;

pub const EX_OK: u8 = 0;
pub const EX_NOINPUT: u8 = 66;
pub const EX_SOFTWARE: u8 = 70;
pub const EX_NOPERM: u8 = 77;

/// Initialises `env_logger` (`RUST_LOG`, default `info`) behind a bridge
/// that keeps log lines from tearing the returned progress bars.
pub fn init_logging() -> Result<MultiProgress, SetLoggerError> {
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    let logger = env_logger::Builder::from_env(env).build();
    let level = logger.filter();

    let multi_progress = MultiProgress::new();
    LogWrapper::new(multi_progress.clone(), logger).try_init()?;
    log::set_max_level(level);

    Ok(multi_progress)
}

fn io_cause<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a io::Error> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err);
        }
        current = e.source();
    }
    None
}

pub fn exit_code(err: &(dyn Error + 'static)) -> u8 {
    match io_cause(err).map(io::Error::kind) {
        Some(io::ErrorKind::NotFound | io::ErrorKind::IsADirectory) => EX_NOINPUT,
        Some(io::ErrorKind::PermissionDenied) => EX_NOPERM,
        _ => EX_SOFTWARE,
    }
}

/// Writes `err` to stderr (with its whole source chain unless it is a
/// plain input access problem) and returns the matching exit code.
pub fn report(err: &(dyn Error + 'static)) -> ExitCode {
    let code = exit_code(err);
    eprintln!("error: {err}");
    if code == EX_SOFTWARE {
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    }
    ExitCode::from(code)
}
