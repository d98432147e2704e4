//! Boot-time check that child processes can be started at all

use netgate_core::port::{argv, CommandExecutor};
use tracing::{error, info};

/// Run `echo hello`; on failure switch to `uid` and try once more.
///
/// Every outcome is logged. Returns whether the final probe succeeded;
/// the caller carries on either way.
pub async fn ensure_subprocess(executor: &dyn CommandExecutor, uid: Option<u32>) -> bool {
    let probe = argv(["echo", "hello"]);

    match executor.check_output(&probe).await {
        Ok(output) => {
            info!("subprocess echo: {}", output.trim_end());
            return true;
        }
        Err(e) => error!(error = %e, "failed to subprocess echo"),
    }

    match uid {
        Some(uid) => match switch_user(uid) {
            Ok(()) => info!(uid, "switched user"),
            Err(e) => error!(uid, error = %e, "failed to setuid"),
        },
        None => error!("failed to setuid: no uid given"),
    }

    match executor.check_output(&probe).await {
        Ok(output) => {
            info!("setuid subprocess echo: {}", output.trim_end());
            true
        }
        Err(e) => {
            error!(error = %e, "failed to setuid subprocess echo");
            false
        }
    }
}

#[cfg(unix)]
fn switch_user(uid: u32) -> nix::Result<()> {
    nix::unistd::setuid(nix::unistd::Uid::from_raw(uid))
}

#[cfg(not(unix))]
fn switch_user(_uid: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "setuid is unix only",
    ))
}
