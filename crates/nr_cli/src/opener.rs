use nr_app::Opener;
use nr_core::Result;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Hands links to the desktop's default browser.
/// Needs a running tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

fn command_for(url: &str) -> Command {
    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(url);
        command
    }
    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        command
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(url);
        command
    }
}

/// Spawn the launcher and wait on it from a task so it never lingers as a
/// zombie. The handle resolves to the exit status.
fn launch(mut command: Command, url: &str) -> Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let url = url.to_string();
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                if status.success() {
                    debug!(%url, "Link launcher exited");
                } else {
                    warn!(%url, %status, "Link launcher failed");
                }
                Some(status)
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to wait for link launcher");
                None
            }
        }
    }))
}

impl Opener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        info!(%url, "Opening link");
        launch(command_for(url), url)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_launcher_is_waited_on() {
        let handle = launch(Command::new("true"), "https://news.example/1").unwrap();
        let status = handle.await.unwrap();
        assert!(status.map_or(false, |s| s.success()));
    }

    #[tokio::test]
    async fn test_failed_launcher_still_reaped() {
        let handle = launch(Command::new("false"), "https://news.example/1").unwrap();
        let status = handle.await.unwrap();
        assert!(matches!(status, Some(s) if !s.success()));
    }

    #[tokio::test]
    async fn test_missing_launcher_is_an_error() {
        assert!(launch(Command::new("nr-no-such-launcher"), "https://news.example/1").is_err());
    }
}
