//! Fire-and-forget launching of `b<n>press` commands.

use std::process::{Command, Stdio};

/// Launches button-press commands.
pub trait Spawner {
    /// Start `command` detached from the bar. Never blocks on the child.
    fn spawn(&mut self, command: &str);
}

/// Runs commands through `<shell> -c`.
pub struct ShellSpawner {
    shell: String,
}

impl ShellSpawner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Spawner for ShellSpawner {
    fn spawn(&mut self, command: &str) {
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match child {
            Ok(mut child) => {
                log::debug!("spawned pid {}: {command}", child.id());
                // Reaper; the event loop never waits on a child.
                std::thread::spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        log::debug!("command exited with {status}");
                    },
                    Ok(_) => {},
                    Err(e) => log::warn!("failed to wait for child: {e}"),
                });
            },
            Err(e) => log::warn!("failed to spawn {command:?} via {}: {e}", self.shell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn shell_is_kept() {
        assert_eq!(ShellSpawner::new("/bin/sh").shell(), "/bin/sh");
    }

    #[test]
    fn runs_command_detached() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("pressed");
        let mut spawner = ShellSpawner::new("/bin/sh");
        spawner.spawn(&format!("echo hi > '{}'", marker.display()));

        let deadline = Instant::now() + Duration::from_secs(5);
        while !marker.exists() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(marker.exists());
    }

    #[test]
    fn missing_shell_does_not_panic() {
        let mut spawner = ShellSpawner::new("/nonexistent/shell");
        spawner.spawn("true");
    }
}
