//! Escalade d'une URL vers le handler par défaut du système.
//!
//! Chaque plateforme a sa commande "ouvrir avec" :
//!
//! - Linux/BSD : `xdg-open <url>`
//! - macOS : `open <url>`
//! - Windows : `rundll32 url.dll,FileProtocolHandler <url>`
//!
//! L'URL vient de la page : elle est toujours passée comme argument unique,
//! jamais interprétée par un shell (pas de `cmd /C start`, qui réinterprète
//! `&`, `|`, `^` et `%VAR%`).
//!
//! Seul l'échec du *lancement* est remonté. Le processus enfant est attendu
//! sur un thread à part pour ne pas laisser de zombie.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use tracing::{debug, trace};

use crate::error::DispatchError;
use crate::navigation::ExternalDispatcher;

/// [`ExternalDispatcher`] branché sur l'opener de la plateforme, ou sur une
/// commande configurée.
#[derive(Debug, Clone, Default)]
pub struct SystemDispatcher {
    opener: Option<String>,
}

impl SystemDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remplace l'opener de la plateforme par `opener`, qui reçoit l'URL comme
    /// seul argument. Une chaîne vide garde l'opener par défaut.
    pub fn with_opener(opener: impl Into<String>) -> Self {
        let opener = opener.into();
        Self {
            opener: (!opener.trim().is_empty()).then_some(opener),
        }
    }

    fn command_for(&self, url: &str) -> Command {
        if let Some(ref opener) = self.opener {
            let mut command = Command::new(opener);
            command.arg(url);
            return command;
        }
        platform_command(url)
    }
}

#[cfg(target_os = "windows")]
fn platform_command(url: &str) -> Command {
    let mut command = Command::new("rundll32");
    command.args(["url.dll,FileProtocolHandler", url]);
    command
}

#[cfg(target_os = "macos")]
fn platform_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}

/// Lance `command` et confie l'attente de l'enfant à un thread dédié.
fn spawn_reaped(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(reap(child))
}

fn reap(mut child: Child) -> JoinHandle<io::Result<ExitStatus>> {
    thread::spawn(move || {
        let status = child.wait();
        trace!(pid = child.id(), ?status, "External handler exited");
        status
    })
}

impl ExternalDispatcher for SystemDispatcher {
    fn dispatch(&self, url: &str) -> Result<(), DispatchError> {
        let command = self.command_for(url);
        debug!(url, program = ?command.get_program(), "Launching external handler");

        spawn_reaped(command)
            .map(drop)
            .map_err(|source| DispatchError::Launch {
                url: url.to_owned(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_opener_keeps_platform_default() {
        assert!(SystemDispatcher::with_opener("  ").opener.is_none());
        assert_eq!(
            SystemDispatcher::with_opener("my-opener").opener.as_deref(),
            Some("my-opener")
        );
    }

    #[test]
    fn test_configured_opener_receives_url() {
        let dispatcher = SystemDispatcher::with_opener("my-opener");
        let command = dispatcher.command_for("file:///tmp/a.pdf");
        assert_eq!(command.get_program(), "my-opener");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["file:///tmp/a.pdf"]);
    }

    #[test]
    fn test_shell_metacharacters_stay_in_one_argument() {
        let url = "file:///C:/doc.pdf&calc.exe|x^y%PATH%";
        let command = SystemDispatcher::new().command_for(url);
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args.last().copied(), Some(std::ffi::OsStr::new(url)));
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn test_platform_opener_is_xdg_open() {
        let command = SystemDispatcher::new().command_for("file:///tmp/a.pdf");
        assert_eq!(command.get_program(), "xdg-open");
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_platform_opener_bypasses_cmd() {
        let command = SystemDispatcher::new().command_for("file:///C:/doc.pdf&calc.exe");
        assert_ne!(command.get_program(), "cmd");
        assert_eq!(command.get_program(), "rundll32");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["url.dll,FileProtocolHandler", "file:///C:/doc.pdf&calc.exe"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_launched_handler_is_waited_for() {
        let reaper = spawn_reaped(Command::new("true")).unwrap();
        let status = reaper.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_dispatch_with_configured_opener_succeeds() {
        let dispatcher = SystemDispatcher::with_opener("true");
        assert!(dispatcher.dispatch("file:///tmp/a.pdf").is_ok());
    }

    #[test]
    fn test_missing_opener_reports_launch_error() {
        let dispatcher = SystemDispatcher::with_opener("/nonexistent/hostview-opener");
        let err = dispatcher.dispatch("file:///tmp/a.pdf").unwrap_err();
        match err {
            DispatchError::Launch { url, .. } => assert_eq!(url, "file:///tmp/a.pdf"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
