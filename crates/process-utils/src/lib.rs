//! Child-process helpers shared across the workspace.
//!
//! Two concerns live here: keeping console windows from flashing up on
//! Windows when a helper binary is spawned, and spawning fully detached
//! children (media players must outlive the process that started them).

use std::ffi::OsStr;
use std::io;
use std::process::{Child, Stdio};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;
#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Apply the Windows `CREATE_NO_WINDOW` flag to child processes.
///
/// On non-Windows targets this is a no-op.
pub trait NoWindowExt {
    fn no_window(&mut self);
}

impl NoWindowExt for std::process::Command {
    fn no_window(&mut self) {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            self.creation_flags(CREATE_NO_WINDOW);
        }
    }
}

/// Create a `std::process::Command` with `CREATE_NO_WINDOW` applied on Windows.
pub fn std_command(program: impl AsRef<OsStr>) -> std::process::Command {
    let mut cmd = std::process::Command::new(program);
    cmd.no_window();
    cmd
}

#[cfg(feature = "tokio")]
impl NoWindowExt for tokio::process::Command {
    fn no_window(&mut self) {
        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            self.as_std_mut().creation_flags(CREATE_NO_WINDOW);
        }
    }
}

/// Create a `tokio::process::Command` with `CREATE_NO_WINDOW` applied on Windows.
#[cfg(feature = "tokio")]
pub fn tokio_command(program: impl AsRef<OsStr>) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new(program);
    cmd.no_window();
    cmd
}

/// Spawn an argument vector as a detached child process.
///
/// The child is placed in its own process group (session leader on Unix,
/// `DETACHED_PROCESS` on Windows) so it survives the parent exiting, and all
/// three stdio streams are redirected to the null sink. Stdio must never be a
/// capturing pipe here: a pipe nobody drains will eventually block the child.
///
/// The first element of `argv` is the program; the rest are its arguments.
pub fn spawn_detached(argv: &[String]) -> io::Result<Child> {
    let (program, args) = argv.split_first().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector")
    })?;

    let mut cmd = std::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Zero puts the child into a fresh process group, detaching it from
        // the parent's controlling job.
        cmd.process_group(0);
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
    }

    cmd.spawn()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_detached_empty_argv() {
        let err = spawn_detached(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_spawn_detached_missing_binary() {
        let argv = vec!["definitely-not-a-real-binary-7f3a".to_string()];
        assert!(spawn_detached(&argv).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_detached_runs() {
        let argv = vec!["true".to_string()];
        let child = spawn_detached(&argv).expect("spawn `true`");
        assert!(child.id() > 0);
    }
}
