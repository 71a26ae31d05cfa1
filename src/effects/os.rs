use super::{Effects, ProcessOutput, ProcessSpec, ProcessStatus};
use crate::error::{Error, Result};
use std::fs::{File, Permissions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// [`Effects`] backed by the real filesystem and process table.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEffects;

fn create_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Creates the temporary sibling a write goes through. Temporary files are
/// owner-only by default, so new files get the regular creation mode
/// (subject to the umask).
fn temp_sibling(path: &Path) -> Result<NamedTempFile> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut builder = tempfile::Builder::new();
    builder.prefix(".stencil").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(Permissions::from_mode(0o666));
    }
    Ok(builder.tempfile_in(dir)?)
}

/// Writes `contents` through a temporary sibling and moves it over `path`,
/// keeping `permissions` when the destination already existed.
fn write_atomically(path: &Path, contents: &str, permissions: Option<Permissions>) -> Result<()> {
    let mut temp = temp_sibling(path)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn shell_command(command_line: &str) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(command_line);
        command
    } else {
        let mut command = Command::new("sh");
        command.arg("-c").arg(command_line);
        command
    }
}

fn collect<R: Read + Send + 'static>(stream: Option<R>) -> Option<Receiver<String>> {
    stream.map(|mut stream| {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut buffer = Vec::new();
            if let Err(e) = stream.read_to_end(&mut buffer) {
                log::warn!("Failed to read process output: {e}");
            }
            // The receiver is gone when the run already timed out.
            let _ = sender.send(String::from_utf8_lossy(&buffer).into_owned());
        });
        receiver
    })
}

/// Waits for a reader to reach end of stream. Processes left running in the
/// background keep the pipe open, so the wait is bounded by `deadline`;
/// `None` means the deadline passed first.
fn receive(reader: Option<Receiver<String>>, deadline: Option<Instant>) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };
    let received = match deadline {
        Some(deadline) => reader.recv_timeout(deadline.saturating_duration_since(Instant::now())),
        None => reader.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(output) => Some(output),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

/// Opens a redirection target and hands a duplicate handle to the child.
/// The returned handle is kept by the caller to flush the file afterwards.
fn redirect(target: Option<&Path>) -> Result<(Stdio, Option<File>)> {
    match target {
        Some(path) => {
            create_parent_dirs(path)?;
            let file = File::create(path)?;
            Ok((Stdio::from(file.try_clone()?), Some(file)))
        }
        None => Ok((Stdio::piped(), None)),
    }
}

fn sync(files: &[Option<File>]) -> Result<()> {
    for file in files.iter().flatten() {
        file.sync_all()?;
    }
    Ok(())
}

impl Effects for OsEffects {
    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(path)?)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            entries.push(entry?.path());
        }
        entries.sort();
        Ok(entries)
    }

    fn write_text(&self, path: &Path, contents: &str) -> Result<()> {
        create_parent_dirs(path)?;
        let existing = std::fs::metadata(path).ok().filter(|m| m.is_file());
        write_atomically(path, contents, existing.map(|m| m.permissions()))
    }

    fn replace_text(&self, path: &Path, contents: &str) -> Result<()> {
        let permissions = std::fs::metadata(path)?.permissions();
        write_atomically(path, contents, Some(permissions))
    }

    fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput> {
        let (stdout, stdout_file) = redirect(spec.stdout_to.as_deref())?;
        let (stderr, stderr_file) = redirect(spec.stderr_to.as_deref())?;
        let files = [stdout_file, stderr_file];

        let mut child = shell_command(&spec.command)
            .current_dir(&spec.dir)
            .stdin(if spec.stdin.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(stdout)
            .stderr(stderr)
            .spawn()?;

        let stdout_reader = collect(child.stdout.take());
        let stderr_reader = collect(child.stderr.take());

        if let (Some(mut pipe), Some(input)) = (child.stdin.take(), spec.stdin.clone()) {
            thread::spawn(move || {
                if let Err(e) = pipe.write_all(input.as_bytes()) {
                    if e.kind() == std::io::ErrorKind::BrokenPipe {
                        log::debug!("Process closed stdin before reading all input");
                    } else {
                        log::warn!("Failed to write process stdin: {e}");
                    }
                }
            });
        }

        let timed_out = |limit: Duration| Error::ExecTimeout {
            command: spec.command.clone(),
            seconds: limit.as_secs(),
        };
        let deadline = spec.timeout.map(|limit| Instant::now() + limit);
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if let (Some(deadline), Some(limit)) = (deadline, spec.timeout) {
                if Instant::now() >= deadline {
                    log::warn!("Killing '{}' after {}s", spec.command, limit.as_secs());
                    child.kill()?;
                    child.wait()?;
                    sync(&files)?;
                    return Err(timed_out(limit));
                }
            }
            thread::sleep(POLL_INTERVAL);
        };
        sync(&files)?;

        let stdout = receive(stdout_reader, deadline);
        let stderr = receive(stderr_reader, deadline);
        let (Some(stdout), Some(stderr)) = (stdout, stderr) else {
            log::warn!("'{}' left processes holding its output open", spec.command);
            return Err(timed_out(spec.timeout.unwrap_or_default()));
        };

        Ok(ProcessOutput {
            status: status.code().map_or(ProcessStatus::Terminated, ProcessStatus::Exited),
            stdout,
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn write_text_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/c.txt");
        OsEffects.write_text(&target, "hello").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
        assert_eq!(fs::read_dir(dir.path().join("a/b")).unwrap().count(), 1);
    }

    #[test]
    fn replace_text_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("file.txt");
        fs::write(&target, "old").unwrap();
        OsEffects.replace_text(&target, "new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn new_files_get_the_regular_creation_mode() {
        let dir = tempfile::tempdir().unwrap();
        let generated = dir.path().join("Hello.java");
        let plain = dir.path().join("plain.txt");

        OsEffects.write_text(&generated, "class Hello {}").unwrap();
        fs::write(&plain, "plain").unwrap();

        assert_eq!(mode(&generated), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn overwriting_keeps_the_executable_bit() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("mvnw");
        fs::write(&script, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        OsEffects.write_text(&script, "#!/bin/sh\necho new\n").unwrap();
        assert_eq!(mode(&script), 0o755);

        OsEffects.replace_text(&script, "#!/bin/sh\necho newer\n").unwrap();
        assert_eq!(mode(&script), 0o755);
    }

    #[test]
    fn replace_text_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(OsEffects.replace_text(&dir.path().join("missing"), "x").is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_output_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let output = OsEffects
            .run(&ProcessSpec {
                command: "cat; echo oops >&2; exit 3".to_string(),
                dir: dir.path().to_path_buf(),
                stdin: Some("piped".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(output.status, ProcessStatus::Exited(3));
        assert_eq!(output.stdout, "piped");
        assert_eq!(output.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn run_redirects_into_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("logs/out.txt");
        let output = OsEffects
            .run(&ProcessSpec {
                command: "echo hello".to_string(),
                dir: dir.path().to_path_buf(),
                stdout_to: Some(out.clone()),
                ..Default::default()
            })
            .unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, "");
        assert_eq!(fs::read_to_string(out).unwrap(), "hello\n");
    }

    #[cfg(unix)]
    #[test]
    fn run_kills_process_on_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let result = OsEffects.run(&ProcessSpec {
            command: "echo started; exec sleep 5".to_string(),
            dir: dir.path().to_path_buf(),
            stdout_to: Some(out.clone()),
            timeout: Some(Duration::from_millis(300)),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::ExecTimeout { .. })));
        assert_eq!(fs::read_to_string(out).unwrap(), "started\n");
    }

    #[cfg(unix)]
    #[test]
    fn background_children_cannot_outlast_the_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let started = Instant::now();
        let result = OsEffects.run(&ProcessSpec {
            command: "sleep 4 & echo hi".to_string(),
            dir: dir.path().to_path_buf(),
            timeout: Some(Duration::from_millis(500)),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::ExecTimeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(3), "took {:?}", started.elapsed());
    }
}
