//! Input sources and the ncdu viewer
//!
//! Thin wrappers around the outside world: where listing lines come from
//! (a dump file, stdin, or `borg list --json-lines`), and launching ncdu on
//! the finished document.

use crate::error::SourceError;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};

/// Where the listing comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Read from standard input (`-`)
    Stdin,
    /// Pre-generated `borg list --json-lines` output
    Dump(PathBuf),
    /// `REPO::ARCHIVE`, listed by running borg
    Archive(String),
}

impl InputSource {
    /// Classify a command line argument.
    ///
    /// `-` is stdin, anything containing `::` is an archive, otherwise the
    /// argument must name an existing file.
    pub fn detect(arg: &str) -> Result<Self, SourceError> {
        if arg == "-" {
            Ok(InputSource::Stdin)
        } else if arg.contains("::") {
            Ok(InputSource::Archive(arg.to_string()))
        } else if Path::new(arg).is_file() {
            Ok(InputSource::Dump(PathBuf::from(arg)))
        } else {
            Err(SourceError::NotFound(arg.to_string()))
        }
    }

    /// Open the source for reading.
    pub fn open(&self, borg_command: &str) -> Result<Listing, SourceError> {
        match self {
            InputSource::Stdin => Ok(Listing::Stdin(io::stdin().lock())),
            InputSource::Dump(path) => {
                info!(path = %path.display(), "Reading listing dump");
                let file = File::open(path).map_err(|source| SourceError::Open {
                    path: path.display().to_string(),
                    source,
                })?;
                Ok(Listing::Dump(BufReader::new(file)))
            }
            InputSource::Archive(archive) => {
                Ok(Listing::Borg(BorgListing::spawn(borg_command, archive)?))
            }
        }
    }
}

/// An open listing; reads like any other [`BufRead`]
pub enum Listing {
    Stdin(io::StdinLock<'static>),
    Dump(BufReader<File>),
    Borg(BorgListing),
}

impl Listing {
    /// Check how the producer ended. Only meaningful for borg, whose exit
    /// status must be checked once its output has been consumed.
    pub fn finish(self) -> Result<(), SourceError> {
        match self {
            Listing::Borg(borg) => borg.finish(),
            _ => Ok(()),
        }
    }
}

impl Read for Listing {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Listing::Stdin(r) => r.read(buf),
            Listing::Dump(r) => r.read(buf),
            Listing::Borg(r) => r.stdout.read(buf),
        }
    }
}

impl BufRead for Listing {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        match self {
            Listing::Stdin(r) => r.fill_buf(),
            Listing::Dump(r) => r.fill_buf(),
            Listing::Borg(r) => r.stdout.fill_buf(),
        }
    }

    fn consume(&mut self, amt: usize) {
        match self {
            Listing::Stdin(r) => r.consume(amt),
            Listing::Dump(r) => r.consume(amt),
            Listing::Borg(r) => r.stdout.consume(amt),
        }
    }
}

/// A running `borg list --json-lines` process
///
/// The child is killed if the listing is dropped before [`finish`](Self::finish).
pub struct BorgListing {
    command: String,
    child: Option<Child>,
    stdout: BufReader<ChildStdout>,
}

impl BorgListing {
    pub fn spawn(borg_command: &str, archive: &str) -> Result<Self, SourceError> {
        let command = format!("{} list --json-lines {}", borg_command, archive);
        info!(command = %command, "Listing archive");
        let mut child = Command::new(borg_command)
            .args(["list", "--json-lines", archive])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|source| SourceError::Spawn {
                command: command.clone(),
                source,
            })?;
        let stdout = child.stdout.take().ok_or_else(|| SourceError::Spawn {
            command: command.clone(),
            source: io::Error::new(io::ErrorKind::BrokenPipe, "child stdout not captured"),
        })?;
        Ok(Self {
            command,
            child: Some(child),
            stdout: BufReader::new(stdout),
        })
    }

    /// Wait for borg and fail on a non-zero exit status.
    pub fn finish(mut self) -> Result<(), SourceError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        let status = child.wait().map_err(|source| SourceError::Spawn {
            command: self.command.clone(),
            source,
        })?;
        debug!(%status, "borg exited");
        if status.success() {
            Ok(())
        } else {
            Err(SourceError::ExitStatus {
                command: self.command.clone(),
                status: status.to_string(),
            })
        }
    }
}

impl Drop for BorgListing {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!(error = %e, "borg already exited");
            }
            let _ = child.wait();
        }
    }
}

/// Open `document_path` in ncdu and wait for the viewer to exit.
pub fn open_in_ncdu(ncdu_command: &str, document_path: &Path) -> Result<(), SourceError> {
    let command = format!("{} -f {}", ncdu_command, document_path.display());
    info!(command = %command, "Opening ncdu");
    let status = Command::new(ncdu_command)
        .arg("-f")
        .arg(document_path)
        .status()
        .map_err(|source| SourceError::Spawn {
            command: command.clone(),
            source,
        })?;
    if !status.success() {
        warn!(%status, "ncdu exited unsuccessfully");
        return Err(SourceError::ExitStatus {
            command,
            status: status.to_string(),
        });
    }
    Ok(())
}
