use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::Error;

const DEFAULT_FILE_NAME: &str = ".env";

/// Where dotenv content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Store {
    /// Candidate files, read in order.
    Files {
        files: Vec<PathBuf>,
        short_circuit: bool,
    },
    /// Content that is already in memory.
    Text(String),
}

/// Raw content of one source, kept apart so multi-line values never span files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: Option<PathBuf>,
    pub content: String,
}

impl Store {
    pub fn from_string(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Cross every directory with every file name, then append explicit files.
    ///
    /// With no directories the current directory is searched, unless only
    /// explicit files were given. With no names `.env` is used.
    pub fn from_locations(
        dirs: &[PathBuf],
        names: &[String],
        files: &[PathBuf],
        short_circuit: bool,
    ) -> Self {
        let default_dirs = [PathBuf::from(".")];
        let dirs = if dirs.is_empty() && (files.is_empty() || !names.is_empty()) {
            &default_dirs[..]
        } else {
            dirs
        };
        let default_names = [DEFAULT_FILE_NAME.to_owned()];
        let names = if names.is_empty() {
            &default_names[..]
        } else {
            names
        };

        let mut candidates: Vec<PathBuf> = dirs
            .iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .collect();
        candidates.extend(files.iter().cloned());

        Self::Files {
            files: candidates,
            short_circuit,
        }
    }

    /// Read every available source.
    ///
    /// Missing files are skipped; if nothing at all could be read the error is
    /// [`Error::InvalidPath`].
    pub fn read(&self) -> Result<Vec<Source>, Error> {
        match self {
            Self::Text(content) => Ok(vec![Source {
                path: None,
                content: content.clone(),
            }]),
            Self::Files {
                files,
                short_circuit,
            } => read_files(files, *short_circuit),
        }
    }
}

fn read_files(files: &[PathBuf], short_circuit: bool) -> Result<Vec<Source>, Error> {
    let mut sources = Vec::new();

    for path in files {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "dotenv file not found");
                continue;
            }
            Err(err) => return Err(Error::Io(err)),
        };

        let content = String::from_utf8(bytes).map_err(|err| err.utf8_error())?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "read dotenv file");
        sources.push(Source {
            path: Some(path.clone()),
            content,
        });

        if short_circuit {
            break;
        }
    }

    if sources.is_empty() {
        return Err(Error::InvalidPath {
            paths: files.to_vec(),
        });
    }

    Ok(sources)
}
