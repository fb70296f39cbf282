use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::env::TargetEnv;
use crate::error::Error;
use crate::lines::{process_lines, split_lines};
use crate::model::{Entry, LoadReport, SubstitutionMode};
use crate::parser::parse_logical_lines;
use crate::repository::Repository;
use crate::store::Store;
use crate::validator::Validator;

/// Load `.env` from the current working directory into the process
/// environment.
///
/// # Safety
///
/// See [`TargetEnv::process`].
pub unsafe fn dotenv() -> Result<LoadReport, Error> {
    unsafe { from_filename(".env") }
}

/// Load a single dotenv file into the process environment.
///
/// # Safety
///
/// See [`TargetEnv::process`].
pub unsafe fn from_path(path: impl AsRef<Path>) -> Result<LoadReport, Error> {
    let mut loader = EnvLoader::new()
        .file(path)
        .repository(unsafe { Repository::process() });
    loader.load()
}

/// Load a dotenv file by name from the current working directory into the
/// process environment.
///
/// # Safety
///
/// See [`TargetEnv::process`].
pub unsafe fn from_filename(name: &str) -> Result<LoadReport, Error> {
    unsafe { from_path(PathBuf::from(name)) }
}

/// Builder-style dotenv loader.
///
/// Every source is parsed completely before anything is written, so a
/// malformed file leaves the repository untouched.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    dirs: Vec<PathBuf>,
    names: Vec<String>,
    files: Vec<PathBuf>,
    content: Option<String>,
    short_circuit: bool,
    substitution_mode: SubstitutionMode,
    override_existing: bool,
    repository: Repository,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse in-memory content instead of reading files.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// Add a directory to search for dotenv files.
    pub fn path(mut self, dir: impl AsRef<Path>) -> Self {
        self.dirs.push(dir.as_ref().to_path_buf());
        self
    }

    pub fn paths<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.dirs
            .extend(dirs.into_iter().map(|dir| dir.as_ref().to_path_buf()));
        self
    }

    /// Add a file name to look for in each directory. Defaults to `.env`.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    pub fn file_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add an exact file path.
    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.files.push(path.as_ref().to_path_buf());
        self
    }

    pub fn files<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.files
            .extend(paths.into_iter().map(|path| path.as_ref().to_path_buf()));
        self
    }

    /// Stop after the first file found (default `true`).
    pub fn short_circuit(mut self, short_circuit: bool) -> Self {
        self.short_circuit = short_circuit;
        self
    }

    pub fn substitution_mode(mut self, substitution_mode: SubstitutionMode) -> Self {
        self.substitution_mode = substitution_mode;
        self
    }

    /// With `false`, names already present in the repository when
    /// [`load`](Self::load) starts are never overwritten (default `true`).
    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn target(self, target: TargetEnv) -> Self {
        self.repository(Repository::builder().with_adapter(target).build())
    }

    pub fn repository(mut self, repository: Repository) -> Self {
        self.repository = repository;
        self
    }

    pub fn repository_ref(&self) -> &Repository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut Repository {
        &mut self.repository
    }

    pub fn into_repository(self) -> Repository {
        self.repository
    }

    /// Parse every source without touching the repository.
    pub fn parse_only(&self) -> Result<Vec<Entry>, Error> {
        let (entries, _) = self.collect_entries()?;
        Ok(entries)
    }

    pub fn load(&mut self) -> Result<LoadReport, Error> {
        let (entries, files_read) = self.collect_entries()?;
        let mut report = LoadReport {
            files_read,
            ..LoadReport::default()
        };

        let mut applied = HashSet::new();
        for entry in entries {
            if !self.override_existing
                && !applied.contains(&entry.name)
                && self.repository.has(&entry.name)
            {
                tracing::debug!(name = %entry.name, "skipping existing variable");
                report.skipped_existing += 1;
                continue;
            }

            let value = match self.substitution_mode {
                SubstitutionMode::Disabled => entry.value,
                SubstitutionMode::Expand => expand_template(&entry.value, |name| {
                    self.repository.get(name)
                }),
            };

            if self.repository.set(&entry.name, &value) {
                tracing::trace!(name = %entry.name, "applied dotenv entry");
                report.loaded += 1;
                applied.insert(entry.name);
            } else {
                tracing::debug!(name = %entry.name, "skipping existing variable");
                report.skipped_existing += 1;
            }
        }

        Ok(report)
    }

    /// Like [`load`](Self::load), but a missing file yields an empty report.
    ///
    /// Parse errors are still returned.
    pub fn safe_load(&mut self) -> Result<LoadReport, Error> {
        match self.load() {
            Err(Error::InvalidPath { paths }) => {
                tracing::debug!(candidates = paths.len(), "no dotenv file found");
                Ok(LoadReport::default())
            }
            other => other,
        }
    }

    /// Check that every name is present, then allow further assertions.
    pub fn required<I, S>(&self, names: I) -> Result<Validator<'_>, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::new(&self.repository, names, true)
    }

    /// Assertions that only apply to names that are present.
    pub fn if_present<I, S>(&self, names: I) -> Validator<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Validator::optional(&self.repository, names)
    }

    fn store(&self) -> Store {
        match &self.content {
            Some(content) => Store::from_string(content.clone()),
            None => Store::from_locations(&self.dirs, &self.names, &self.files, self.short_circuit),
        }
    }

    fn collect_entries(&self) -> Result<(Vec<Entry>, usize), Error> {
        let mut entries = Vec::new();
        let mut files_read = 0usize;

        for source in self.store().read()? {
            if source.path.is_some() {
                files_read += 1;
            }
            let logical = process_lines(split_lines(&source.content));
            let parsed = parse_logical_lines(logical)
                .map_err(|err| err.in_file(source.path.as_deref()))?;
            entries.extend(parsed);
        }

        Ok((entries, files_read))
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            names: Vec::new(),
            files: Vec::new(),
            content: None,
            short_circuit: true,
            substitution_mode: SubstitutionMode::Disabled,
            override_existing: true,
            repository: Repository::memory(),
        }
    }
}

/// Replace `${NAME}` placeholders; unknown names are left as written.
fn expand_template<F>(input: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0usize;
    let mut idx = 0usize;
    let bytes = input.as_bytes();

    while idx < bytes.len() {
        if bytes[idx] != b'$' {
            idx += 1;
            continue;
        }

        let Some((name_start, name_end, token_end)) = parse_placeholder(input, idx) else {
            idx += 1;
            continue;
        };

        out.push_str(&input[cursor..idx]);
        match resolve(&input[name_start..name_end]) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&input[idx..token_end]),
        }

        cursor = token_end;
        idx = token_end;
    }

    out.push_str(&input[cursor..]);
    out
}

fn parse_placeholder(input: &str, start: usize) -> Option<(usize, usize, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(start + 1) != Some(&b'{') {
        return None;
    }

    let name_start = start + 2;
    let len = input[name_start..].find('}')?;
    let name_end = name_start + len;
    let name = &input[name_start..name_end];
    if name.is_empty() || !name.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_') {
        return None;
    }

    Some((name_start, name_end, name_end + 1))
}
