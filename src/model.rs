/// A parsed `NAME=value` entry.
///
/// Entries keep file order and are not deduplicated; a later entry with the
/// same name simply wins when applied to a [`Repository`](crate::Repository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub value: String,
}

impl Entry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// One complete assignment statement produced by line reassembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub text: String,
    /// 1-based number of the first raw line this statement came from.
    pub line: u32,
}

/// Summary of the load operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_existing: usize,
    pub files_read: usize,
}

/// Variable expansion behavior for loader values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubstitutionMode {
    /// Keep values as parsed with no expansion.
    #[default]
    Disabled,
    /// Expand `${VAR}` placeholders from the repository.
    Expand,
}
