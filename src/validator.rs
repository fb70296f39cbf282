//! Assertions over variables that have already been loaded.

use regex::Regex;

use crate::error::{Error, ValidationError};
use crate::repository::Repository;

const BOOLEAN_WORDS: [&str; 8] = ["true", "false", "on", "off", "yes", "no", "1", "0"];

/// Checks a fixed set of names against a [`Repository`].
///
/// Names that are absent are skipped by every assertion; use
/// [`Validator::new`] with `required = true` to reject them up front.
#[derive(Debug, Clone)]
pub struct Validator<'a> {
    repository: &'a Repository,
    names: Vec<String>,
}

impl<'a> Validator<'a> {
    pub fn new<I, S>(repository: &'a Repository, names: I, required: bool) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let validator = Self::optional(repository, names);
        if !required {
            return Ok(validator);
        }

        let failures = validator
            .names
            .iter()
            .filter(|name| !repository.has(name))
            .map(|name| format!("{name} is missing"))
            .collect();
        fail_if_any(failures)?;
        Ok(validator)
    }

    pub fn optional<I, S>(repository: &'a Repository, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            repository,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_empty(self) -> Result<Self, Error> {
        self.assert_each("is empty", |value| !value.trim().is_empty())
    }

    pub fn is_integer(self) -> Result<Self, Error> {
        self.assert_each("is not an integer", |value| {
            value.trim().parse::<i64>().is_ok()
        })
    }

    /// Accepts `true/false`, `on/off`, `yes/no` and `1/0`, ignoring case.
    pub fn is_boolean(self) -> Result<Self, Error> {
        self.assert_each("is not a boolean", |value| {
            let value = value.trim();
            BOOLEAN_WORDS
                .iter()
                .any(|word| word.eq_ignore_ascii_case(value))
        })
    }

    pub fn allowed_values(self, choices: &[&str]) -> Result<Self, Error> {
        let failure = format!("is not one of [{}]", choices.join(", "));
        self.assert_each(&failure, |value| choices.contains(&value))
    }

    pub fn allowed_regex_values(self, pattern: &str) -> Result<Self, Error> {
        let regex = Regex::new(pattern).map_err(|err| ValidationError {
            failures: vec![format!("invalid pattern \"{pattern}\": {err}")],
        })?;
        let failure = format!("does not match \"{pattern}\"");
        self.assert_each(&failure, |value| regex.is_match(value))
    }

    fn assert_each<F>(self, failure: &str, check: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> bool,
    {
        let failures = self
            .names
            .iter()
            .filter_map(|name| {
                let value = self.repository.get(name)?;
                (!check(&value)).then(|| format!("{name} {failure}"))
            })
            .collect();
        fail_if_any(failures)?;
        Ok(self)
    }
}

fn fail_if_any(failures: Vec<String>) -> Result<(), Error> {
    if failures.is_empty() {
        return Ok(());
    }
    Err(ValidationError { failures }.into())
}
