use std::io::BufRead;

use crate::error::{Error, ParseError, ParseErrorKind};
use crate::lines::{process_lines, split_lines};
use crate::model::{Entry, LogicalLine};

/// Parse dotenv entries from UTF-8 text.
///
/// The first malformed line aborts the whole parse.
pub fn parse_str(input: &str) -> Result<Vec<Entry>, Error> {
    parse_logical_lines(process_lines(split_lines(input))).map_err(Error::from)
}

/// Parse dotenv entries from UTF-8 bytes.
pub fn parse_bytes(input: &[u8]) -> Result<Vec<Entry>, Error> {
    let text = std::str::from_utf8(input)?;
    parse_str(text)
}

/// Parse dotenv entries from a buffered reader.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<Vec<Entry>, Error> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    parse_bytes(&buf)
}

pub(crate) fn parse_logical_lines(lines: Vec<LogicalLine>) -> Result<Vec<Entry>, ParseError> {
    lines
        .into_iter()
        .map(|logical| parse_entry(&logical.text).map_err(|err| err.at_line(logical.line)))
        .collect()
}

/// Parse one logical assignment line into an [`Entry`].
///
/// ```
/// let entry = dotenv_lines::parse_entry("export FOO=\"bar baz\"").unwrap();
/// assert_eq!(entry.name, "FOO");
/// assert_eq!(entry.value, "bar baz");
/// ```
pub fn parse_entry(line: &str) -> Result<Entry, ParseError> {
    let (name, value) = split_parts(line)?;
    let name = parse_name(name)?;
    let value = parse_value(value)?;
    Ok(Entry::new(name, value))
}

fn split_parts(line: &str) -> Result<(&str, &str), ParseError> {
    let Some((name, value)) = line.split_once('=') else {
        return Err(ParseError::new(ParseErrorKind::InvalidName, line.trim()));
    };

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::new(ParseErrorKind::StrayEquals, line));
    }

    Ok((name, value.trim()))
}

fn parse_name(name: &str) -> Result<&str, ParseError> {
    let mut name = name;
    if let Some(rest) = name.strip_prefix("export")
        && rest.starts_with(char::is_whitespace)
    {
        name = rest.trim_start();
    }

    if !is_valid_name(name) {
        return Err(ParseError::new(ParseErrorKind::InvalidName, name));
    }
    Ok(name)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn parse_value(input: &str) -> Result<String, ParseError> {
    if input.starts_with('"') {
        return parse_double_quoted(input);
    }
    if input.starts_with('\'') {
        return parse_single_quoted(input);
    }
    parse_unquoted(input)
}

fn parse_double_quoted(input: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(input.len().saturating_sub(2));
    let mut escaped = false;

    for ch in input.chars().skip(1) {
        if escaped {
            match ch {
                '"' | '\\' => out.push(ch),
                _ => {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedEscapeSequence,
                        input,
                    ));
                }
            }
            escaped = false;
            continue;
        }

        match ch {
            '\\' => escaped = true,
            // anything after the closing quote is trailing comment text
            '"' => return Ok(out),
            _ => out.push(ch),
        }
    }

    Err(ParseError::new(ParseErrorKind::MissingClosingQuote, input))
}

fn parse_single_quoted(input: &str) -> Result<String, ParseError> {
    let inner = &input[1..];
    match inner.find('\'') {
        Some(end) => Ok(inner[..end].to_owned()),
        None => Err(ParseError::new(ParseErrorKind::MissingClosingQuote, input)),
    }
}

fn parse_unquoted(input: &str) -> Result<String, ParseError> {
    let mut out = String::with_capacity(input.len());
    let mut after_space = false;

    for ch in input.chars() {
        if ch == '#' {
            break;
        }
        if ch.is_whitespace() {
            after_space = true;
            continue;
        }
        if after_space {
            return Err(ParseError::new(ParseErrorKind::InvalidSpaces, input));
        }
        out.push(ch);
    }

    Ok(out)
}
