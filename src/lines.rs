use std::borrow::Cow;

use crate::model::LogicalLine;

/// Split text into raw lines, treating `\r\n` and lone `\r` as `\n`.
///
/// Blank lines are kept: inside a multi-line value they are data.
pub fn split_lines(input: &str) -> Vec<String> {
    let normalized = normalize_newlines(input);
    let mut lines: Vec<String> = normalized.split('\n').map(str::to_owned).collect();
    if normalized.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Reassemble raw lines into logical assignment lines.
///
/// Lines belonging to one multi-line double-quoted value are joined with
/// `\n`. Comments and lines without `=` are dropped. A value still open when
/// the input ends is discarded.
pub fn process_lines<I, S>(lines: I) -> Vec<LogicalLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut output = Vec::new();
    let mut state = Continuation::default();

    for (idx, raw) in lines.into_iter().enumerate() {
        let line_num = idx as u32 + 1;
        let Some(candidate) = state.feed(raw.as_ref(), line_num) else {
            continue;
        };

        if !is_comment(&candidate.text) && is_setter(&candidate.text) {
            output.push(candidate);
        }
    }

    if let Some(start) = state.start_line {
        tracing::debug!(
            line = start,
            buffered = state.buffer.len(),
            "dropping unterminated multi-line value"
        );
    }

    output
}

#[derive(Debug, Default)]
struct Continuation {
    buffer: Vec<String>,
    start_line: Option<u32>,
}

impl Continuation {
    fn feed(&mut self, raw: &str, line_num: u32) -> Option<LogicalLine> {
        let mut started = false;
        if self.start_line.is_none() {
            if !looks_like_multiline_start(raw) {
                return Some(LogicalLine {
                    text: raw.to_owned(),
                    line: line_num,
                });
            }
            started = true;
            self.start_line = Some(line_num);
        }

        self.buffer.push(raw.to_owned());
        if !looks_like_multiline_stop(raw, started) {
            return None;
        }

        let line = self.start_line.take().unwrap_or(line_num);
        let text = std::mem::take(&mut self.buffer).join("\n");
        Some(LogicalLine { text, line })
    }
}

fn looks_like_multiline_start(line: &str) -> bool {
    line.contains("=\"") && !looks_like_multiline_stop(line, true)
}

fn looks_like_multiline_stop(line: &str, started: bool) -> bool {
    if line == "\"" {
        return true;
    }

    let stripped = line.replace("\\\\", "");
    let chars: Vec<char> = stripped.chars().collect();
    let closing = chars
        .windows(2)
        .filter(|pair| pair[0] != '\\' && pair[1] == '"')
        .count();

    let seen = if started { 0 } else { 1 };
    seen + closing > 1
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn is_setter(line: &str) -> bool {
    line.contains('=')
}

pub(crate) fn normalize_newlines(input: &str) -> Cow<'_, str> {
    if !input.contains('\r') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            continue;
        }
        out.push(ch);
    }

    Cow::Owned(out)
}
