//! Source normalizer.
//!
//! Strips whole-line comments and blank lines before lexing, trims trailing
//! whitespace per line, and keeps a map from normalized byte offsets back to
//! original line numbers so diagnostics match the user's view of the file.

const TRAILING_WHITESPACE: &[char] = &[' ', '\t', '\x0C', '\x0B', '\r', '\n'];

/// Maps offsets in the normalized text back to original source positions.
pub struct SourceMap {
    /// Kept lines, each ending with a single `\n`.
    lines: Vec<String>,
    /// Number of discarded source lines preceding each kept line.
    discarded_before: Vec<usize>,
}

/// A normalized byte offset resolved against the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved<'a> {
    /// 1-based line number in the original text.
    pub line: usize,
    /// 0-based column within the normalized line.
    pub column: usize,
    /// The normalized line text, trailing `\n` included.
    pub text: &'a str,
}

/// Normalizes raw program text line by line: lines whose first two non-blank
/// characters are `//` and lines without a graphic character are dropped,
/// everything else keeps its leading tabs and loses trailing whitespace.
pub fn normalize(raw: &str) -> (String, SourceMap) {
    let mut clean = String::new();
    let mut lines = Vec::new();
    let mut discarded_before = Vec::new();
    let mut discarded = 0;

    for line in raw.split('\n') {
        if line.trim_start().starts_with("//") {
            discarded += 1;
            continue;
        }
        if !line.chars().any(|c| c.is_ascii_graphic()) {
            discarded += 1;
            continue;
        }
        let mut kept = line.trim_end_matches(TRAILING_WHITESPACE).to_string();
        kept.push('\n');
        clean.push_str(&kept);
        lines.push(kept);
        discarded_before.push(discarded);
    }

    (
        clean,
        SourceMap {
            lines,
            discarded_before,
        },
    )
}

impl SourceMap {
    /// Resolves a byte offset into the normalized text. End-of-line offsets
    /// clamp to the last column of their line; past-end offsets clamp to the
    /// last line. Returns `None` only when every input line was discarded.
    pub fn resolve(&self, offset: usize) -> Option<Resolved<'_>> {
        let last = self.lines.len().checked_sub(1)?;

        let mut consumed = 0;
        let mut index = self.lines.len();
        let mut column = 0;
        for (i, line) in self.lines.iter().enumerate() {
            if consumed + line.len() <= offset {
                consumed += line.len();
            } else {
                index = i;
                column = offset - consumed;
                break;
            }
        }

        if index > last {
            index = last;
            column = self.lines[last].len() - 1;
        } else if column >= self.lines[index].len() {
            column = self.lines[index].len() - 1;
        }

        Some(Resolved {
            line: index + self.discarded_before[index] + 1,
            column,
            text: &self.lines[index],
        })
    }

    /// Renders the line containing `offset` with a caret under the offending
    /// column, tabs replaced by spaces so the caret lines up.
    pub fn annotate(&self, offset: usize) -> String {
        let Some(resolved) = self.resolve(offset) else {
            return String::new();
        };
        let mut out = format!("Line: {}\n", resolved.line);
        out.push_str(&resolved.text.replace('\t', " "));
        for _ in 0..resolved.column {
            out.push(' ');
        }
        out.push('^');
        out
    }
}
