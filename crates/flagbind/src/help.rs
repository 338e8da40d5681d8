//! Aligned usage text for a registry.
//!
//! Each flag renders as one line: the flag names padded to a fixed column,
//! then the description. Names that reach the column push the description
//! onto the next line.

use std::borrow::Cow;

use crate::registry::{Entry, Flag, FlagKind, Registry};
use crate::stringify::Stringify;

/// Column where descriptions start, counted from the start of the line
/// including the prefix.
pub const DESCRIPTION_COLUMN: usize = 26;

/// Text placed in front of every non-blank help line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    Text(String),
    /// That many spaces.
    Columns(usize),
}

impl Default for Prefix {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for Prefix {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Prefix {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<usize> for Prefix {
    fn from(columns: usize) -> Self {
        Self::Columns(columns)
    }
}

impl Prefix {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Columns(n) => Cow::Owned(" ".repeat(*n)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HelpOptions {
    pub prefix: Prefix,
    /// Emit headers as a blank line followed by the header, without the
    /// trailing blank line.
    pub compact_headers: bool,
}

/// Render every registry entry in declaration order.
pub fn render(registry: &Registry, options: &HelpOptions) -> String {
    let prefix = options.prefix.text();
    let indent = continuation_indent(&prefix);

    let mut out = String::new();
    for entry in registry.entries() {
        match entry {
            Entry::Header(text) => {
                out.push('\n');
                out.push_str(&format!("{prefix}{text}\n"));
                if !options.compact_headers {
                    out.push('\n');
                }
            }
            Entry::Flag(flag) => render_flag(flag, &prefix, &indent, &mut out),
        }
    }
    out
}

fn continuation_indent(prefix: &str) -> String {
    let pad = DESCRIPTION_COLUMN.saturating_sub(prefix.chars().count());
    format!("{prefix}{}", " ".repeat(pad))
}

fn render_flag(flag: &Flag, prefix: &str, indent: &str, out: &mut String) {
    let mut line = prefix.to_string();
    if let Some(short) = flag.short() {
        line.push_str(&format!("-{short}, "));
    }
    line.push_str(&format!("--{}", flag.long()));
    if let Some(name) = flag.arg_name() {
        if flag.has_arg_optional() {
            line.push_str(&format!("[=<{name}>]"));
        } else {
            line.push_str(&format!(" <{name}>"));
        }
    }

    let width = line.chars().count();
    if width >= DESCRIPTION_COLUMN {
        line.push('\n');
        line.push_str(indent);
    } else {
        line.push_str(&" ".repeat(DESCRIPTION_COLUMN - width));
    }
    line.push_str(flag.description());

    if let FlagKind::String(s) = flag.kind()
        && let Some(modes) = s.one_of()
    {
        let label = if s.arg_optional().is_some() {
            "Optional modes"
        } else {
            "Modes"
        };
        line.push_str(&format!("\n{indent}{label}: {}", modes.stringify()));
    }

    if let Some(default) = flag.display_default() {
        line.push_str(&format!(" (Default: {default})"));
    }

    out.push_str(&line);
    out.push('\n');
}
