//! Token classification.

/// What a raw argument looks like before any registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    /// `--name`, `--name=value`, `--no-name`
    Long,
    /// `-a`, `-abc`, `-ovalue`
    Short,
    Positional,
    /// The bare `--` separator.
    EndMarker,
}

/// Classify `token`. Once `force_end` is set (after `--`), everything is
/// positional.
pub fn classify(token: &str, force_end: bool) -> TokenClass {
    if force_end {
        TokenClass::Positional
    } else if token == "--" {
        TokenClass::EndMarker
    } else if token.starts_with("--") {
        TokenClass::Long
    } else if token.starts_with('-') {
        TokenClass::Short
    } else {
        TokenClass::Positional
    }
}
