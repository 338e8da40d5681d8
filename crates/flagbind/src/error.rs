//! Error types for parsing and registry construction.

use thiserror::Error;

/// Severity of a [`ParseError`].
///
/// Kinds are totally ordered: when a single pass produces several errors, the
/// one with the highest kind is reported. The discriminants are part of the
/// public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    /// A `required` flag was never supplied.
    MissingRequired = 1,
    /// A number flag received text outside the numeric grammar.
    NotANumber = 2,
    /// A string flag received a value outside its `one_of` set.
    NotOneOf = 3,
    /// `--no-<flag>` was used on a flag that is not invertable.
    NotInvertable = 4,
    /// A boolean flag was given a value.
    UnexpectedArg = 5,
    /// A value-taking flag was given no value.
    MissingArg = 6,
    /// No descriptor matches the flag.
    UnrecognizedFlag = 7,
}

impl ErrorKind {
    pub fn priority(self) -> u8 {
        self as u8
    }
}

/// The single error surfaced by a parse pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    kind: ErrorKind,
    message: String,
}

impl ParseError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn unrecognized(flag: &str) -> Self {
        Self::new(ErrorKind::UnrecognizedFlag, format!("unknown flag: {flag}"))
    }

    pub(crate) fn missing_arg(flag: &str) -> Self {
        Self::new(ErrorKind::MissingArg, format!("missing value for {flag}"))
    }

    pub(crate) fn unexpected_arg(flag: &str) -> Self {
        Self::new(
            ErrorKind::UnexpectedArg,
            format!("flag does not take a value: {flag}"),
        )
    }

    pub(crate) fn not_invertable(flag: &str) -> Self {
        Self::new(
            ErrorKind::NotInvertable,
            format!("flag cannot be inverted: {flag}"),
        )
    }

    pub(crate) fn not_one_of(flag: &str, value: &str, allowed: &str) -> Self {
        Self::new(
            ErrorKind::NotOneOf,
            format!("invalid value '{value}' for '{flag}'. possible values: {allowed}"),
        )
    }

    pub(crate) fn not_a_number(flag: &str, value: &str) -> Self {
        Self::new(
            ErrorKind::NotANumber,
            format!("invalid number '{value}' for '{flag}'"),
        )
    }

    pub(crate) fn missing_required(usage: &str) -> Self {
        Self::new(
            ErrorKind::MissingRequired,
            format!("missing required argument: {usage}"),
        )
    }
}

/// Fold `err` into `best`: only a strictly more severe kind replaces the
/// current error, so ties keep the earliest.
pub(crate) fn merge(best: &mut Option<ParseError>, err: ParseError) {
    if let Some(current) = best.as_ref()
        && err.kind <= current.kind
    {
        tracing::trace!(kept = ?current.kind, dropped = ?err.kind, "error outranked");
        return;
    }
    tracing::trace!(kind = ?err.kind, message = %err.message, "recording error");
    *best = Some(err);
}

/// Problems with a registry definition, reported by [`crate::Registry::validate`]
/// and [`crate::Registry::from_json`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("flag long name cannot be empty")]
    EmptyLong,
    #[error("duplicate long flag: --{0}")]
    DuplicateLong(String),
    #[error("duplicate short flag: -{0}")]
    DuplicateShort(char),
    #[error("flag --{0} cannot be both required and defaulted")]
    RequiredWithDefault(String),
    #[error("invalid flag schema: {0}")]
    Schema(#[from] serde_json::Error),
}
