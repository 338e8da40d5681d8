//! Binding raw argument text to a flag's value slot.

use crate::error::ParseError;
use crate::number::parse_number;
use crate::registry::{Flag, FlagKind};
use crate::stringify::Stringify;

/// Convert `raw` for `flag` and store it. `display` is how the flag was
/// spelled on the command line (`--name` or `-n`) and is used in messages.
///
/// A number flag always stores the conversion result, so an invalid value
/// still overwrites any earlier one (as `NaN`). Booleans never take a value
/// and are left untouched.
pub fn bind(flag: &mut Flag, raw: &str, display: &str) -> Result<(), ParseError> {
    match flag.kind_mut() {
        FlagKind::Boolean(_) => Err(ParseError::unexpected_arg(display)),
        FlagKind::Number(n) => {
            let parsed = parse_number(raw);
            n.value = Some(parsed.unwrap_or(f64::NAN));
            match parsed {
                Some(_) => Ok(()),
                None => Err(ParseError::not_a_number(display, raw)),
            }
        }
        FlagKind::String(s) => {
            s.value = Some(raw.to_string());
            match s.one_of() {
                Some(allowed) if !allowed.iter().any(|v| v == raw) => Err(
                    ParseError::not_one_of(display, raw, &allowed.stringify()),
                ),
                _ => Ok(()),
            }
        }
    }
}
