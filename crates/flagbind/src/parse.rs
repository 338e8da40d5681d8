//! The parse driver: one left-to-right pass over the argument vector.

use tracing::{debug, trace};

use crate::bind::bind;
use crate::classify::{TokenClass, classify};
use crate::error::{ParseError, merge};
use crate::registry::Registry;

/// Parse `argv` against `registry`.
///
/// Bound values are stored in the registry. `argv` is rewritten to hold only
/// the positional arguments, in their original order, whatever the outcome.
///
/// Every problem found during the pass is ranked by [`crate::ErrorKind`] and
/// only the most severe one is returned. If an urgent boolean flag (such as
/// `--help`) was set, the pass succeeds regardless and required/default
/// post-processing is skipped.
///
/// Short flags never take their value from the next argument: `-n Ada` is a
/// missing argument for `-n` followed by the positional `Ada`. Use `-nAda`,
/// `--name Ada` or `--name=Ada`.
pub fn parse(registry: &mut Registry, argv: &mut Vec<String>) -> Result<(), ParseError> {
    let tokens = std::mem::take(argv);
    debug!(tokens = tokens.len(), "parsing arguments");

    let mut pass = Pass {
        registry,
        force_end: false,
        positionals: Vec::new(),
        best: None,
    };

    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        let class = classify(&token, pass.force_end);
        trace!(token = %token, ?class, "classified");
        match class {
            TokenClass::EndMarker => pass.force_end = true,
            TokenClass::Positional => pass.positionals.push(token),
            TokenClass::Short => pass.short_bundle(&token),
            TokenClass::Long => {
                let next = tokens.peek().map(String::as_str);
                if pass.long_flag(&token, next) {
                    tokens.next();
                }
            }
        }
    }

    let Pass {
        registry,
        positionals,
        mut best,
        ..
    } = pass;
    *argv = positionals;

    if let Some(flag) = registry.flags().iter().find(|f| f.urgent_and_set()) {
        debug!(flag = flag.long(), "urgent flag set, skipping validation");
        return Ok(());
    }

    for flag in registry.flags_mut() {
        if !flag.is_unset() {
            continue;
        }
        if flag.required() {
            merge(&mut best, ParseError::missing_required(&flag.usage()));
        } else {
            flag.apply_default();
        }
    }

    match best {
        Some(err) => {
            debug!(kind = ?err.kind(), positionals = argv.len(), "parse failed");
            Err(err)
        }
        None => {
            debug!(positionals = argv.len(), "parse succeeded");
            Ok(())
        }
    }
}

struct Pass<'r> {
    registry: &'r mut Registry,
    force_end: bool,
    positionals: Vec<String>,
    best: Option<ParseError>,
}

impl Pass<'_> {
    fn record(&mut self, err: ParseError) {
        merge(&mut self.best, err);
    }

    /// `-abc`: each character is a short flag until one of them takes a value.
    fn short_bundle(&mut self, token: &str) {
        let bundle = &token[1..];
        for (offset, c) in bundle.char_indices() {
            let display = format!("-{c}");
            let Some(index) = self.registry.position_short(c) else {
                self.record(ParseError::unrecognized(&display));
                continue;
            };
            let flag = &mut self.registry.flags_mut()[index];
            if flag.set_true() {
                continue;
            }

            let tail = &bundle[offset + c.len_utf8()..];
            let outcome = if !tail.is_empty() {
                bind(flag, tail, &display)
            } else if flag.apply_arg_optional() {
                Ok(())
            } else {
                Err(ParseError::missing_arg(token))
            };
            if let Err(err) = outcome {
                self.record(err);
            }
            return;
        }
    }

    /// `--name`, `--name=value`, `--name value`, `--no-name`. Returns `true`
    /// when `next` was consumed as the value.
    fn long_flag(&mut self, token: &str, next: Option<&str>) -> bool {
        let name = &token[2..];

        if let Some((key, value)) = name.split_once('=') {
            let display = format!("--{key}");
            let Some(index) = self.registry.position_long(key) else {
                self.record(ParseError::unrecognized(&display));
                return false;
            };
            if value.is_empty() {
                self.record(ParseError::missing_arg(&display));
                return false;
            }
            let flag = &mut self.registry.flags_mut()[index];
            if let Err(err) = bind(flag, value, &display) {
                self.record(err);
            }
            return false;
        }

        let Some((index, inverted)) = self.registry.resolve_long(name) else {
            self.record(ParseError::unrecognized(token));
            return false;
        };
        let flag = &mut self.registry.flags_mut()[index];

        if inverted {
            if flag.invertable() {
                flag.invert();
            } else {
                self.record(ParseError::not_invertable(token));
            }
            return false;
        }

        if flag.set_true() {
            return false;
        }

        match next {
            Some(value) if classify(value, self.force_end) == TokenClass::Positional => {
                if let Err(err) = bind(flag, value, token) {
                    self.record(err);
                }
                true
            }
            _ => {
                if !flag.apply_arg_optional() {
                    self.record(ParseError::missing_arg(token));
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse;
    use crate::error::ErrorKind;
    use crate::registry::{BooleanOptions, Handle, NumberOptions, Registry, StringOptions};

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    struct Demo {
        reg: Registry,
        help: Handle<bool>,
        verbose: Handle<bool>,
        all: Handle<bool>,
        name: Handle<String>,
        mode: Handle<String>,
        age: Handle<f64>,
        count: Handle<f64>,
    }

    fn demo() -> Demo {
        let mut reg = Registry::new();
        let help = reg.boolean(
            "help",
            "Show help",
            BooleanOptions {
                short: Some('h'),
                urgent: true,
                ..Default::default()
            },
        );
        let verbose = reg.boolean(
            "verbose",
            "Verbose output",
            BooleanOptions {
                short: Some('v'),
                invertable: true,
                ..Default::default()
            },
        );
        let all = reg.boolean(
            "all",
            "Everything",
            BooleanOptions {
                short: Some('a'),
                ..Default::default()
            },
        );
        let name = reg.string(
            "name",
            "Your name",
            StringOptions {
                short: Some('n'),
                invertable: true,
                ..Default::default()
            },
        );
        let mode = reg.string(
            "mode",
            "Output mode",
            StringOptions {
                short: Some('m'),
                one_of: Some(vec!["plain".into(), "json".into()]),
                arg_optional: Some("json".into()),
                ..Default::default()
            },
        );
        let age = reg.number("age", "Your age", NumberOptions::default());
        let count = reg.number(
            "count",
            "How many",
            NumberOptions {
                short: Some('c'),
                default: Some(1.0),
                invertable: true,
                ..Default::default()
            },
        );
        Demo {
            reg,
            help,
            verbose,
            all,
            name,
            mode,
            age,
            count,
        }
    }

    #[test]
    fn empty_argv_succeeds_and_applies_defaults() {
        let mut d = demo();
        let mut argv = Vec::new();
        parse(&mut d.reg, &mut argv).unwrap();
        assert!(argv.is_empty());
        assert_eq!(d.reg.get(d.count), Some(1.0));
        assert_eq!(d.reg.get(d.name), None);
        assert_eq!(d.reg.get(d.verbose), None);
    }

    #[test]
    fn long_forms_bind_values() {
        let mut d = demo();
        let mut argv = args(&["--name=Ada", "--age", "36", "--mode", "plain"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.name).as_deref(), Some("Ada"));
        assert_eq!(d.reg.get(d.age), Some(36.0));
        assert_eq!(d.reg.get(d.mode).as_deref(), Some("plain"));
    }

    #[test]
    fn positionals_keep_order_around_values() {
        let mut d = demo();
        let mut argv = args(&["pos1", "--count", "3", "pos2"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.count), Some(3.0));
        assert_eq!(argv, ["pos1", "pos2"]);
    }

    #[test]
    fn end_marker_turns_flags_into_positionals() {
        let mut d = demo();
        let mut argv = args(&["-v", "--", "--name", "-x", "--"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert!(d.reg.enabled(d.verbose));
        assert_eq!(d.reg.get(d.name), None);
        assert_eq!(argv, ["--name", "-x", "--"]);
    }

    #[test]
    fn last_write_wins() {
        let mut d = demo();
        let mut argv = args(&["--name", "a", "-nb", "--name=c"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.name).as_deref(), Some("c"));
    }

    #[test]
    fn inversion_resets_each_kind() {
        let mut d = demo();
        let mut argv = args(&["-v", "--no-verbose", "--no-name", "--count=5", "--no-count"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.verbose), Some(false));
        assert_eq!(d.reg.get(d.name).as_deref(), Some(""));
        assert_eq!(d.reg.get(d.count), Some(0.0));
    }

    #[test]
    fn inverting_a_plain_flag_is_an_error() {
        let mut d = demo();
        let mut argv = args(&["--no-all"]);
        let err = parse(&mut d.reg, &mut argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotInvertable);
        assert_eq!(err.message(), "flag cannot be inverted: --no-all");
        assert_eq!(d.reg.get(d.all), None);
    }

    #[test]
    fn short_bundle_sets_booleans() {
        let mut d = demo();
        let mut argv = args(&["-va", "file"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert!(d.reg.enabled(d.verbose));
        assert!(d.reg.enabled(d.all));
        assert_eq!(argv, ["file"]);
    }

    #[test]
    fn short_bundle_tail_becomes_the_value() {
        let mut d = demo();
        let mut argv = args(&["-vnAda", "-c7"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert!(d.reg.enabled(d.verbose));
        assert_eq!(d.reg.get(d.name).as_deref(), Some("Ada"));
        assert_eq!(d.reg.get(d.count), Some(7.0));
    }

    #[test]
    fn flags_after_a_value_in_a_bundle_are_never_reached() {
        let mut d = demo();
        let mut argv = args(&["-nav"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.name).as_deref(), Some("av"));
        assert_eq!(d.reg.get(d.all), None);
        assert_eq!(d.reg.get(d.verbose), None);
    }

    #[test]
    fn short_bundle_does_not_consume_next_argument() {
        let mut d = demo();
        let mut argv = args(&["-an", "extra"]);
        let err = parse(&mut d.reg, &mut argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArg);
        assert_eq!(err.message(), "missing value for -an");
        assert!(d.reg.enabled(d.all));
        assert_eq!(d.reg.get(d.name), None);
        assert_eq!(argv, ["extra"]);
    }

    #[test]
    fn short_bundle_uses_arg_optional() {
        let mut d = demo();
        let mut argv = args(&["-vm"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.mode).as_deref(), Some("json"));
    }

    #[test]
    fn unknown_short_flags_do_not_stop_the_bundle() {
        let mut d = demo();
        let mut argv = args(&["-xvy"]);
        let err = parse(&mut d.reg, &mut argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedFlag);
        assert_eq!(err.message(), "unknown flag: -x");
        assert!(d.reg.enabled(d.verbose));
    }

    #[test]
    fn long_value_stops_at_flag_like_token() {
        let mut d = demo();
        let mut argv = args(&["--name", "--all"]);
        let err = parse(&mut d.reg, &mut argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArg);
        assert_eq!(err.message(), "missing value for --name");
        assert!(d.reg.enabled(d.all));

        let mut d = demo();
        let mut argv = args(&["--age"]);
        let err = parse(&mut d.reg, &mut argv).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArg);
    }

    #[test]
    fn long_arg_optional_applies_without_value() {
        let mut d = demo();
        let mut argv = args(&["--mode", "--verbose"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert_eq!(d.reg.get(d.mode).as_deref(), Some("json"));
        assert!(d.reg.enabled(d.verbose));
    }

    #[test]
    fn equals_forms_report_their_own_errors() {
        let mut d = demo();
        let err = parse(&mut d.reg, &mut args(&["--name="])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingArg);
        assert_eq!(err.message(), "missing value for --name");

        let mut d = demo();
        let err = parse(&mut d.reg, &mut args(&["--colour=red"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnrecognizedFlag);
        assert_eq!(err.message(), "unknown flag: --colour");

        let mut d = demo();
        let err = parse(&mut d.reg, &mut args(&["--verbose=yes"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedArg);
        assert_eq!(d.reg.get(d.verbose), None);
    }

    #[test]
    fn one_of_violation_is_reported() {
        let mut d = demo();
        let err = parse(&mut d.reg, &mut args(&["--mode", "xml", "-v"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOneOf);
        assert_eq!(
            err.message(),
            "invalid value 'xml' for '--mode'. possible values: plain, json"
        );
    }

    #[test]
    fn highest_priority_error_wins() {
        let mut reg = Registry::new();
        reg.string(
            "name",
            "",
            StringOptions {
                required: true,
                ..Default::default()
            },
        );
        let age = reg.number("age", "", NumberOptions::default());
        let err = parse(&mut reg, &mut args(&["--age", "old"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotANumber);
        assert!(reg.get(age).is_some_and(f64::is_nan));

        let err = parse(&mut Registry::new(), &mut args(&["--a", "--b"])).unwrap_err();
        assert_eq!(err.message(), "unknown flag: --a");
    }

    #[test]
    fn missing_required_is_reported_with_usage() {
        let mut reg = Registry::new();
        reg.string(
            "out",
            "",
            StringOptions {
                required: true,
                arg_name: Some("file".into()),
                ..Default::default()
            },
        );
        reg.number(
            "jobs",
            "",
            NumberOptions {
                required: true,
                ..Default::default()
            },
        );
        let err = parse(&mut reg, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequired);
        assert_eq!(err.message(), "missing required argument: --out <file>");
    }

    #[test]
    fn urgent_flag_overrides_every_error() {
        let mut d = demo();
        let mut argv = args(&["--help", "--age", "not-a-number", "-x", "rest"]);
        parse(&mut d.reg, &mut argv).unwrap();
        assert!(d.reg.enabled(d.help));
        assert_eq!(argv, ["rest"]);
        assert_eq!(d.reg.get(d.count), None, "defaults are skipped");
    }

    #[test]
    fn argv_is_rewritten_even_on_failure() {
        let mut d = demo();
        let mut argv = args(&["a", "--bogus", "b"]);
        assert!(parse(&mut d.reg, &mut argv).is_err());
        assert_eq!(argv, ["a", "b"]);
    }
}
