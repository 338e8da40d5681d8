//! Declarative registry definitions.
//!
//! A registry can be described as a JSON array whose items are either a
//! header string or a flag object:
//!
//! ```json
//! [
//!   "General",
//!   { "kind": "boolean", "long": "help", "short": "h", "urgent": true },
//!   { "kind": "string", "long": "mode", "one-of": ["plain", "json"], "arg-optional": "json" },
//!   { "kind": "number", "long": "count", "default": 1 }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::registry::{BooleanOptions, Flag, NumberOptions, Registry, StringOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryDef {
    Header(String),
    Flag(FlagDef),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FlagDef {
    pub long: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default)]
    pub invertable: bool,
    #[serde(flatten)]
    pub kind: KindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "kebab-case")]
pub enum KindDef {
    Boolean {
        #[serde(default)]
        urgent: bool,
    },
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg_optional: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        one_of: Option<Vec<String>>,
        #[serde(default)]
        required: bool,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg_optional: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        arg_name: Option<String>,
        #[serde(default)]
        required: bool,
    },
}

impl From<FlagDef> for Flag {
    fn from(def: FlagDef) -> Self {
        let FlagDef {
            long,
            description,
            short,
            invertable,
            kind,
        } = def;
        match kind {
            KindDef::Boolean { urgent } => Flag::boolean(
                long,
                description,
                BooleanOptions {
                    short,
                    urgent,
                    invertable,
                },
            ),
            KindDef::String {
                default,
                arg_optional,
                arg_name,
                one_of,
                required,
            } => Flag::string(
                long,
                description,
                StringOptions {
                    short,
                    default,
                    arg_optional,
                    arg_name,
                    one_of,
                    required,
                    invertable,
                },
            ),
            KindDef::Number {
                default,
                arg_optional,
                arg_name,
                required,
            } => Flag::number(
                long,
                description,
                NumberOptions {
                    short,
                    default,
                    arg_optional,
                    arg_name,
                    required,
                    invertable,
                },
            ),
        }
    }
}

impl Registry {
    /// Build a registry from definitions without validating it.
    pub fn from_defs(defs: impl IntoIterator<Item = EntryDef>) -> Self {
        let mut registry = Registry::new();
        for def in defs {
            match def {
                EntryDef::Header(text) => registry.header(text),
                EntryDef::Flag(flag) => {
                    registry.push(flag.into());
                }
            }
        }
        registry
    }

    /// Build and validate a registry from its JSON description.
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        let defs: Vec<EntryDef> = serde_json::from_str(text)?;
        let registry = Self::from_defs(defs);
        registry.validate()?;
        tracing::debug!(flags = registry.flags().len(), "loaded registry schema");
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{ErrorKind, RegistryError};
    use crate::parse::parse;
    use crate::registry::{Entry, FlagKind, Registry};

    const SCHEMA: &str = r#"[
        "General",
        { "kind": "boolean", "long": "help", "short": "h", "urgent": true, "description": "Show help" },
        { "kind": "boolean", "long": "color", "invertable": true },
        { "kind": "string", "long": "mode", "one-of": ["plain", "json"], "arg-optional": "json" },
        { "kind": "number", "long": "count", "short": "c", "default": 1, "arg-name": "n" }
    ]"#;

    #[test]
    fn loads_headers_and_flags_in_order() {
        let reg = Registry::from_json(SCHEMA).unwrap();
        let entries: Vec<_> = reg.entries().collect();
        assert_eq!(entries.len(), 5);
        assert!(matches!(entries[0], Entry::Header("General")));

        let help = reg.find("help").unwrap();
        assert_eq!(help.short(), Some('h'));
        assert_eq!(help.description(), "Show help");
        assert!(matches!(help.kind(), FlagKind::Boolean(b) if b.urgent()));

        let count = reg.find("count").unwrap();
        assert_eq!(count.arg_name(), Some("n"));
        assert!(matches!(count.kind(), FlagKind::Number(n) if n.default_value() == Some(1.0)));
    }

    #[test]
    fn loaded_registry_parses() {
        let mut reg = Registry::from_json(SCHEMA).unwrap();
        let mut argv = vec!["--no-color".to_string(), "-c4".to_string(), "--mode".to_string()];
        parse(&mut reg, &mut argv).unwrap();
        let json = serde_json::to_value(reg.values()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "help": null, "color": false, "mode": "json", "count": 4.0 })
        );

        let mut reg = Registry::from_json(SCHEMA).unwrap();
        let err = parse(&mut reg, &mut vec!["--mode=xml".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOneOf);
    }

    #[test]
    fn rejects_malformed_and_inconsistent_schemas() {
        let err = Registry::from_json(r#"[{ "kind": "float", "long": "x" }]"#).unwrap_err();
        assert!(matches!(err, RegistryError::Schema(_)));

        let err = Registry::from_json(
            r#"[{ "kind": "boolean", "long": "x" }, { "kind": "number", "long": "x" }]"#,
        )
        .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateLong(name) if name == "x"));
    }
}
