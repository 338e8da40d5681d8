//! Flag descriptors and the registry that owns them.
//!
//! A [`Registry`] is an ordered mix of flag descriptors and section headers.
//! Headers only matter to the help renderer; parsing looks at descriptors in
//! registration order, so on duplicate names the first registration wins.

use std::collections::HashSet;
use std::marker::PhantomData;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::RegistryError;
use crate::stringify::Stringify;

/// Argument name shown in help when a value-taking flag declares none.
pub const DEFAULT_ARG_NAME: &str = "value";

/// A declared flag: shared naming plus a kind-specific value slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    long: String,
    description: String,
    short: Option<char>,
    invertable: bool,
    kind: FlagKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlagKind {
    Boolean(BooleanFlag),
    String(StringFlag),
    Number(NumberFlag),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanFlag {
    urgent: bool,
    pub(crate) value: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringFlag {
    default: Option<String>,
    arg_optional: Option<String>,
    one_of: Option<Vec<String>>,
    arg_name: Option<String>,
    required: bool,
    pub(crate) value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberFlag {
    default: Option<f64>,
    arg_optional: Option<f64>,
    arg_name: Option<String>,
    required: bool,
    pub(crate) value: Option<f64>,
}

/// Options for [`Registry::boolean`].
#[derive(Debug, Clone, Default)]
pub struct BooleanOptions {
    pub short: Option<char>,
    /// When set on the command line, parsing succeeds regardless of other
    /// errors (`--help`, `--version`).
    pub urgent: bool,
    pub invertable: bool,
}

/// Options for [`Registry::string`].
#[derive(Debug, Clone, Default)]
pub struct StringOptions {
    pub short: Option<char>,
    pub default: Option<String>,
    /// Value used when the flag is given without an argument.
    pub arg_optional: Option<String>,
    pub arg_name: Option<String>,
    pub one_of: Option<Vec<String>>,
    pub required: bool,
    pub invertable: bool,
}

/// Options for [`Registry::number`].
#[derive(Debug, Clone, Default)]
pub struct NumberOptions {
    pub short: Option<char>,
    pub default: Option<f64>,
    /// Value used when the flag is given without an argument.
    pub arg_optional: Option<f64>,
    pub arg_name: Option<String>,
    pub required: bool,
    pub invertable: bool,
}

impl Flag {
    pub fn boolean(
        long: impl Into<String>,
        description: impl Into<String>,
        options: BooleanOptions,
    ) -> Self {
        Self {
            long: long.into(),
            description: description.into(),
            short: options.short,
            invertable: options.invertable,
            kind: FlagKind::Boolean(BooleanFlag {
                urgent: options.urgent,
                value: None,
            }),
        }
    }

    pub fn string(
        long: impl Into<String>,
        description: impl Into<String>,
        options: StringOptions,
    ) -> Self {
        Self {
            long: long.into(),
            description: description.into(),
            short: options.short,
            invertable: options.invertable,
            kind: FlagKind::String(StringFlag {
                default: options.default,
                arg_optional: options.arg_optional,
                one_of: options.one_of,
                arg_name: options.arg_name,
                required: options.required,
                value: None,
            }),
        }
    }

    pub fn number(
        long: impl Into<String>,
        description: impl Into<String>,
        options: NumberOptions,
    ) -> Self {
        Self {
            long: long.into(),
            description: description.into(),
            short: options.short,
            invertable: options.invertable,
            kind: FlagKind::Number(NumberFlag {
                default: options.default,
                arg_optional: options.arg_optional,
                arg_name: options.arg_name,
                required: options.required,
                value: None,
            }),
        }
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn invertable(&self) -> bool {
        self.invertable
    }

    pub fn kind(&self) -> &FlagKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut FlagKind {
        &mut self.kind
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.kind, FlagKind::Boolean(_))
    }

    pub fn required(&self) -> bool {
        match &self.kind {
            FlagKind::Boolean(_) => false,
            FlagKind::String(s) => s.required,
            FlagKind::Number(n) => n.required,
        }
    }

    /// Whether the flag has no value yet (neither supplied nor defaulted).
    pub fn is_unset(&self) -> bool {
        match &self.kind {
            FlagKind::Boolean(b) => b.value.is_none(),
            FlagKind::String(s) => s.value.is_none(),
            FlagKind::Number(n) => n.value.is_none(),
        }
    }

    pub(crate) fn urgent_and_set(&self) -> bool {
        matches!(&self.kind, FlagKind::Boolean(b) if b.urgent && b.value == Some(true))
    }

    pub fn has_default(&self) -> bool {
        match &self.kind {
            FlagKind::Boolean(_) => false,
            FlagKind::String(s) => s.default.is_some(),
            FlagKind::Number(n) => n.default.is_some(),
        }
    }

    pub fn has_arg_optional(&self) -> bool {
        match &self.kind {
            FlagKind::Boolean(_) => false,
            FlagKind::String(s) => s.arg_optional.is_some(),
            FlagKind::Number(n) => n.arg_optional.is_some(),
        }
    }

    /// Argument label for help and usage text; `None` for booleans.
    pub fn arg_name(&self) -> Option<&str> {
        let name = match &self.kind {
            FlagKind::Boolean(_) => return None,
            FlagKind::String(s) => s.arg_name.as_deref(),
            FlagKind::Number(n) => n.arg_name.as_deref(),
        };
        Some(name.unwrap_or(DEFAULT_ARG_NAME))
    }

    /// `--long <name>` form used in usage-style messages.
    pub fn usage(&self) -> String {
        match self.arg_name() {
            Some(name) => format!("--{} <{name}>", self.long),
            None => format!("--{}", self.long),
        }
    }

    /// The value shown as `(Default: X)` in help: the argument-optional value
    /// when present, the regular default otherwise.
    pub fn display_default(&self) -> Option<String> {
        match &self.kind {
            FlagKind::Boolean(_) => None,
            FlagKind::String(s) => s
                .arg_optional
                .as_ref()
                .or(s.default.as_ref())
                .map(Stringify::stringify),
            FlagKind::Number(n) => n.arg_optional.or(n.default).map(|v| v.stringify()),
        }
    }

    /// Current value as help/report text (`N/A` when unset).
    pub fn value_text(&self) -> String {
        match &self.kind {
            FlagKind::Boolean(b) => b.value.stringify(),
            FlagKind::String(s) => s.value.stringify(),
            FlagKind::Number(n) => n.value.stringify(),
        }
    }

    pub(crate) fn set_true(&mut self) -> bool {
        match &mut self.kind {
            FlagKind::Boolean(b) => {
                b.value = Some(true);
                true
            }
            _ => false,
        }
    }

    /// Store the argument-optional value; `false` if the flag has none.
    pub(crate) fn apply_arg_optional(&mut self) -> bool {
        match &mut self.kind {
            FlagKind::String(s) => match &s.arg_optional {
                Some(v) => {
                    s.value = Some(v.clone());
                    true
                }
                None => false,
            },
            FlagKind::Number(n) => match n.arg_optional {
                Some(v) => {
                    n.value = Some(v);
                    true
                }
                None => false,
            },
            FlagKind::Boolean(_) => false,
        }
    }

    /// Reset to the falsy value of the kind, as `--no-<long>` does.
    pub(crate) fn invert(&mut self) {
        match &mut self.kind {
            FlagKind::Boolean(b) => b.value = Some(false),
            FlagKind::String(s) => s.value = Some(String::new()),
            FlagKind::Number(n) => n.value = Some(0.0),
        }
    }

    pub(crate) fn apply_default(&mut self) {
        match &mut self.kind {
            FlagKind::Boolean(_) => {}
            FlagKind::String(s) => {
                if let Some(d) = &s.default {
                    s.value = Some(d.clone());
                }
            }
            FlagKind::Number(n) => {
                if let Some(d) = n.default {
                    n.value = Some(d);
                }
            }
        }
    }
}

impl BooleanFlag {
    pub fn urgent(&self) -> bool {
        self.urgent
    }

    pub fn value(&self) -> Option<bool> {
        self.value
    }
}

impl StringFlag {
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn arg_optional(&self) -> Option<&str> {
        self.arg_optional.as_deref()
    }

    pub fn one_of(&self) -> Option<&[String]> {
        self.one_of.as_deref()
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl NumberFlag {
    pub fn default_value(&self) -> Option<f64> {
        self.default
    }

    pub fn arg_optional(&self) -> Option<f64> {
        self.arg_optional
    }

    /// Current value. An invalid numeric argument leaves `NaN` here.
    pub fn value(&self) -> Option<f64> {
        self.value
    }
}

/// Typed reference to a flag inside the registry that created it.
#[derive(Debug)]
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }
}

/// Value types readable through a [`Handle`].
pub trait FlagValue: Sized {
    fn read(kind: &FlagKind) -> Option<Self>;
}

impl FlagValue for bool {
    fn read(kind: &FlagKind) -> Option<Self> {
        match kind {
            FlagKind::Boolean(b) => b.value,
            _ => None,
        }
    }
}

impl FlagValue for String {
    fn read(kind: &FlagKind) -> Option<Self> {
        match kind {
            FlagKind::String(s) => s.value.clone(),
            _ => None,
        }
    }
}

impl FlagValue for f64 {
    fn read(kind: &FlagKind) -> Option<Self> {
        match kind {
            FlagKind::Number(n) => n.value,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Header(String),
    Flag(usize),
}

/// One registry entry in declaration order.
#[derive(Debug, Clone, Copy)]
pub enum Entry<'a> {
    Header(&'a str),
    Flag(&'a Flag),
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    flags: Vec<Flag>,
    layout: Vec<Slot>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section header. Headers only appear in help output.
    pub fn header(&mut self, text: impl Into<String>) {
        self.layout.push(Slot::Header(text.into()));
    }

    /// Add a prebuilt descriptor and return its index.
    pub fn push(&mut self, flag: Flag) -> usize {
        let index = self.flags.len();
        self.flags.push(flag);
        self.layout.push(Slot::Flag(index));
        index
    }

    pub fn boolean(
        &mut self,
        long: impl Into<String>,
        description: impl Into<String>,
        options: BooleanOptions,
    ) -> Handle<bool> {
        Handle::new(self.push(Flag::boolean(long, description, options)))
    }

    pub fn string(
        &mut self,
        long: impl Into<String>,
        description: impl Into<String>,
        options: StringOptions,
    ) -> Handle<String> {
        Handle::new(self.push(Flag::string(long, description, options)))
    }

    pub fn number(
        &mut self,
        long: impl Into<String>,
        description: impl Into<String>,
        options: NumberOptions,
    ) -> Handle<f64> {
        Handle::new(self.push(Flag::number(long, description, options)))
    }

    /// Current value behind `handle`, or `None` while unset.
    pub fn get<T: FlagValue>(&self, handle: Handle<T>) -> Option<T> {
        self.flags.get(handle.index).and_then(|f| T::read(&f.kind))
    }

    /// Whether a boolean flag ended up `true`. Unset counts as `false`.
    pub fn enabled(&self, handle: Handle<bool>) -> bool {
        self.get(handle).unwrap_or(false)
    }

    pub fn flag<T>(&self, handle: Handle<T>) -> Option<&Flag> {
        self.flags.get(handle.index)
    }

    /// Descriptor with the given long name (first registration wins).
    pub fn find(&self, long: &str) -> Option<&Flag> {
        self.position_long(long).map(|i| &self.flags[i])
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut [Flag] {
        &mut self.flags
    }

    pub fn entries(&self) -> impl Iterator<Item = Entry<'_>> {
        self.layout.iter().map(|slot| match slot {
            Slot::Header(text) => Entry::Header(text.as_str()),
            Slot::Flag(i) => Entry::Flag(&self.flags[*i]),
        })
    }

    pub(crate) fn position_long(&self, long: &str) -> Option<usize> {
        self.flags.iter().position(|f| f.long == long)
    }

    pub(crate) fn position_short(&self, short: char) -> Option<usize> {
        self.flags.iter().position(|f| f.short == Some(short))
    }

    /// Resolve the text after `--` to a descriptor. The boolean is `true` when
    /// the name addresses the flag through inversion: `no-<long>`, or `<rest>`
    /// for a flag whose long name is `no-<rest>`. Exact matches win.
    pub(crate) fn resolve_long(&self, name: &str) -> Option<(usize, bool)> {
        if let Some(i) = self.position_long(name) {
            return Some((i, false));
        }
        if let Some(rest) = name.strip_prefix("no-")
            && let Some(i) = self.position_long(rest)
        {
            return Some((i, true));
        }
        self.flags
            .iter()
            .position(|f| f.long.strip_prefix("no-") == Some(name))
            .map(|i| (i, true))
    }

    /// Check the invariants parsing assumes but never enforces.
    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut longs: HashSet<&str> = HashSet::new();
        let mut shorts: HashSet<char> = HashSet::new();
        for flag in &self.flags {
            if flag.long.trim().is_empty() {
                return Err(RegistryError::EmptyLong);
            }
            if !longs.insert(flag.long.as_str()) {
                return Err(RegistryError::DuplicateLong(flag.long.clone()));
            }
            if let Some(c) = flag.short
                && !shorts.insert(c)
            {
                return Err(RegistryError::DuplicateShort(c));
            }
            if flag.required() && flag.has_default() {
                return Err(RegistryError::RequiredWithDefault(flag.long.clone()));
            }
        }
        Ok(())
    }

    /// Serializable snapshot of every flag's current value, keyed by long name.
    pub fn values(&self) -> Values<'_> {
        Values { flags: &self.flags }
    }
}

/// Ordered `long → value` view; unset values and `NaN` numbers serialize as `null`.
#[derive(Debug, Clone, Copy)]
pub struct Values<'a> {
    flags: &'a [Flag],
}

impl Serialize for Values<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.flags.len()))?;
        for flag in self.flags {
            match &flag.kind {
                FlagKind::Boolean(b) => map.serialize_entry(&flag.long, &b.value)?,
                FlagKind::String(s) => map.serialize_entry(&flag.long, &s.value)?,
                FlagKind::Number(n) => {
                    let value = n.value.filter(|v| !v.is_nan());
                    map.serialize_entry(&flag.long, &value)?
                }
            }
        }
        map.end()
    }
}
