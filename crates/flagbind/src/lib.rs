//! Declarative flag parsing with prioritized errors and aligned help rendering.
//!
//! Declare flags on a [`Registry`], hand it the raw arguments, then read the
//! bound values back through the typed handles:
//!
//! ```
//! use flagbind::{BooleanOptions, NumberOptions, Registry, parse};
//!
//! let mut registry = Registry::new();
//! let help = registry.boolean(
//!     "help",
//!     "Show this help",
//!     BooleanOptions { short: Some('h'), urgent: true, ..Default::default() },
//! );
//! let count = registry.number("count", "How many", NumberOptions::default());
//!
//! let mut argv: Vec<String> = ["in.txt", "--count", "3"].map(String::from).to_vec();
//! parse(&mut registry, &mut argv).unwrap();
//!
//! assert!(!registry.enabled(help));
//! assert_eq!(registry.get(count), Some(3.0));
//! assert_eq!(argv, ["in.txt"]);
//! ```
//!
//! A pass reports at most one error: the most severe one by [`ErrorKind`].

pub mod bind;
pub mod classify;
pub mod error;
pub mod help;
mod number;
pub mod parse;
pub mod registry;
pub mod schema;
pub mod stringify;

pub use classify::{TokenClass, classify};
pub use error::{ErrorKind, ParseError, RegistryError};
pub use help::{HelpOptions, Prefix, render};
pub use parse::parse;
pub use registry::{
    BooleanOptions, Entry, Flag, FlagKind, FlagValue, Handle, NumberOptions, Registry,
    StringOptions, Values,
};
pub use schema::{EntryDef, FlagDef, KindDef};
pub use stringify::{Stringify, stringify};
