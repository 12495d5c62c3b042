#![deny(missing_docs)]

//! A glob matcher that compiles shell-style patterns into anchored regular
//! expressions and matches slash-separated paths against them.
//!
//! The supported syntax covers the common shell constructs: `*` within a
//! segment, `**` across segments, `?` for a single character, bracket
//! classes, extglob groups like `!(a|b)`, brace alternation and ranges like
//! `{a,b}` and `{1..9}`, POSIX classes such as `[[:alpha:]]`, and leading-`!`
//! negation. Wildcards skip dotfiles unless [`MatchOptions::dot`] is set, and
//! even then the `.` and `..` entries never match `*` or `**`.
//!
//! Malformed constructs never abort compilation: an unterminated bracket,
//! brace or extglob group matches itself literally. Errors are reserved for
//! configuration problems, an empty pattern, an empty pattern list, or a
//! pattern longer than [`MatchOptions::max_length`].
//!
//! Compilation is deterministic: a pattern and a set of option flags always
//! produce the same regex source, which makes compiled patterns cacheable
//! (see [`GlobCache`]) and their sources comparable.
//!
//! # Examples
//!
//! ```
//! use pathglob::{is_match, MatchOptions, Matcher};
//!
//! let options = MatchOptions::new();
//! assert!(is_match("src/parse/mod.rs", "src/**/*.rs", &options).unwrap());
//! assert!(!is_match("notes/todo.md", "src/**/*.rs", &options).unwrap());
//!
//! // Ignore patterns veto matches, useful for exclusion lists.
//! let mut options = MatchOptions::new();
//! options.ignore = vec!["**/*.min.js".to_owned()];
//! let matcher = Matcher::new("**/*.js", &options).unwrap();
//! assert!(matcher.is_match("lib/app.js"));
//! assert!(!matcher.is_match("lib/app.min.js"));
//! ```
//!
//! # Main entry points
//!
//! * [`is_match`] and [`is_match_any`]: one-shot pattern tests.
//! * [`Matcher`]: a compiled pattern list with ignore patterns and match
//!   hooks, for matching many candidates.
//! * [`make_re`] and [`CompiledGlob`]: compile once, match repeatedly.
//! * [`parse`]: compile a pattern to regex source without building a regex.
//! * [`scan`]: split a pattern into its literal base and glob remainder.
//! * [`GlobCache`]: share compiled patterns across call sites and threads.

mod cache;
mod compile;
mod matcher;
mod options;
mod parse;
mod scan;
mod utils;

pub use cache::GlobCache;
pub use compile::{make_re, CompiledGlob};
pub use matcher::{is_match, is_match_any, match_base, match_base_re, test, Matcher, MatchResult};
pub use options::{BraceRange, FormatFn, MatchHookFn, MatchOptions, RangeExpandFn, ScanOptions};
pub use parse::{parse, parse_many, ParseGlobError, ParseState};
pub use scan::{scan, ScanResult, ScanToken};
