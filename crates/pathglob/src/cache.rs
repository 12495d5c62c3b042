//! A concurrency-safe cache of compiled patterns.

use dashmap::DashMap;

use crate::compile::{make_re, CompiledGlob};
use crate::options::{MatchOptions, OptionsFingerprint};
use crate::parse::ParseGlobError;

/// A cache of compiled patterns, keyed by pattern text and the option flags
/// that influence compiled output.
///
/// Nothing in this crate consults a cache behind the caller's back. Code that
/// compiles the same patterns repeatedly constructs one of these and routes
/// compilation through [`GlobCache::make_re`]; everything else pays the
/// compilation cost per call.
///
/// Compilation is deterministic for a given pattern and fingerprint, so a
/// racing insert under the same key stores an identical value.
#[derive(Debug, Default)]
pub struct GlobCache {
    entries: DashMap<(String, OptionsFingerprint), CompiledGlob>,
}

impl GlobCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached compilation of `pattern`, compiling and storing it
    /// on a miss.
    ///
    /// A hit carries the caller's own options: only the fingerprinted flags
    /// shape the stored regex, so hooks and ignore lists stay per-caller.
    /// Lookups with an `expand_range` hook bypass the cache entirely: that
    /// hook participates in compilation but cannot be part of the key.
    pub fn make_re(
        &self,
        pattern: &str,
        options: &MatchOptions,
    ) -> Result<CompiledGlob, ParseGlobError> {
        if options.expand_range.is_some() {
            return make_re(pattern, options);
        }
        let key = (pattern.to_owned(), options.fingerprint());
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.with_options(options));
        }
        let compiled = make_re(pattern, options)?;
        self.entries.insert(key, compiled.clone());
        Ok(compiled)
    }

    /// The number of cached compilations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no compilations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every cached compilation.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
