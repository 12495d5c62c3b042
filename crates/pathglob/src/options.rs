//! Configuration for scanning, compiling and matching glob patterns.

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::matcher::MatchResult;

/// Rewrites a candidate path before it is matched.
pub type FormatFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Replaces the built-in brace range expansion. Returns the regex source
/// fragment to emit for the range, or `None` to fall back to the built-in
/// expansion.
pub type RangeExpandFn = Arc<dyn Fn(&BraceRange<'_>, &MatchOptions) -> Option<String> + Send + Sync>;

/// Observes a match outcome. See the `on_match`, `on_ignore` and `on_result`
/// fields of [`MatchOptions`] for when each hook fires.
pub type MatchHookFn = Arc<dyn Fn(&MatchResult) + Send + Sync>;

/// The endpoints of a brace range construct like `{1..9}` or `{a..z..2}`,
/// borrowed from the pattern text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BraceRange<'a> {
    /// The first endpoint, before the first `..`.
    pub start: &'a str,
    /// The second endpoint.
    pub end: &'a str,
    /// The optional increment, after a second `..`.
    pub step: Option<&'a str>,
}

/// Options controlling how a pattern is compiled and how candidates are
/// matched against it.
///
/// The default value matches the documented behaviour of the library: fast
/// paths enabled, patterns capped at [`MatchOptions::DEFAULT_MAX_LENGTH`]
/// bytes, everything else off.
#[derive(Clone)]
pub struct MatchOptions {
    /// Allow wildcards to match segments that start with a dot. `.` and `..`
    /// never match wildcards, even with this set.
    pub dot: bool,
    /// Match case-insensitively.
    pub nocase: bool,
    /// Use Windows path semantics: separators in compiled patterns accept
    /// both `/` and `\`, and candidate backslashes are normalized before
    /// matching.
    pub windows: bool,
    /// Recognize POSIX bracket classes like `[[:alpha:]]`.
    pub posix: bool,
    /// Make `*` behave like bash's star, crossing segment boundaries.
    pub bash: bool,
    /// Match anywhere in the candidate instead of anchoring to both ends.
    pub contains: bool,
    /// Treat extglob syntax like `@(a|b)` as literal text.
    pub noextglob: bool,
    /// Treat `**` as two ordinary stars.
    pub noglobstar: bool,
    /// Treat a leading `!` as a literal character instead of negation.
    pub nonegate: bool,
    /// Treat `{a,b}` and `{1..9}` as literal text.
    pub nobrace: bool,
    /// Match against the final path segment of the candidate only.
    pub basename: bool,
    /// Do not tolerate a trailing separator on candidates matched by
    /// patterns that end in a wildcard.
    pub strict_slashes: bool,
    /// Compile simple star-and-literal patterns through the reduced fast
    /// path. Output is identical to the full compiler.
    pub fastpaths: bool,
    /// Maximum accepted pattern length in bytes. Longer patterns are
    /// rejected before any parsing work.
    pub max_length: usize,
    /// Patterns that veto an otherwise positive match.
    pub ignore: Vec<String>,
    /// Replaces the built-in brace range expansion.
    pub expand_range: Option<RangeExpandFn>,
    /// Rewrites candidates before matching, ahead of separator
    /// normalization.
    pub format: Option<FormatFn>,
    /// Fires at most once per match call, when the final outcome is a match.
    pub on_match: Option<MatchHookFn>,
    /// Fires when an ignore pattern vetoes an otherwise positive match.
    pub on_ignore: Option<MatchHookFn>,
    /// Fires on every match call with the final outcome.
    pub on_result: Option<MatchHookFn>,
}

impl MatchOptions {
    /// The default pattern length ceiling, in bytes.
    pub const DEFAULT_MAX_LENGTH: usize = 65536;

    /// Options with the documented defaults.
    pub fn new() -> Self {
        Self {
            dot: false,
            nocase: false,
            windows: false,
            posix: false,
            bash: false,
            contains: false,
            noextglob: false,
            noglobstar: false,
            nonegate: false,
            nobrace: false,
            basename: false,
            strict_slashes: false,
            fastpaths: true,
            max_length: Self::DEFAULT_MAX_LENGTH,
            ignore: Vec::new(),
            expand_range: None,
            format: None,
            on_match: None,
            on_ignore: None,
            on_result: None,
        }
    }

    /// The scalar subset of these options that influences compiled regex
    /// source text. Used as part of cache keys.
    pub(crate) fn fingerprint(&self) -> OptionsFingerprint {
        OptionsFingerprint {
            dot: self.dot,
            nocase: self.nocase,
            windows: self.windows,
            posix: self.posix,
            bash: self.bash,
            contains: self.contains,
            noextglob: self.noextglob,
            noglobstar: self.noglobstar,
            nonegate: self.nonegate,
            nobrace: self.nobrace,
            basename: self.basename,
            strict_slashes: self.strict_slashes,
            fastpaths: self.fastpaths,
            max_length: self.max_length,
        }
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for MatchOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchOptions")
            .field("dot", &self.dot)
            .field("nocase", &self.nocase)
            .field("windows", &self.windows)
            .field("posix", &self.posix)
            .field("bash", &self.bash)
            .field("contains", &self.contains)
            .field("noextglob", &self.noextglob)
            .field("noglobstar", &self.noglobstar)
            .field("nonegate", &self.nonegate)
            .field("nobrace", &self.nobrace)
            .field("basename", &self.basename)
            .field("strict_slashes", &self.strict_slashes)
            .field("fastpaths", &self.fastpaths)
            .field("max_length", &self.max_length)
            .field("ignore", &self.ignore)
            .field("expand_range", &self.expand_range.is_some())
            .field("format", &self.format.is_some())
            .field("on_match", &self.on_match.is_some())
            .field("on_ignore", &self.on_ignore.is_some())
            .field("on_result", &self.on_result.is_some())
            .finish()
    }
}

/// Options for [`crate::scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Also return one [`crate::ScanToken`] per path segment.
    pub tokens: bool,
    /// Also return the plain segment strings.
    pub parts: bool,
    /// Do not recognize extglob syntax when classifying segments.
    pub noext: bool,
    /// Do not treat a leading `!` as negation.
    pub nonegate: bool,
}

/// The scalar options that feed into compiled output, in hashable form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct OptionsFingerprint {
    dot: bool,
    nocase: bool,
    windows: bool,
    posix: bool,
    bash: bool,
    contains: bool,
    noextglob: bool,
    noglobstar: bool,
    nonegate: bool,
    nobrace: bool,
    basename: bool,
    strict_slashes: bool,
    fastpaths: bool,
    max_length: usize,
}
