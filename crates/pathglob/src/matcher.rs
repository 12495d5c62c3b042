//! The match runtime: input preparation, candidate matching, ignore vetoes
//! and hook dispatch.

use serde::Serialize;

use crate::compile::{make_re, CompiledGlob};
use crate::options::MatchOptions;
use crate::parse::ParseGlobError;
use crate::utils::{basename, to_forward_slashes};

/// The outcome of matching one input against a pattern. This is what the
/// match callbacks receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The pattern text the input was matched against.
    pub glob: String,
    /// The input as given.
    pub input: String,
    /// The input after the format hook and separator normalization.
    pub output: String,
    /// Whether the input matched, ignore vetoes included.
    pub is_match: bool,
    /// The text the regex matched, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,
}

/// Matches one input against a compiled pattern.
///
/// This is the bare matching step: the format hook, separator normalization
/// under `windows`, the shortcut for input equal to the pattern text,
/// basename routing under `basename`, then the regex. No ignore patterns
/// and no callbacks; [`Matcher`] layers those on top. An empty input never
/// matches.
pub fn test(input: &str, glob: &CompiledGlob, options: &MatchOptions) -> MatchResult {
    let mut result = MatchResult {
        glob: glob.state().input.clone(),
        input: input.to_owned(),
        output: String::new(),
        is_match: false,
        matched: None,
    };
    if input.is_empty() {
        return result;
    }

    let formatted = match &options.format {
        Some(format) => format(input),
        None => input.to_owned(),
    };
    result.output = if options.windows {
        to_forward_slashes(&formatted)
    } else {
        formatted
    };

    if result.output == result.glob {
        result.is_match = true;
        result.matched = Some(result.output.clone());
        return result;
    }

    let candidate = if options.basename {
        basename(&result.output)
    } else {
        result.output.as_str()
    };
    if let Some((start, end)) = glob.find_match(candidate) {
        result.is_match = true;
        result.matched = Some(candidate[start..end].to_owned());
    }
    result
}

/// A reusable matcher: one or more compiled patterns, the compiled ignore
/// patterns and the match callbacks.
///
/// An input matches when any pattern matches and no ignore pattern does.
/// With several patterns the first match wins; `on_match` fires at most
/// once per call.
#[derive(Debug, Clone)]
pub struct Matcher {
    globs: Vec<CompiledGlob>,
    ignore: Vec<CompiledGlob>,
    options: MatchOptions,
}

impl Matcher {
    /// Builds a matcher for a single pattern.
    pub fn new(pattern: &str, options: &MatchOptions) -> Result<Self, ParseGlobError> {
        Self::new_many(&[pattern], options)
    }

    /// Builds a matcher for several patterns. The list must not be empty.
    pub fn new_many<S: AsRef<str>>(
        patterns: &[S],
        options: &MatchOptions,
    ) -> Result<Self, ParseGlobError> {
        if patterns.is_empty() {
            return Err(ParseGlobError::EmptyPatternList);
        }
        let globs = patterns
            .iter()
            .map(|pattern| make_re(pattern.as_ref(), options))
            .collect::<Result<Vec<_>, _>>()?;
        let ignore_options = ignore_options(options);
        let ignore = options
            .ignore
            .iter()
            .map(|pattern| make_re(pattern, &ignore_options))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            globs,
            ignore,
            options: options.clone(),
        })
    }

    /// Whether the input matches, with the ignore veto applied.
    pub fn is_match(&self, input: &str) -> bool {
        self.test(input).is_match
    }

    /// Runs the full pipeline and reports the final outcome.
    ///
    /// The first matching pattern wins and names the result's `glob`; when
    /// nothing matches the result reflects the first pattern. An ignore
    /// match vetoes. Callbacks observe the final outcome: `on_result` for
    /// every call, then `on_ignore` on a veto of an otherwise-positive
    /// match, or `on_match` on a match.
    pub fn test(&self, input: &str) -> MatchResult {
        let mut result: Option<MatchResult> = None;
        for glob in &self.globs {
            let candidate = test(input, glob, &self.options);
            let matched = candidate.is_match;
            if result.is_none() || matched {
                result = Some(candidate);
            }
            if matched {
                break;
            }
        }
        let mut result = result.expect("a matcher always holds at least one pattern");

        let vetoed = result.is_match
            && self
                .ignore
                .iter()
                .any(|glob| test(input, glob, &self.options).is_match);
        if vetoed {
            result.is_match = false;
            result.matched = None;
        }

        if let Some(on_result) = &self.options.on_result {
            on_result(&result);
        }
        if vetoed {
            if let Some(on_ignore) = &self.options.on_ignore {
                on_ignore(&result);
            }
        } else if result.is_match {
            if let Some(on_match) = &self.options.on_match {
                on_match(&result);
            }
        }
        result
    }
}

/// Ignore patterns are compiled with the same options minus the ignore list
/// itself and the callbacks, so a veto never recurses or fires hooks.
fn ignore_options(options: &MatchOptions) -> MatchOptions {
    let mut scrubbed = options.clone();
    scrubbed.ignore = Vec::new();
    scrubbed.on_match = None;
    scrubbed.on_ignore = None;
    scrubbed.on_result = None;
    scrubbed
}

/// Whether the input matches the pattern.
pub fn is_match(input: &str, pattern: &str, options: &MatchOptions) -> Result<bool, ParseGlobError> {
    Ok(Matcher::new(pattern, options)?.is_match(input))
}

/// Whether the input matches any of the patterns.
pub fn is_match_any<S: AsRef<str>>(
    input: &str,
    patterns: &[S],
    options: &MatchOptions,
) -> Result<bool, ParseGlobError> {
    Ok(Matcher::new_many(patterns, options)?.is_match(input))
}

/// Matches the pattern against only the basename of the input.
pub fn match_base(
    input: &str,
    pattern: &str,
    options: &MatchOptions,
) -> Result<bool, ParseGlobError> {
    let mut options = options.clone();
    options.basename = true;
    Ok(Matcher::new(pattern, &options)?.is_match(input))
}

/// Matches an already compiled pattern against only the basename of the
/// input.
pub fn match_base_re(input: &str, glob: &CompiledGlob) -> bool {
    let mut options = glob.options().clone();
    options.basename = true;
    test(input, glob, &options).is_match
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn check(input: &str, pattern: &str) -> bool {
        is_match(input, pattern, &MatchOptions::new()).unwrap()
    }

    #[rstest]
    #[case("ab", "*", true)]
    #[case("a/b", "*", false)]
    #[case("a/b", "*/*", true)]
    #[case("a/b/c", "*/*", false)]
    #[case("app.js", "*.js", true)]
    #[case("app.jsx", "*.js", false)]
    #[case("a", "a*", true)]
    #[case("ab/", "*", true)]
    fn test_star_stays_within_segment(
        #[case] input: &str,
        #[case] pattern: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(input, pattern), expected, "{input:?} vs {pattern:?}");
    }

    #[rstest]
    #[case("a/c", "a/**/c", true)]
    #[case("a/b/c", "a/**/c", true)]
    #[case("a/b/d/c", "a/**/c", true)]
    #[case("a/b/d", "a/**/c", false)]
    #[case("a", "**", true)]
    #[case("a/b/c", "**", true)]
    #[case("", "**", false)]
    #[case("a", "a/**", true)]
    #[case("a/", "a/**", true)]
    #[case("a/b", "a/**", true)]
    #[case("a/b/c", "a/**", true)]
    #[case("b", "a/**", false)]
    fn test_globstar_spans_segments(
        #[case] input: &str,
        #[case] pattern: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(input, pattern), expected, "{input:?} vs {pattern:?}");
    }

    #[rstest]
    #[case("foo/", true)]
    #[case("foo/bar/", true)]
    #[case("foo/bar/baz/qux/", true)]
    #[case("foo/bar", false)]
    #[case("foo", false)]
    fn test_globstar_with_trailing_separator(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(check(input, "foo/**/"), expected, "{input:?}");
    }

    #[test]
    fn test_consecutive_globstars_match_like_one() {
        assert!(check("a/b/c", "a/**/**/c"));
        assert!(check("a/c", "a/**/**/c"));
    }

    #[rstest]
    #[case(".hidden", "*", false)]
    #[case(".hidden", ".*", true)]
    #[case("a/.x", "a/*", false)]
    #[case("a/.x", "a/.*", true)]
    #[case("a/.x/b", "a/**/b", false)]
    #[case(".git", "**", false)]
    fn test_dot_segments_hidden_by_default(
        #[case] input: &str,
        #[case] pattern: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(input, pattern), expected, "{input:?} vs {pattern:?}");
    }

    #[rstest]
    #[case(".hidden", "*", true)]
    #[case("a/.x", "a/*", true)]
    #[case("a/.x/b", "a/**/b", true)]
    #[case(".", "*", false)]
    #[case("..", "*", false)]
    #[case("..", "**", false)]
    #[case("a/..", "a/*", false)]
    // `?` carries no dot gate once dot segments are exposed.
    #[case(".", "?", true)]
    #[case("..", ".?", true)]
    fn test_dot_option_exposes_dot_segments(
        #[case] input: &str,
        #[case] pattern: &str,
        #[case] expected: bool,
    ) {
        let mut options = MatchOptions::new();
        options.dot = true;
        assert_eq!(
            is_match(input, pattern, &options).unwrap(),
            expected,
            "{input:?} vs {pattern:?}"
        );
    }

    #[rstest]
    #[case("app.ts", true)]
    #[case("app.d.ts", false)]
    #[case("app.js", false)]
    #[case("src/app.ts", true)]
    #[case("src/deep/app.d.ts", false)]
    fn test_declaration_file_exclusion(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(check(input, "**/!(*.d).ts"), expected, "{input:?}");
    }

    #[rstest]
    #[case("foo", true)]
    #[case("bar", false)]
    #[case("foobar", true)]
    fn test_negated_extglob_rejects_exact_alternatives(
        #[case] input: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(input, "!(bar)"), expected, "{input:?}");
    }

    #[test]
    fn test_extglob_alternatives() {
        assert!(check("abc", "a@(b|x)c"));
        assert!(check("axc", "a@(b|x)c"));
        assert!(!check("ac", "a@(b|x)c"));
        assert!(check("ac", "a?(b|x)c"));
        assert!(check("abbbc", "a+(b)c"));
        assert!(check("ac", "a*(b)c"));
    }

    #[rstest]
    #[case("x", "**(a)", true)]
    #[case("xaa", "**(a)", true)]
    #[case("aa", "**(a)", true)]
    #[case("x/y", "**(a)", false)]
    #[case("xb", "a**(b)", false)]
    #[case("axb", "a**(b)", true)]
    fn test_star_before_extglob_keeps_both(
        #[case] input: &str,
        #[case] pattern: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(check(input, pattern), expected, "{input:?} vs {pattern:?}");
    }

    #[test]
    fn test_brace_alternation() {
        let matcher = Matcher::new("a.{js,md}", &MatchOptions::new()).unwrap();
        assert!(matcher.is_match("a.js"));
        assert!(matcher.is_match("a.md"));
        assert!(!matcher.is_match("a.txt"));
    }

    #[rstest]
    #[case("file1", "file{1..3}", true)]
    #[case("file2", "file{1..3}", true)]
    #[case("file4", "file{1..3}", false)]
    #[case("file02", "file{01..03}", true)]
    #[case("file2", "file{01..03}", false)]
    fn test_brace_ranges(#[case] input: &str, #[case] pattern: &str, #[case] expected: bool) {
        assert_eq!(check(input, pattern), expected, "{input:?} vs {pattern:?}");
    }

    #[test]
    fn test_negated_pattern() {
        assert!(check("a.md", "!*.js"));
        assert!(!check("a.js", "!*.js"));
        assert!(check("a.js", "!!*.js"));
    }

    #[test]
    fn test_bracket_bang_members_are_literal() {
        // `[!a]` is a class holding `!` and `a`; only `[^a]` negates.
        assert!(check("!", "[!a]"));
        assert!(check("a", "[!a]"));
        assert!(!check("b", "[!a]"));

        assert!(check("b", "[^a]"));
        assert!(!check("a", "[^a]"));
    }

    #[test]
    fn test_basename_and_full_path_diverge() {
        let options = MatchOptions::new();
        let input = "src/components/Button.tsx";
        assert!(!is_match(input, "*.tsx", &options).unwrap());
        assert!(match_base(input, "*.tsx", &options).unwrap());
        assert!(is_match("src/Button.tsx", "src/*.tsx", &options).unwrap());
    }

    #[test]
    fn test_match_base_re() {
        let glob = make_re("*.rs", &MatchOptions::new()).unwrap();
        assert!(match_base_re("crates/pathglob/src/lib.rs", &glob));
        assert!(!match_base_re("crates/pathglob/src/lib.md", &glob));
    }

    #[test]
    fn test_input_equal_to_pattern_text_matches() {
        // `{a}` compiles to an alternation matching `a`, yet the literal
        // spelling still matches through the equality shortcut.
        assert!(check("a", "{a}"));
        assert!(check("{a}", "{a}"));
        assert!(!check("b", "{a}"));
    }

    #[test]
    fn test_empty_input_never_matches() {
        assert!(!check("", "**"));
        assert!(!check("", "*"));
    }

    #[test]
    fn test_format_hook_runs_first() {
        let mut options = MatchOptions::new();
        options.format = Some(Arc::new(|input: &str| input.to_lowercase()));
        assert!(is_match("APP.JS", "*.js", &options).unwrap());

        let matcher = Matcher::new("*.js", &options).unwrap();
        let result = matcher.test("APP.JS");
        assert_eq!(result.input, "APP.JS");
        assert_eq!(result.output, "app.js");
        assert_eq!(result.matched.as_deref(), Some("app.js"));
    }

    #[test]
    fn test_windows_normalization() {
        let mut options = MatchOptions::new();
        options.windows = true;
        assert!(is_match("a\\b\\c", "a/**", &options).unwrap());
        assert!(is_match("a\\b", "a/b", &options).unwrap());
        assert!(is_match("a/b", "a/b", &options).unwrap());
    }

    #[test]
    fn test_nocase() {
        let mut options = MatchOptions::new();
        options.nocase = true;
        assert!(is_match("README.MD", "*.md", &options).unwrap());
    }

    #[test]
    fn test_contains_matches_anywhere() {
        let mut options = MatchOptions::new();
        options.contains = true;
        assert!(is_match("some/dir/app.js", "dir", &options).unwrap());
        assert!(!is_match("some/dir/app.js", "nope", &options).unwrap());
    }

    #[test]
    fn test_ignore_vetoes_match() {
        let mut options = MatchOptions::new();
        options.ignore = vec!["b*.js".to_owned()];
        assert!(is_match("a.js", "*.js", &options).unwrap());
        assert!(!is_match("b.js", "*.js", &options).unwrap());
        // An ignore pattern alone never turns a non-match into a match.
        assert!(!is_match("b.md", "*.js", &options).unwrap());
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let matcher = Matcher::new_many(&["*.md", "*.js"], &MatchOptions::new()).unwrap();
        let result = matcher.test("x.js");
        assert!(result.is_match);
        assert_eq!(result.glob, "*.js");

        let result = matcher.test("x.txt");
        assert!(!result.is_match);
        assert_eq!(result.glob, "*.md");
    }

    #[test]
    fn test_is_match_any() {
        let options = MatchOptions::new();
        assert!(is_match_any("b.md", &["*.js", "*.md"], &options).unwrap());
        assert!(!is_match_any("b.rs", &["*.js", "*.md"], &options).unwrap());
        assert_matches!(
            is_match_any::<&str>("x", &[], &options),
            Err(ParseGlobError::EmptyPatternList)
        );
    }

    #[test]
    fn test_on_match_fires_at_most_once_per_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut options = MatchOptions::new();
        options.on_match = Some(Arc::new(move |_: &MatchResult| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        // Both patterns match the input; the callback must still fire once.
        let matcher = Matcher::new_many(&["*.js", "app.*"], &options).unwrap();
        assert!(matcher.is_match("app.js"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(!matcher.is_match("app.css"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_dispatch_on_veto() {
        let results = Arc::new(AtomicUsize::new(0));
        let ignores = Arc::new(AtomicUsize::new(0));
        let matches = Arc::new(AtomicUsize::new(0));

        let mut options = MatchOptions::new();
        options.ignore = vec!["b*.js".to_owned()];
        let counter = Arc::clone(&results);
        options.on_result = Some(Arc::new(move |_: &MatchResult| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = Arc::clone(&ignores);
        options.on_ignore = Some(Arc::new(move |result: &MatchResult| {
            assert!(!result.is_match);
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = Arc::clone(&matches);
        options.on_match = Some(Arc::new(move |result: &MatchResult| {
            assert!(result.is_match);
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let matcher = Matcher::new("*.js", &options).unwrap();

        assert!(matcher.is_match("a.js"));
        assert_eq!(results.load(Ordering::SeqCst), 1);
        assert_eq!(matches.load(Ordering::SeqCst), 1);
        assert_eq!(ignores.load(Ordering::SeqCst), 0);

        assert!(!matcher.is_match("b.js"));
        assert_eq!(results.load(Ordering::SeqCst), 2);
        assert_eq!(matches.load(Ordering::SeqCst), 1);
        assert_eq!(ignores.load(Ordering::SeqCst), 1);

        assert!(!matcher.is_match("b.md"));
        assert_eq!(results.load(Ordering::SeqCst), 3);
        assert_eq!(matches.load(Ordering::SeqCst), 1);
        assert_eq!(ignores.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pattern_over_length_ceiling_is_error() {
        let mut options = MatchOptions::new();
        options.max_length = 8;
        assert_matches!(
            is_match("x", "123456789", &options),
            Err(ParseGlobError::PatternTooLong {
                length: 9,
                max_length: 8,
            })
        );
    }

    #[test]
    fn test_matcher_usable_across_threads() {
        let matcher = Arc::new(Matcher::new("**/*.rs", &MatchOptions::new()).unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let matcher = Arc::clone(&matcher);
                std::thread::spawn(move || {
                    (0..200).all(|_| {
                        matcher.is_match("src/lib.rs") && !matcher.is_match("src/lib.js")
                    })
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_match_result_serializes() {
        let matcher = Matcher::new("*.js", &MatchOptions::new()).unwrap();
        insta::assert_yaml_snapshot!(matcher.test("app.js"), @r###"
        glob: "*.js"
        input: app.js
        output: app.js
        is_match: true
        matched: app.js
        "###);
    }

    proptest! {
        #[test]
        fn test_arbitrary_patterns_never_panic(
            pattern in "[a-z*?\\[\\]{}()!@+|,./\\\\^$-]{0,24}",
            input in "[a-z./]{0,16}",
        ) {
            if let Ok(matcher) = Matcher::new(&pattern, &MatchOptions::new()) {
                let _ = matcher.is_match(&input);
            }
        }
    }
}
