//! Lexical classification of glob patterns.
//!
//! Scanning answers "which part of this pattern is literal and which part
//! needs the compiler" without building any regex. It is a single forward
//! pass that only tracks escapes and brace depth, so it is a deliberate
//! approximation: exact pairing of group constructs is the parser's job.

use serde::Serialize;

use crate::options::ScanOptions;

/// Classification of one path segment produced by [`scan`] when
/// [`ScanOptions::tokens`] is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanToken {
    /// The raw text of the segment, escapes included.
    pub value: String,
    /// The segment contains glob syntax.
    pub is_glob: bool,
    /// The segment opens a brace construct with a closer in the remainder.
    pub is_brace: bool,
    /// The segment opens a bracket expression with a closer in the
    /// remainder.
    pub is_bracket: bool,
    /// The segment opens an extglob with a closer in the remainder.
    pub is_extglob: bool,
    /// The segment is exactly `**`.
    pub is_globstar: bool,
}

/// The outcome of [`scan`]: the pattern split into prefix, literal base and
/// glob remainder, plus feature flags describing what the pattern uses.
///
/// `base` and `glob` are both slices of the pattern after `prefix`; the
/// separator between them belongs to neither part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// The pattern as given.
    pub input: String,
    /// Leading negation marks, `./` runs and an absolute `/`, in input
    /// order.
    pub prefix: String,
    /// The longest run of purely literal leading segments.
    pub base: String,
    /// Everything from the first segment containing glob syntax onward.
    pub glob: String,
    /// The pattern carries an odd number of leading `!` negation marks.
    /// Reported separately from `is_glob`.
    pub negated: bool,
    /// Any segment contains glob syntax.
    pub is_glob: bool,
    /// Any segment opens a brace construct.
    pub is_brace: bool,
    /// Any segment opens a bracket expression.
    pub is_bracket: bool,
    /// Any segment opens an extglob.
    pub is_extglob: bool,
    /// Any segment is a whole-segment `**`.
    pub is_globstar: bool,
    /// Per-segment classification, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<ScanToken>>,
    /// Plain segment strings, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<String>>,
}

/// Splits a pattern into prefix, literal base and glob remainder and reports
/// which glob features it uses. Never fails; arbitrary input is classified
/// as best as a lexical pass can.
pub fn scan(input: &str, options: &ScanOptions) -> ScanResult {
    let bytes = input.as_bytes();
    let mut idx = 0;

    // Leading negation marks. A `!` that introduces an extglob is part of
    // the pattern body, not negation.
    let mut bang_count = 0usize;
    if !options.nonegate {
        while idx < bytes.len()
            && bytes[idx] == b'!'
            && (bytes.get(idx + 1) != Some(&b'(') || bytes.get(idx + 2) == Some(&b'?'))
        {
            bang_count += 1;
            idx += 1;
        }
    }
    let negated = bang_count % 2 == 1;

    // Leading `./` runs and a single absolute `/`.
    while bytes.get(idx) == Some(&b'.') && bytes.get(idx + 1) == Some(&b'/') {
        idx += 2;
    }
    if bytes.get(idx) == Some(&b'/') {
        idx += 1;
    }
    let prefix = input[..idx].to_owned();
    let rest = &input[idx..];

    let segments = split_segments(rest);
    let mut tokens = Vec::with_capacity(segments.len());
    let mut first_glob = None;
    for (seg_idx, (start, end)) in segments.iter().copied().enumerate() {
        let token = classify_segment(rest, start, end, options);
        if token.is_glob && first_glob.is_none() {
            first_glob = Some(seg_idx);
        }
        tokens.push(token);
    }

    let (base, glob) = match first_glob {
        Some(seg_idx) => {
            let glob_start = segments[seg_idx].0;
            let base_end = glob_start.saturating_sub(1);
            (rest[..base_end].to_owned(), rest[glob_start..].to_owned())
        }
        None => (rest.to_owned(), String::new()),
    };

    ScanResult {
        input: input.to_owned(),
        prefix,
        base,
        glob,
        negated,
        is_glob: tokens.iter().any(|t| t.is_glob),
        is_brace: tokens.iter().any(|t| t.is_brace),
        is_bracket: tokens.iter().any(|t| t.is_bracket),
        is_extglob: tokens.iter().any(|t| t.is_extglob),
        is_globstar: tokens.iter().any(|t| t.is_globstar),
        parts: options
            .parts
            .then(|| tokens.iter().map(|t| t.value.clone()).collect()),
        tokens: options.tokens.then_some(tokens),
    }
}

/// Byte ranges of the pattern's segments. Separators inside braces do not
/// split, so `{b,c/d}` stays one segment.
fn split_segments(rest: &str) -> Vec<(usize, usize)> {
    let bytes = rest.as_bytes();
    let mut segments = Vec::new();
    let mut seg_start = 0;
    let mut brace_depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1;
            }
            b'{' => brace_depth += 1,
            b'}' => brace_depth = brace_depth.saturating_sub(1),
            b'/' if brace_depth == 0 => {
                segments.push((seg_start, i));
                seg_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if seg_start <= bytes.len() && (seg_start != 0 || !bytes.is_empty()) {
        segments.push((seg_start, bytes.len()));
    }
    segments
}

fn classify_segment(rest: &str, start: usize, end: usize, options: &ScanOptions) -> ScanToken {
    let bytes = rest.as_bytes();
    let value = &rest[start..end];
    let mut token = ScanToken {
        value: value.to_owned(),
        is_glob: false,
        is_brace: false,
        is_bracket: false,
        is_extglob: false,
        is_globstar: value == "**",
    };
    if token.is_globstar {
        token.is_glob = true;
        return token;
    }

    let mut i = start;
    while i < end {
        match bytes[i] {
            b'\\' => {
                i += 1;
            }
            b'*' | b'?' => {
                // `*(` and friends introduce extglobs, checked below before
                // the wildcard reading applies.
                if !options.noext
                    && bytes.get(i + 1) == Some(&b'(')
                    && find_unescaped(bytes, i + 2, b')').is_some()
                {
                    token.is_extglob = true;
                    token.is_glob = true;
                    i += 1;
                } else {
                    token.is_glob = true;
                }
            }
            b'[' => {
                // The first position after the opener never closes, so `[]]`
                // is a class holding `]` while `[]` stays literal.
                if find_unescaped(bytes, i + 2, b']').is_some() {
                    token.is_bracket = true;
                    token.is_glob = true;
                }
            }
            b'{' => {
                if find_unescaped(bytes, i + 1, b'}').is_some() {
                    token.is_brace = true;
                    token.is_glob = true;
                }
            }
            b'@' | b'!' | b'+' => {
                if !options.noext
                    && bytes.get(i + 1) == Some(&b'(')
                    && find_unescaped(bytes, i + 2, b')').is_some()
                {
                    token.is_extglob = true;
                    token.is_glob = true;
                    i += 1;
                }
            }
            b'(' => {
                if find_unescaped(bytes, i + 1, b')').is_some() {
                    token.is_glob = true;
                }
            }
            _ => {}
        }
        i += 1;
    }
    token
}

fn find_unescaped(bytes: &[u8], mut i: usize, target: u8) -> Option<usize> {
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i] == target {
            return Some(i);
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    fn scan_default(input: &str) -> ScanResult {
        scan(input, &ScanOptions::default())
    }

    #[rstest]
    #[case("a/b/*.js", "", "a/b", "*.js")]
    #[case("a/b.txt", "", "a/b.txt", "")]
    #[case("./x/**/y", "./", "x", "**/y")]
    #[case("/a/*.c", "/", "a", "*.c")]
    #[case("!a/b", "!", "a/b", "")]
    #[case("a/[bc]/d", "", "a", "[bc]/d")]
    #[case("a/\\*.js", "", "a/\\*.js", "")]
    #[case("[a", "", "[a", "")]
    #[case("a/{b,c/d}/e", "", "a", "{b,c/d}/e")]
    #[case("*", "", "", "*")]
    fn test_scan_split(
        #[case] input: &str,
        #[case] prefix: &str,
        #[case] base: &str,
        #[case] glob: &str,
    ) {
        let result = scan_default(input);
        assert_eq!(result.prefix, prefix, "prefix of {input:?}");
        assert_eq!(result.base, base, "base of {input:?}");
        assert_eq!(result.glob, glob, "glob of {input:?}");
    }

    #[rstest]
    #[case("!a", true)]
    #[case("!!a", false)]
    #[case("!!!a", true)]
    #[case("!(a)", false)]
    #[case("a!b", false)]
    fn test_scan_negation(#[case] input: &str, #[case] negated: bool) {
        assert_eq!(scan_default(input).negated, negated);
    }

    #[test]
    fn test_scan_negation_disabled() {
        let result = scan(
            "!a",
            &ScanOptions {
                nonegate: true,
                ..ScanOptions::default()
            },
        );
        assert!(!result.negated);
        assert_eq!(result.base, "!a");
    }

    #[rstest]
    #[case("a/**/b", true)]
    #[case("a/**", true)]
    #[case("**", true)]
    #[case("a**b", false)]
    #[case("a/*/b", false)]
    fn test_scan_globstar_flag(#[case] input: &str, #[case] globstar: bool) {
        assert_eq!(scan_default(input).is_globstar, globstar);
    }

    #[test]
    fn test_scan_feature_flags() {
        let result = scan_default("a/@(x|y)/{1,2}/[cd]");
        assert!(result.is_glob);
        assert!(result.is_extglob);
        assert!(result.is_brace);
        assert!(result.is_bracket);
        assert!(!result.is_globstar);
    }

    #[test]
    fn test_scan_extglob_disabled() {
        let result = scan(
            "@(x|y)",
            &ScanOptions {
                noext: true,
                ..ScanOptions::default()
            },
        );
        assert!(!result.is_extglob);
        // The parenthesis pair still reads as glob syntax.
        assert!(result.is_glob);
    }

    #[test]
    fn test_scan_empty_input() {
        let result = scan_default("");
        assert_eq!(result.prefix, "");
        assert_eq!(result.base, "");
        assert_eq!(result.glob, "");
        assert!(!result.is_glob);
    }

    #[test]
    fn test_scan_tokens_and_parts() {
        let result = scan(
            "src/**/*.rs",
            &ScanOptions {
                tokens: true,
                parts: true,
                ..ScanOptions::default()
            },
        );
        insta::assert_yaml_snapshot!(result, @r###"
        input: src/**/*.rs
        prefix: ""
        base: src
        glob: "**/*.rs"
        negated: false
        is_glob: true
        is_brace: false
        is_bracket: false
        is_extglob: false
        is_globstar: true
        tokens:
          - value: src
            is_glob: false
            is_brace: false
            is_bracket: false
            is_extglob: false
            is_globstar: false
          - value: "**"
            is_glob: true
            is_brace: false
            is_bracket: false
            is_extglob: false
            is_globstar: true
          - value: "*.rs"
            is_glob: true
            is_brace: false
            is_bracket: false
            is_extglob: false
            is_globstar: false
        parts:
          - src
          - "**"
          - "*.rs"
        "###);
    }

    proptest! {
        #[test]
        fn test_scan_classifies_arbitrary_patterns(
            input in "[a-z*?\\[\\]{}()!@+|,./\\\\^$-]{0,24}",
        ) {
            let result = scan(
                &input,
                &ScanOptions {
                    tokens: true,
                    parts: true,
                    ..ScanOptions::default()
                },
            );
            let rest = &input[result.prefix.len()..];
            prop_assert!(rest.starts_with(&result.base));
            prop_assert!(rest.ends_with(&result.glob));
            let parts = result.parts.clone().unwrap_or_default();
            prop_assert_eq!(parts.join("/"), rest);
            if result.negated {
                prop_assert!(result.prefix.starts_with('!'));
            }
            for feature in [
                result.is_brace,
                result.is_bracket,
                result.is_extglob,
                result.is_globstar,
            ] {
                if feature {
                    prop_assert!(result.is_glob);
                }
            }
        }
    }
}
