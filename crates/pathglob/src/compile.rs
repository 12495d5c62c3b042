//! Assembly of parsed pattern bodies into executable regular expressions.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use fancy_regex::Regex;

use crate::options::MatchOptions;
use crate::parse::fragments::Fragments;
use crate::parse::{parse, ParseGlobError, ParseState};
use crate::utils::escape_regex;

/// A glob pattern compiled down to a regular expression.
///
/// The regex is reference counted, so cloning a compiled glob is cheap.
/// Two compiled globs are equal when their regex sources are equal, so
/// equality tracks the pattern text and the options that shape compiled
/// output.
#[derive(Debug, Clone)]
pub struct CompiledGlob {
    regex: Arc<Regex>,
    source: String,
    state: ParseState,
    options: MatchOptions,
}

impl CompiledGlob {
    /// The source text of the compiled regular expression.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The parse result the regex was assembled from.
    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// The options the pattern was compiled with.
    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// A copy of this compilation carrying `options` instead of the options
    /// it was compiled with. Valid only for options under which the same
    /// source would have been produced; the regex is shared as-is.
    pub(crate) fn with_options(&self, options: &MatchOptions) -> Self {
        Self {
            regex: Arc::clone(&self.regex),
            source: self.source.clone(),
            state: self.state.clone(),
            options: options.clone(),
        }
    }

    /// Runs the compiled regex against the input as-is.
    ///
    /// This is the raw engine call: no input formatting, separator
    /// normalization or basename routing happens here. Use [`crate::test`]
    /// or a [`crate::Matcher`] for the full pipeline. An engine failure,
    /// like exceeding the backtracking limit, counts as a non-match.
    pub fn is_match(&self, input: &str) -> bool {
        match self.regex.is_match(input) {
            Ok(matched) => matched,
            Err(error) => {
                tracing::warn!(
                    %error,
                    pattern = %self.state.input,
                    "regex engine failed, treating input as a non-match"
                );
                false
            }
        }
    }

    /// Byte range of the first regex match in the input. Engine failures
    /// count as no match.
    pub(crate) fn find_match(&self, input: &str) -> Option<(usize, usize)> {
        match self.regex.find(input) {
            Ok(found) => found.map(|found| (found.start(), found.end())),
            Err(error) => {
                tracing::warn!(
                    %error,
                    pattern = %self.state.input,
                    "regex engine failed, treating input as a non-match"
                );
                None
            }
        }
    }
}

impl PartialEq for CompiledGlob {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for CompiledGlob {}

impl fmt::Display for CompiledGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for CompiledGlob {
    type Err = ParseGlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        make_re(s, &MatchOptions::new())
    }
}

/// Compiles a glob pattern into a [`CompiledGlob`].
///
/// Malformed glob syntax is not an error: constructs without a closing
/// counterpart match their own literal text, and should the emitted source
/// ever be rejected by the regex engine the whole pattern degrades to
/// matching its literal text. Only configuration problems fail, see
/// [`ParseGlobError`].
pub fn make_re(pattern: &str, options: &MatchOptions) -> Result<CompiledGlob, ParseGlobError> {
    let state = parse(pattern, options)?;
    let source = assemble(&state, options);
    let (regex, source) = match Regex::new(&source) {
        Ok(regex) => (regex, source),
        Err(error) => {
            tracing::debug!(
                %error,
                pattern = %state.input,
                "emitted source was rejected by the regex engine, matching the pattern text literally"
            );
            let literal = assemble_literal(&state, options);
            let regex = Regex::new(&literal).expect("escaped literal text always compiles");
            (regex, literal)
        }
    };
    Ok(CompiledGlob {
        regex: Arc::new(regex),
        source,
        state,
        options: options.clone(),
    })
}

/// Wraps a parsed body into final regex source: the optional `./` prefix,
/// anchors unless matching anywhere is requested, the negation wrapper and
/// the case-insensitivity flag.
fn assemble(state: &ParseState, options: &MatchOptions) -> String {
    let frag = Fragments::for_options(options);
    let mut body = String::with_capacity(state.output.len() + 16);
    if !state.prefix.is_empty() {
        body.push_str("(?:\\.");
        body.push_str(frag.slash);
        body.push_str(")?");
    }
    body.push_str(&state.output);

    let mut source = if options.contains {
        format!("(?:{body})")
    } else {
        format!("^(?:{body})$")
    };
    if state.negated {
        source = format!("^(?!{source}).*$");
    }
    if options.nocase {
        source.insert_str(0, "(?i)");
    }
    source
}

fn assemble_literal(state: &ParseState, options: &MatchOptions) -> String {
    let mut source = format!("^(?:{})$", escape_regex(&state.input));
    if options.nocase {
        source.insert_str(0, "(?i)");
    }
    source
}
