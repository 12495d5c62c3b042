//! Translation of glob patterns into regular-expression source text.
//!
//! The compiler is a single forward pass over the pattern with an explicit
//! stack of open group constructs, so depth never shows up as recursion. A
//! cheap pre-scan first determines which `(` and `{` openers are never
//! closed; the main pass then emits those as literal characters instead of
//! groups. That is the fail-open rule: malformed glob syntax degrades to
//! matching its own literal text and only configuration problems (an empty
//! pattern, a pattern over the length ceiling) surface as errors.
//!
//! Identical pattern and options always produce byte-identical output, so
//! compiled sources can be compared, cached and snapshotted.

pub(crate) mod fragments;
mod fastpaths;

use smallvec::SmallVec;
use thiserror::Error;

use crate::options::{BraceRange, MatchOptions};
use crate::parse::fragments::{posix_class, Fragments};
use crate::utils::{escape_regex, push_escaped};

/// The largest number of values the built-in brace range expansion will
/// enumerate. Wider ranges fall back to literal text.
const MAX_RANGE_VALUES: usize = 1024;

/// Error returned when a glob pattern cannot be accepted for compilation.
///
/// Note that malformed glob syntax is not an error: unterminated constructs
/// are reinterpreted as literal text instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseGlobError {
    /// An empty pattern was provided.
    #[error("cannot compile an empty glob pattern")]
    EmptyPattern,

    /// An empty list of patterns was provided.
    #[error("cannot compile an empty list of glob patterns")]
    EmptyPatternList,

    /// The pattern exceeds the configured length ceiling.
    #[error("glob pattern is {length} bytes long which exceeds the maximum of {max_length}")]
    PatternTooLong {
        /// Byte length of the rejected pattern.
        length: usize,
        /// The configured ceiling, in bytes.
        max_length: usize,
    },
}

/// The intermediate result of compiling a pattern: regex source text for the
/// pattern body plus the properties the regex assembler and match runtime
/// need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseState {
    /// The pattern as given, negation marks included.
    pub input: String,
    /// Regex source for the pattern body, without anchors or flags.
    pub output: String,
    /// `./` when the pattern carried a leading `./` run, empty otherwise.
    pub prefix: String,
    /// The pattern was negated with an odd number of leading `!` marks.
    pub negated: bool,
    /// The entire pattern is a single `!(...)` extglob.
    pub negated_extglob: bool,
    /// Dot segments were made matchable through the options.
    pub dot: bool,
    /// The pattern contains a whole-segment globstar.
    pub globstar: bool,
}

/// Compiles a glob pattern into regex source text.
///
/// Only configuration problems fail; see [`ParseGlobError`]. The returned
/// [`ParseState`] carries unanchored source text, [`crate::make_re`] wraps
/// it into an executable regex.
pub fn parse(pattern: &str, options: &MatchOptions) -> Result<ParseState, ParseGlobError> {
    if pattern.is_empty() {
        return Err(ParseGlobError::EmptyPattern);
    }
    if pattern.len() > options.max_length {
        return Err(ParseGlobError::PatternTooLong {
            length: pattern.len(),
            max_length: options.max_length,
        });
    }

    let (body, negated) = strip_negation(pattern, options);
    let (body, prefix) = strip_dot_slash(body);

    let compiled = if options.fastpaths && fastpaths::eligible(body) {
        fastpaths::compile(body, options)
    } else {
        Compiler::new(body, options).run()
    };

    let frag = Fragments::for_options(options);
    let mut output = compiled.output;
    if !options.strict_slashes && matches!(compiled.last, LastKind::Star | LastKind::Globstar) {
        output.push_str(frag.slash_opt);
    }

    Ok(ParseState {
        input: pattern.to_owned(),
        output,
        prefix: if prefix { "./".to_owned() } else { String::new() },
        negated,
        negated_extglob: compiled.negated_extglob,
        dot: options.dot,
        globstar: compiled.saw_globstar,
    })
}

/// Compiles every pattern in the slice. An empty slice is a configuration
/// error, any other failure is the first per-pattern error.
pub fn parse_many<S: AsRef<str>>(
    patterns: &[S],
    options: &MatchOptions,
) -> Result<Vec<ParseState>, ParseGlobError> {
    if patterns.is_empty() {
        return Err(ParseGlobError::EmptyPatternList);
    }
    patterns
        .iter()
        .map(|pattern| parse(pattern.as_ref(), options))
        .collect()
}

/// Consumes leading `!` negation marks. A `!` that introduces an extglob
/// stays in the body; an even number of marks cancels out but is still
/// consumed.
fn strip_negation<'a>(pattern: &'a str, options: &MatchOptions) -> (&'a str, bool) {
    if options.nonegate {
        return (pattern, false);
    }
    let bytes = pattern.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() && bytes[idx] == b'!' {
        let introduces_extglob = !options.noextglob
            && bytes.get(idx + 1) == Some(&b'(')
            && bytes.get(idx + 2) != Some(&b'?');
        if introduces_extglob {
            break;
        }
        idx += 1;
    }
    (&pattern[idx..], idx % 2 == 1)
}

/// Strips leading `./` runs. The compiled regex gets an optional `\./`
/// prefix back so both spellings of the path still match.
fn strip_dot_slash(body: &str) -> (&str, bool) {
    let mut rest = body;
    let mut stripped = false;
    while let Some(shorter) = rest.strip_prefix("./") {
        rest = shorter;
        stripped = true;
    }
    (rest, stripped)
}

/// What the most recent emission was, which decides whether the pattern end
/// tolerates a trailing separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LastKind {
    None,
    Literal,
    Slash,
    Star,
    Globstar,
    Qmark,
    Bracket,
    GroupClose,
}

/// Output of one compiler pass over a pattern body.
pub(super) struct CompiledBody {
    pub(super) output: String,
    pub(super) saw_globstar: bool,
    pub(super) negated_extglob: bool,
    pub(super) last: LastKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExtglobKind {
    At,
    Not,
    Plus,
    Star,
    Qmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Brace,
    Paren,
    Extglob(ExtglobKind),
}

/// One open group construct on the compiler stack.
#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    /// Segment-start status when the group opened. Restored at every
    /// alternative so dot gating applies per branch.
    entered_seg_start: bool,
    /// The group opened at the very start of the pattern body.
    opened_at_start: bool,
    /// A separator was emitted while this group was open.
    has_slash: bool,
}

pub(super) struct Compiler<'a> {
    body: &'a str,
    bytes: &'a [u8],
    options: &'a MatchOptions,
    frag: &'static Fragments,
    out: String,
    pos: usize,
    /// The next emission sits at the start of a path segment.
    seg_start: bool,
    /// The current segment consists of exactly one literal dot so far.
    after_seg_dot: bool,
    frames: SmallVec<[Frame; 4]>,
    literal_parens: Vec<usize>,
    literal_braces: Vec<usize>,
    saw_globstar: bool,
    negated_extglob: bool,
    last: LastKind,
}

impl<'a> Compiler<'a> {
    pub(super) fn new(body: &'a str, options: &'a MatchOptions) -> Self {
        Self {
            body,
            bytes: body.as_bytes(),
            options,
            frag: Fragments::for_options(options),
            out: String::with_capacity(body.len() * 2),
            pos: 0,
            seg_start: true,
            after_seg_dot: false,
            frames: SmallVec::new(),
            literal_parens: Vec::new(),
            literal_braces: Vec::new(),
            saw_globstar: false,
            negated_extglob: false,
            last: LastKind::None,
        }
    }

    pub(super) fn run(mut self) -> CompiledBody {
        let (parens, braces) = mark_unmatched_openers(self.bytes, self.options);
        if !parens.is_empty() || !braces.is_empty() {
            tracing::debug!(
                pattern = self.body,
                unmatched_parens = parens.len(),
                unmatched_braces = braces.len(),
                "unterminated group openers are compiled as literal text"
            );
        }
        self.literal_parens = parens;
        self.literal_braces = braces;

        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.handle_escape(),
                b'/' => {
                    self.emit_slash();
                    self.pos += 1;
                }
                b'*' => {
                    if self.try_open_extglob(ExtglobKind::Star) {
                        continue;
                    }
                    self.handle_star_run();
                }
                b'?' => {
                    if self.try_open_extglob(ExtglobKind::Qmark) {
                        continue;
                    }
                    self.emit_qmark();
                    self.pos += 1;
                }
                b'[' => self.handle_bracket(),
                b'{' => self.handle_brace_open(),
                b'}' => {
                    if self.innermost(FrameKind::Brace) {
                        self.frames.pop();
                        self.out.push(')');
                        self.close_group();
                    } else {
                        self.emit_literal('}');
                    }
                    self.pos += 1;
                }
                b',' => {
                    if self.innermost(FrameKind::Brace) {
                        self.out.push('|');
                        self.start_alternative();
                    } else {
                        self.emit_literal(',');
                    }
                    self.pos += 1;
                }
                b'(' => {
                    if self.literal_parens.binary_search(&self.pos).is_ok() || self.options.noextglob
                    {
                        self.emit_literal('(');
                    } else {
                        self.push_frame(FrameKind::Paren);
                        self.out.push_str("(?:");
                    }
                    self.pos += 1;
                }
                b')' => {
                    if self.paren_frame_open() {
                        self.close_paren_frame();
                    } else {
                        self.emit_literal(')');
                    }
                    self.pos += 1;
                }
                b'|' => {
                    if self.paren_frame_open() {
                        self.out.push('|');
                        self.start_alternative();
                    } else {
                        self.emit_literal('|');
                    }
                    self.pos += 1;
                }
                b'@' => {
                    if self.try_open_extglob(ExtglobKind::At) {
                        continue;
                    }
                    self.emit_literal('@');
                    self.pos += 1;
                }
                b'!' => {
                    if self.try_open_extglob(ExtglobKind::Not) {
                        continue;
                    }
                    self.emit_literal('!');
                    self.pos += 1;
                }
                b'+' => {
                    if self.try_open_extglob(ExtglobKind::Plus) {
                        continue;
                    }
                    self.emit_literal('+');
                    self.pos += 1;
                }
                _ => {
                    let c = self.next_char();
                    self.emit_literal(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        debug_assert!(
            self.frames.is_empty(),
            "pre-scan guarantees every opened group closes"
        );

        CompiledBody {
            output: self.out,
            saw_globstar: self.saw_globstar,
            negated_extglob: self.negated_extglob,
            last: self.last,
        }
    }

    fn next_char(&self) -> char {
        self.body[self.pos..]
            .chars()
            .next()
            .expect("position is always on a character boundary")
    }

    fn innermost(&self, kind: FrameKind) -> bool {
        self.frames.last().is_some_and(|frame| frame.kind == kind)
    }

    fn paren_frame_open(&self) -> bool {
        matches!(
            self.frames.last().map(|frame| frame.kind),
            Some(FrameKind::Paren | FrameKind::Extglob(_))
        )
    }

    fn push_frame(&mut self, kind: FrameKind) {
        self.frames.push(Frame {
            kind,
            entered_seg_start: self.seg_start,
            opened_at_start: self.pos == 0,
            has_slash: false,
        });
    }

    /// Restores segment-start status at `|` and `,` so every alternative of
    /// a group is gated the same way as the first one.
    fn start_alternative(&mut self) {
        if let Some(frame) = self.frames.last() {
            self.seg_start = frame.entered_seg_start;
        }
        self.after_seg_dot = false;
        self.last = LastKind::None;
    }

    fn close_group(&mut self) {
        self.seg_start = false;
        self.after_seg_dot = false;
        self.last = LastKind::GroupClose;
    }

    fn emit_literal(&mut self, c: char) {
        push_escaped(&mut self.out, c);
        self.after_seg_dot = self.seg_start && c == '.';
        self.seg_start = false;
        self.last = LastKind::Literal;
    }

    fn handle_escape(&mut self) {
        match self.body[self.pos + 1..].chars().next() {
            Some(c) => {
                self.emit_literal(c);
                self.pos += 1 + c.len_utf8();
            }
            None => {
                // A lone trailing backslash matches a literal backslash.
                self.emit_literal('\\');
                self.pos += 1;
            }
        }
    }

    fn emit_slash(&mut self) {
        self.out.push_str(self.frag.slash);
        for frame in &mut self.frames {
            frame.has_slash = true;
        }
        self.seg_start = true;
        self.after_seg_dot = false;
        self.last = LastKind::Slash;
    }

    fn emit_qmark(&mut self) {
        if self.seg_start && !self.options.dot && !self.after_seg_dot {
            self.out.push_str(self.frag.qmark_no_dot);
        } else {
            self.out.push_str(self.frag.qmark);
        }
        self.seg_start = false;
        self.after_seg_dot = false;
        self.last = LastKind::Qmark;
    }

    /// Emits one star for a run of `*`s, with the dot gate and one-char
    /// assertion at segment starts.
    fn emit_star(&mut self) {
        let star = self.frag.star(self.options.bash);
        if self.after_seg_dot {
            self.out.push_str(self.frag.no_dot_slash);
            self.out.push_str(star);
        } else if self.seg_start {
            if self.options.dot {
                self.out.push_str(self.frag.no_dots_slash);
            } else {
                self.out.push_str(self.frag.no_dot);
            }
            self.out.push_str(self.frag.one_char);
            self.out.push_str(star);
        } else {
            self.out.push_str(star);
        }
        self.seg_start = false;
        self.after_seg_dot = false;
        self.last = LastKind::Star;
    }

    /// Handles a run of consecutive stars: a whole-segment `**` becomes a
    /// globstar, anything else collapses into a single star. A star that
    /// introduces an extglob is not part of the run, so `**(a)` reads as
    /// `*` followed by the zero-or-more group `*(a)`.
    fn handle_star_run(&mut self) {
        let mut run_len = 0;
        while self.bytes.get(self.pos) == Some(&b'*') {
            if run_len > 0 && self.extglob_opens_at(self.pos) {
                break;
            }
            run_len += 1;
            self.pos += 1;
        }
        let next = self.bytes.get(self.pos).copied();

        let whole_segment = self.seg_start
            && run_len >= 2
            && !self.options.noglobstar
            && matches!(next, None | Some(b'/'));
        if !whole_segment {
            self.emit_star();
            return;
        }

        self.saw_globstar = true;
        match next {
            None => self.emit_globstar_at_end(),
            Some(_) => {
                // Fold consecutive `**/` segments into one group; a chain
                // ending in a final `**` behaves like a single trailing
                // globstar.
                let mut after = self.pos + 1;
                loop {
                    match bare_globstar_at(self.bytes, after) {
                        Some((end, true)) => {
                            self.pos = end;
                            self.emit_globstar_at_end();
                            return;
                        }
                        Some((end, false)) => after = end + 1,
                        None => break,
                    }
                }
                // Segments and separator are optional as a whole, so
                // `a/**/c` matches `a/c` and `foo/**/` matches `foo/`. The
                // gate hides a dot right at group entry; the globstar body
                // only guards dots after the separators it consumes itself.
                self.out.push_str("(?:");
                self.out.push_str(self.globstar_gate());
                self.out.push_str(self.frag.globstar(self.options.dot));
                self.out.push_str(self.frag.slash);
                self.out.push_str(")?");
                for frame in &mut self.frames {
                    frame.has_slash = true;
                }
                self.pos = after;
                self.seg_start = true;
                self.after_seg_dot = false;
                self.last = LastKind::Slash;
            }
        }
    }

    /// A globstar that ends the pattern: folded into the preceding separator
    /// so `a/**` also matches `a`. A bare globstar needs no entry gate, its
    /// body rejects a dot at string start.
    fn emit_globstar_at_end(&mut self) {
        let globstar = self.frag.globstar(self.options.dot);
        if self.last == LastKind::Slash {
            self.out.truncate(self.out.len() - self.frag.slash.len());
            self.out.push_str("(?:");
            self.out.push_str(self.frag.slash);
            self.out.push_str(self.globstar_gate());
            self.out.push_str(globstar);
            self.out.push_str(")?");
        } else {
            self.out.push_str(globstar);
        }
        self.seg_start = false;
        self.after_seg_dot = false;
        self.last = LastKind::Globstar;
    }

    fn globstar_gate(&self) -> &'static str {
        if self.options.dot {
            self.frag.no_dots_slash
        } else {
            self.frag.no_dot
        }
    }

    /// An extglob can open at `pos`: the sigil there is directly followed
    /// by a paren with a matching closer.
    fn extglob_opens_at(&self, pos: usize) -> bool {
        !self.options.noextglob
            && self.bytes.get(pos + 1) == Some(&b'(')
            && self.literal_parens.binary_search(&(pos + 1)).is_err()
    }

    /// Opens an extglob if the current sigil is directly followed by a
    /// paren that closes somewhere. Returns false to let the sigil be
    /// handled by its plain meaning.
    fn try_open_extglob(&mut self, kind: ExtglobKind) -> bool {
        if !self.extglob_opens_at(self.pos) {
            return false;
        }
        self.push_frame(FrameKind::Extglob(kind));
        self.out.push_str(match kind {
            ExtglobKind::Not => "(?:(?!(?:",
            _ => "(?:",
        });
        self.pos += 2;
        true
    }

    fn close_paren_frame(&mut self) {
        let frame = self
            .frames
            .pop()
            .expect("caller checked an open paren frame exists");
        match frame.kind {
            FrameKind::Paren | FrameKind::Brace => self.out.push(')'),
            FrameKind::Extglob(kind) => match kind {
                ExtglobKind::At => self.out.push(')'),
                ExtglobKind::Plus => self.out.push_str(")+"),
                ExtglobKind::Star => self.out.push_str(")*"),
                ExtglobKind::Qmark => self.out.push_str(")?"),
                ExtglobKind::Not => self.close_negated_extglob(&frame),
            },
        }
        self.close_group();
    }

    /// Emits the tail of a `!(...)` group: a negative lookahead over the
    /// alternatives followed by a star consuming what the lookahead
    /// admitted. At the pattern end the lookahead is anchored so the
    /// alternatives are rejected as whole values.
    fn close_negated_extglob(&mut self, frame: &Frame) {
        let star = if frame.has_slash {
            self.frag.globstar(self.options.dot)
        } else {
            self.frag.star(self.options.bash)
        };
        let rest = &self.bytes[self.pos + 1..];
        let at_end = rest.iter().all(|&b| b == b')');
        let gate = frame.entered_seg_start && !self.options.dot;

        if frame.has_slash || at_end {
            self.out.push_str(")$))");
        } else {
            self.out.push_str("))");
        }
        if gate {
            self.out.push_str(self.frag.no_dot);
        }
        self.out.push_str(star);
        if !(frame.has_slash || at_end) {
            self.out.push(')');
        }

        if frame.opened_at_start && rest.is_empty() {
            self.negated_extglob = true;
        }
    }

    /// Compiles a bracket expression. Without a closer the opener is a
    /// literal `[`. Classes never match a separator: negated classes exclude
    /// it explicitly and a positive class with a separator member falls back
    /// to literal text. A class with a reversed range, which no regex
    /// accepts, falls back the same way; the rest of the pattern stays live.
    fn handle_bracket(&mut self) {
        let Some(end) = bracket_end(self.bytes, self.pos, self.options.posix) else {
            self.emit_literal('[');
            self.pos += 1;
            return;
        };
        let content = &self.body[self.pos + 1..end];
        let (negated, inner) = match content.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, content),
        };
        if (!negated && inner.contains('/')) || class_has_reversed_range(inner) {
            let raw = &self.body[self.pos..=end];
            self.out.push_str(&escape_regex(raw));
            self.pos = end + 1;
            self.seg_start = false;
            self.after_seg_dot = false;
            self.last = LastKind::Literal;
            return;
        }

        if self.seg_start && !self.options.dot && !self.after_seg_dot {
            self.out.push_str(self.frag.no_dot);
        }

        self.out.push('[');
        if negated {
            self.out.push('^');
        }
        self.emit_bracket_content(inner);
        if negated && !inner.contains('/') {
            self.out.push('/');
        }
        self.out.push(']');

        self.pos = end + 1;
        self.seg_start = false;
        self.after_seg_dot = false;
        self.last = LastKind::Bracket;
    }

    fn emit_bracket_content(&mut self, inner: &str) {
        let bytes = inner.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    self.out.push('\\');
                    match inner[i + 1..].chars().next() {
                        Some(c) => {
                            self.out.push(c);
                            i += 1 + c.len_utf8();
                        }
                        None => {
                            self.out.push('\\');
                            i += 1;
                        }
                    }
                }
                b'[' => {
                    if let Some((name, after)) = posix_span(inner, i) {
                        if self.options.posix {
                            match posix_class(name) {
                                Some(set) => self.out.push_str(set),
                                None => {
                                    self.out.push_str("\\[:");
                                    self.out.push_str(name);
                                    self.out.push_str(":\\]");
                                }
                            }
                            i = after;
                            continue;
                        }
                    }
                    self.out.push_str("\\[");
                    i += 1;
                }
                b']' => {
                    self.out.push_str("\\]");
                    i += 1;
                }
                // Doubled `&` and `~` are set operations in the regex
                // dialect, never in glob classes.
                b'&' => {
                    self.out.push_str("\\&");
                    i += 1;
                }
                b'~' => {
                    self.out.push_str("\\~");
                    i += 1;
                }
                _ => {
                    let c = inner[i..].chars().next().expect("index is on a boundary");
                    self.out.push(c);
                    i += c.len_utf8();
                }
            }
        }
    }

    /// Compiles a brace construct: a range form expands to an alternation of
    /// its values, anything else opens an alternation group over commas.
    fn handle_brace_open(&mut self) {
        if self.options.nobrace || self.literal_braces.binary_search(&self.pos).is_ok() {
            self.emit_literal('{');
            self.pos += 1;
            return;
        }
        let end = match brace_end(self.bytes, self.pos, self.options.posix) {
            Some(end) => end,
            None => {
                self.emit_literal('{');
                self.pos += 1;
                return;
            }
        };
        let content = &self.body[self.pos + 1..end];

        if content.is_empty() {
            self.out.push_str("\\{\\}");
            self.pos = end + 1;
            self.seg_start = false;
            self.after_seg_dot = false;
            self.last = LastKind::Literal;
            return;
        }

        if range_shaped(content) {
            let expansion = parse_brace_range(content).and_then(|range| {
                self.options
                    .expand_range
                    .as_ref()
                    .and_then(|hook| hook(&range, self.options))
                    .or_else(|| expand_brace_range(&range))
            });
            match expansion {
                Some(text) => {
                    self.out.push_str(&text);
                    self.last = LastKind::GroupClose;
                }
                None => {
                    let raw = &self.body[self.pos..=end];
                    self.out.push_str(&escape_regex(raw));
                    self.last = LastKind::Literal;
                }
            }
            self.pos = end + 1;
            self.seg_start = false;
            self.after_seg_dot = false;
            return;
        }

        self.push_frame(FrameKind::Brace);
        self.out.push_str("(?:");
        self.pos += 1;
    }
}

/// Byte position right after a bare `**` starting at `from`, plus whether
/// it ends the pattern. `None` when the text there is not a bare globstar
/// segment.
fn bare_globstar_at(bytes: &[u8], from: usize) -> Option<(usize, bool)> {
    let mut end = from;
    while bytes.get(end) == Some(&b'*') {
        end += 1;
    }
    if end - from < 2 {
        return None;
    }
    match bytes.get(end) {
        None => Some((end, true)),
        Some(&b'/') => Some((end, false)),
        Some(_) => None,
    }
}

/// Finds the `]` closing a bracket expression opened at `open`. The first
/// content position never closes, so `[]]` is a class holding `]`. With
/// `posix`, `[:name:]` spans are skipped so `[[:alpha:]]` closes after the
/// class.
fn bracket_end(bytes: &[u8], open: usize, posix: bool) -> Option<usize> {
    let mut i = open + 1;
    if matches!(bytes.get(i), Some(&b'^') | Some(&b'!')) {
        i += 1;
    }
    if bytes.get(i) == Some(&b']') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'[' if posix && bytes.get(i + 1) == Some(&b':') => {
                let mut j = i + 2;
                loop {
                    match bytes.get(j) {
                        Some(&b':') if bytes.get(j + 1) == Some(&b']') => {
                            i = j + 2;
                            break;
                        }
                        Some(_) => j += 1,
                        None => return None,
                    }
                }
            }
            b']' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Finds the `}` matching the `{` at `open`, honoring escapes, nesting and
/// bracket spans.
fn brace_end(bytes: &[u8], open: usize, posix: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => {
                if let Some(end) = bracket_end(bytes, i, posix) {
                    i = end;
                }
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Whether class content holds a range whose start sorts above its end,
/// like `z-a`. No regex dialect accepts such a range, so the compiler turns
/// the class into literal text instead of emitting it.
fn class_has_reversed_range(content: &str) -> bool {
    let mut chars = content.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        match c {
            '\\' => prev = chars.next(),
            '-' if prev.is_some() && chars.peek().is_some() => {
                let end = match chars.next() {
                    Some('\\') => chars.next(),
                    other => other,
                };
                match (prev, end) {
                    (Some(start), Some(end)) if start > end => return true,
                    // A completed range cannot start another one.
                    _ => prev = None,
                }
            }
            _ => prev = Some(c),
        }
    }
    false
}

/// The `[:name:]` span starting at `at`, as the name and the position after
/// the span.
fn posix_span(inner: &str, at: usize) -> Option<(&str, usize)> {
    let bytes = inner.as_bytes();
    if bytes.get(at + 1) != Some(&b':') {
        return None;
    }
    let mut j = at + 2;
    while j < bytes.len() {
        if bytes[j] == b':' && bytes.get(j + 1) == Some(&b']') {
            return Some((&inner[at + 2..j], j + 2));
        }
        j += 1;
    }
    None
}

/// Brace content that reads as a range attempt: it contains `..` and none of
/// the characters that make it an alternation or a path. Range attempts
/// either expand or degrade to literal text; they never become alternation
/// groups.
fn range_shaped(content: &str) -> bool {
    content.contains("..")
        && !content
            .bytes()
            .any(|b| matches!(b, b',' | b'{' | b'}' | b'/' | b'\\'))
}

/// Splits range-shaped brace content into its `a..b` or `a..b..step` parts.
/// The split is purely structural; whether the endpoints make a usable range
/// is decided during expansion.
fn parse_brace_range(content: &str) -> Option<BraceRange<'_>> {
    let mut parts = content.split("..");
    let start = parts.next()?;
    let end = parts.next()?;
    let step = parts.next();
    if parts.next().is_some() {
        return None;
    }
    Some(BraceRange { start, end, step })
}

/// The built-in range expansion: an alternation of every value in the
/// range. Endpoints must both be integers or both be single alphabetic
/// characters. Returns `None` for ranges that are malformed or too wide,
/// which the caller turns into literal text.
fn expand_brace_range(range: &BraceRange<'_>) -> Option<String> {
    let step = match range.step {
        Some(step) => step.parse::<i64>().ok()?.unsigned_abs(),
        None => 1,
    };
    if step == 0 {
        return None;
    }

    let values = match (range.start.parse::<i64>(), range.end.parse::<i64>()) {
        (Ok(start), Ok(end)) => {
            // Compared as u64: narrowing first would wrap huge spans past
            // the cap on 32-bit targets.
            if start.abs_diff(end) / step >= MAX_RANGE_VALUES as u64 {
                return None;
            }
            let step = i64::try_from(step).ok()?;
            let width = if has_leading_zeros(range.start) || has_leading_zeros(range.end) {
                range.start.len().max(range.end.len())
            } else {
                0
            };
            let mut values = Vec::new();
            let mut current = start;
            loop {
                values.push(format!("{current:0width$}"));
                if current == end {
                    break;
                }
                let next = if start <= end {
                    current.checked_add(step)
                } else {
                    current.checked_sub(step)
                };
                match next {
                    Some(next) if (start <= end && next <= end) || (start > end && next >= end) => {
                        current = next;
                    }
                    _ => break,
                }
            }
            values
        }
        _ => {
            if range.start.parse::<i64>().is_ok() || range.end.parse::<i64>().is_ok() {
                return None;
            }
            let (start, end) = (single_char(range.start)?, single_char(range.end)?);
            if !start.is_ascii_alphabetic() || !end.is_ascii_alphabetic() {
                return None;
            }
            let (start, end) = (start as u32, end as u32);
            if start.abs_diff(end) as u64 / step >= MAX_RANGE_VALUES as u64 {
                return None;
            }
            let step = u32::try_from(step).unwrap_or(u32::MAX);
            let mut values = Vec::new();
            let mut current = start;
            loop {
                let c = char::from_u32(current)?;
                let mut value = String::new();
                push_escaped(&mut value, c);
                values.push(value);
                if current == end {
                    break;
                }
                let next = if start <= end {
                    current.checked_add(step)
                } else {
                    current.checked_sub(step)
                };
                match next {
                    Some(next) if (start <= end && next <= end) || (start > end && next >= end) => {
                        current = next;
                    }
                    _ => break,
                }
            }
            values
        }
    };

    Some(format!("(?:{})", values.join("|")))
}

fn has_leading_zeros(part: &str) -> bool {
    let digits = part.strip_prefix(['-', '+']).unwrap_or(part);
    digits.len() > 1 && digits.starts_with('0')
}

fn single_char(part: &str) -> Option<char> {
    let mut chars = part.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

/// Simulates the main pass's group discipline to find `(` and `{` openers
/// that never close. The main pass emits those as literal characters.
fn mark_unmatched_openers(bytes: &[u8], options: &MatchOptions) -> (Vec<usize>, Vec<usize>) {
    let mut stack: SmallVec<[(u8, usize); 8]> = SmallVec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => {
                if let Some(end) = bracket_end(bytes, i, options.posix) {
                    i = end;
                }
            }
            b'(' if !options.noextglob => stack.push((b'(', i)),
            b')' if !options.noextglob => {
                if stack.last().map(|entry| entry.0) == Some(b'(') {
                    stack.pop();
                }
            }
            b'{' if !options.nobrace => stack.push((b'{', i)),
            b'}' if !options.nobrace => {
                if stack.last().map(|entry| entry.0) == Some(b'{') {
                    stack.pop();
                }
            }
            _ => {}
        }
        i += 1;
    }
    let mut parens = Vec::new();
    let mut braces = Vec::new();
    for (byte, pos) in stack {
        if byte == b'(' {
            parens.push(pos);
        } else {
            braces.push(pos);
        }
    }
    (parens, braces)
}
