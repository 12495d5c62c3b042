//! Platform-specific pieces of regex source text used by the pattern
//! compiler. The POSIX table treats `/` as the only separator; the Windows
//! table widens every separator position to `[\\/]` so patterns compiled for
//! Windows also accept unnormalized backslash paths.

use crate::options::MatchOptions;

/// Regex source fragments for one separator convention.
pub(crate) struct Fragments {
    /// A literal separator.
    pub slash: &'static str,
    /// An optional trailing separator, appended to patterns that end in a
    /// wildcard unless strict slash handling is requested.
    pub slash_opt: &'static str,
    /// One character that is not a separator.
    pub qmark: &'static str,
    /// One character that is neither a separator nor a dot.
    pub qmark_no_dot: &'static str,
    /// Any run of non-separator characters, shortest first.
    pub star: &'static str,
    /// Asserts the segment does not start with a dot.
    pub no_dot: &'static str,
    /// Asserts what follows does not complete a `.` or `..` segment. Used
    /// after a consumed literal dot so `.*` skips `.` and `..`.
    pub no_dot_slash: &'static str,
    /// Asserts the segment is not exactly `.` or `..`.
    pub no_dots_slash: &'static str,
    /// Asserts at least one character follows.
    pub one_char: &'static str,
    globstar_no_dot: &'static str,
    globstar_dot: &'static str,
}

pub(crate) static POSIX: Fragments = Fragments {
    slash: "/",
    slash_opt: "/?",
    qmark: "[^/]",
    qmark_no_dot: "[^./]",
    star: "[^/]*?",
    no_dot: "(?!\\.)",
    no_dot_slash: "(?!\\.{0,1}(?:/|$))",
    no_dots_slash: "(?!\\.{1,2}(?:/|$))",
    one_char: "(?=.)",
    globstar_no_dot: "(?:(?!(?:/|^)\\.).)*?",
    globstar_dot: "(?:(?!(?:/|^)\\.{1,2}(?:/|$)).)*?",
};

pub(crate) static WINDOWS: Fragments = Fragments {
    slash: "[\\\\/]",
    slash_opt: "[\\\\/]?",
    qmark: "[^\\\\/]",
    qmark_no_dot: "[^.\\\\/]",
    star: "[^\\\\/]*?",
    no_dot: "(?!\\.)",
    no_dot_slash: "(?!\\.{0,1}(?:[\\\\/]|$))",
    no_dots_slash: "(?!\\.{1,2}(?:[\\\\/]|$))",
    one_char: "(?=.)",
    globstar_no_dot: "(?:(?!(?:[\\\\/]|^)\\.).)*?",
    globstar_dot: "(?:(?!(?:[\\\\/]|^)\\.{1,2}(?:[\\\\/]|$)).)*?",
};

impl Fragments {
    /// Selects the fragment table matching the separator convention of the
    /// given options.
    pub(crate) fn for_options(options: &MatchOptions) -> &'static Fragments {
        if options.windows {
            &WINDOWS
        } else {
            &POSIX
        }
    }

    /// A whole-segment globstar body. With `dot` the body may enter dot
    /// segments other than `.` and `..`; without it any dot-led segment is
    /// off limits.
    pub(crate) fn globstar(&self, dot: bool) -> &'static str {
        if dot {
            self.globstar_dot
        } else {
            self.globstar_no_dot
        }
    }

    /// The star body honoring the bash flavor, where `*` crosses separators.
    pub(crate) fn star(&self, bash: bool) -> &'static str {
        if bash {
            ".*?"
        } else {
            self.star
        }
    }
}

/// Resolves a POSIX bracket class name like `alpha` in `[[:alpha:]]` to the
/// character-set text it stands for. Unknown names resolve to `None` and are
/// treated as ordinary bracket content.
pub(crate) fn posix_class(name: &str) -> Option<&'static str> {
    Some(match name {
        "alnum" => "a-zA-Z0-9",
        "alpha" => "a-zA-Z",
        "ascii" => "\\x00-\\x7F",
        "blank" => " \\t",
        "cntrl" => "\\x00-\\x1F\\x7F",
        "digit" => "0-9",
        "graph" => "\\x21-\\x7E",
        "lower" => "a-z",
        "print" => "\\x20-\\x7E",
        "punct" => "\\-!\"#$%&'()\\*+,./:;<=>?@\\[\\]^_`{|}~",
        "space" => " \\t\\r\\n\\x0B\\x0C",
        "upper" => "A-Z",
        "word" => "A-Za-z0-9_",
        "xdigit" => "A-Fa-f0-9",
        _ => return None,
    })
}
