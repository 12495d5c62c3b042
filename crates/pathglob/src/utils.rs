/// The set of characters that carry meaning in regular expression source
/// text and therefore need a backslash when emitted as literals.
pub(crate) fn is_regex_meta(c: char) -> bool {
    matches!(
        c,
        '.' | '+' | '*' | '?' | '^' | '$' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
    )
}

/// Escapes a single character for use as a literal in regex source text.
pub(crate) fn push_escaped(out: &mut String, c: char) {
    if is_regex_meta(c) {
        out.push('\\');
    }
    out.push(c);
}

/// Escapes a whole string for use as a literal in regex source text.
pub(crate) fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        push_escaped(&mut out, c);
    }
    out
}

/// Converts backslash separators to forward slashes. Used to normalize
/// candidate paths before matching when Windows semantics are enabled.
pub(crate) fn to_forward_slashes(input: &str) -> String {
    input.replace('\\', "/")
}

/// Returns the final path segment of `input`, honoring both separator kinds
/// so that unnormalized Windows paths still split correctly.
pub(crate) fn basename(input: &str) -> &str {
    match input.rfind(['/', '\\']) {
        Some(idx) => &input[idx + 1..],
        None => input,
    }
}
