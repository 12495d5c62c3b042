//! Reduced compilation loop for the common case: patterns made of literal
//! text, separators and simple wildcards. It skips the opener pre-scan and
//! all group bookkeeping but drives the same emitters as the full pass, so
//! the output is byte-identical.

use crate::options::MatchOptions;

use super::{CompiledBody, Compiler};

/// Whether the reduced loop can compile this body: nothing that escapes,
/// opens a class or group, or marks an extglob or alternation.
pub(super) fn eligible(body: &str) -> bool {
    !body.bytes().any(|b| {
        matches!(
            b,
            b'\\' | b'[' | b']' | b'{' | b'}' | b'(' | b')' | b'!' | b'@' | b'+' | b'|'
        )
    })
}

/// Compiles an eligible pattern body.
pub(super) fn compile(body: &str, options: &MatchOptions) -> CompiledBody {
    Compiler::new(body, options).run_reduced()
}

impl Compiler<'_> {
    fn run_reduced(mut self) -> CompiledBody {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'/' => {
                    self.emit_slash();
                    self.pos += 1;
                }
                b'*' => self.handle_star_run(),
                b'?' => {
                    self.emit_qmark();
                    self.pos += 1;
                }
                _ => {
                    let c = self.next_char();
                    self.emit_literal(c);
                    self.pos += c.len_utf8();
                }
            }
        }
        CompiledBody {
            output: self.out,
            saw_globstar: self.saw_globstar,
            negated_extglob: false,
            last: self.last,
        }
    }
}
