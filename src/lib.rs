// ABOUTME: Library crate root, wires the lex/parse/build/eval pipeline and re-exports it

pub mod alloc;
pub mod ast;
pub mod builder;
pub mod builtins;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod exprtree;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use builder::Builder;
use error::CherryError;
use eval::Evaluator;

/// Runs a complete Cherry program from source text: lexes and parses every
/// line, splices each line's node into the AST, then, only once the whole
/// program has been consumed, evaluates it starting at `main`.
///
/// Returns the process exit code on success (always `0`, since a script can
/// only otherwise leave via the `exit` built-in, surfaced as
/// `CherryError::Exit`).
pub fn run_source(source: &str, warnings: bool) -> Result<i32, CherryError> {
    let mut builder = Builder::new();

    for (i, line) in source.lines().enumerate() {
        let tokens = lexer::lex(line)?;
        if tokens.is_empty() {
            continue;
        }
        let node = parser::parse_line(tokens.into())?;
        builder.feed(i + 1, node)?;
    }

    let (_, signatures) = builder.finish()?;
    let mut evaluator = Evaluator::new(signatures, warnings)?;
    // Cleanup runs at process end regardless of how `main` finished: a bulk
    // heap-clear report on both normal exit and the `exit` built-in's early
    // termination.
    let result = evaluator.run();
    eprintln!("{}", evaluator.cleanup_report());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_a_complete_program() {
        let src = "def main()\nvar x = 2 + 3 * 4\nprint x\nend\n";
        assert_eq!(run_source(src, false).unwrap(), 0);
    }

    #[test]
    fn missing_main_fails() {
        let src = "def notmain()\nend\n";
        assert!(run_source(src, false).is_err());
    }

    #[test]
    fn exit_builtin_surfaces_as_exit_error() {
        let src = "def main()\nexit(7)\nend\n";
        match run_source(src, false) {
            Err(CherryError::Exit(7)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
