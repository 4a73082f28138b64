// ABOUTME: CLI entry point, script mode and REPL mode over the Cherry library pipeline

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use cherry::config::{REPL_PROMPT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use cherry::error::CherryError;
use cherry::run_source;

/// Tree-walking interpreter for the Cherry scripting language.
#[derive(Parser, Debug)]
#[command(name = "cherry")]
#[command(version = VERSION)]
#[command(about = "A tree-walking interpreter for the Cherry scripting language")]
struct CliArgs {
    /// Script file to execute. If omitted, starts an interactive REPL.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Emit "loop condition invariant" and infinite-loop diagnostics.
    #[arg(short = 'w', long = "warnings")]
    warnings: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let source = match &args.script {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("cherry: cannot read {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
        },
        None => match read_repl_source() {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("cherry: {}", e);
                return ExitCode::from(1);
            }
        },
    };

    match run_source(&source, args.warnings) {
        Ok(code) => exit_code(code),
        Err(CherryError::Exit(code)) => exit_code(code),
        Err(e) => {
            eprintln!("cherry: {}", e);
            ExitCode::from(1)
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}

/// Reads interactive input until two consecutive blank lines (or EOF) are
/// seen. Cherry only evaluates after the whole program has been read, so the
/// REPL's job is solely to decide when "the file" is complete: the
/// accumulated text is then run exactly once, the same way a file would be.
fn read_repl_source() -> Result<String, ReadlineError> {
    let mut rl = DefaultEditor::new()?;
    println!("{}", WELCOME_MESSAGE);
    println!("{}", WELCOME_SUBTITLE);

    let mut source = String::new();
    let mut consecutive_blank = 0;

    loop {
        match rl.readline(REPL_PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                if line.trim().is_empty() {
                    consecutive_blank += 1;
                    if consecutive_blank >= 2 {
                        break;
                    }
                } else {
                    consecutive_blank = 0;
                }
                source.push_str(&line);
                source.push('\n');
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(e) => return Err(e),
        }
    }

    Ok(source)
}
