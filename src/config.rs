// ABOUTME: Constants shared by the CLI driver: version string, REPL prompt, welcome banner

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REPL_PROMPT: &str = ">>> ";

pub const WELCOME_MESSAGE: &str = "Cherry Interpreter";
pub const WELCOME_SUBTITLE: &str = "Two blank lines (or Ctrl-D) end the session and run the program.";
