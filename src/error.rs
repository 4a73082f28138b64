// ABOUTME: Per-pipeline-stage error types, unified by CherryError

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unclassifiable character {0:?}")]
    UnclassifiableChar(char),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected a keyword at the start of the statement")]
    MissingKeyword,

    #[error("expected one of < <= == != >= >, got {0:?}")]
    BadOperator(String),

    #[error("expected an operand, got {0:?}")]
    ExpectedOperand(String),

    #[error("unexpected token in expression: {0:?}")]
    UnexpectedToken(String),

    #[error("unbalanced parentheses in expression")]
    UnbalancedParens,

    #[error("empty expression")]
    EmptyExpression,

    #[error("excess tokens after statement: {0:?}")]
    ExcessTokens(Vec<String>),

    #[error("expected an identifier, string, or numeric argument, got {0:?}")]
    BadArgumentKind(String),

    #[error("expected '(' to open an argument list")]
    MissingOpenParen,

    #[error("expected ')' to close an argument list")]
    MissingCloseParen,

    #[error("expected ']' to close a slice")]
    MissingCloseBracket,

    #[error("unrecognized statement")]
    UnrecognizedStatement,

    #[error("empty statement")]
    EmptyStatement,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("statement at line {0} is outside any function")]
    DanglingStatement(usize),

    #[error("nested 'def' at line {0} is not allowed")]
    NestedDef(usize),

    #[error("'else' at line {0} does not follow an 'if'")]
    ElseWithoutIf(usize),

    #[error("'end' at line {0} does not close any open block")]
    EndWithoutBlock(usize),

    #[error("file ends with {0} unclosed block(s)")]
    UnbalancedAtEof(usize),

    #[error("no 'main' function defined")]
    MissingMain,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("undeclared symbol {0:?}")]
    UndeclaredSymbol(String),

    #[error("{0:?} is a reserved name and cannot be declared")]
    ReservedName(String),

    #[error("cannot assign to const {0:?}")]
    ConstReassignment(String),

    #[error("{context}: type mismatch")]
    TypeMismatch { context: String },

    #[error("{name}: expected {expected} argument(s), got {actual}")]
    ArityMismatch {
        name: String,
        expected: String,
        actual: usize,
    },

    #[error("indexer applied to a non-string value")]
    IndexerOnNonString,

    #[error("slice bounds out of range")]
    SliceOutOfRange,

    #[error("loop condition depends only on static operands and never terminates")]
    InfiniteLoop,

    #[error("call to undefined function {0:?}")]
    UndefinedFunction(String),
}

#[derive(Error, Debug)]
pub enum CherryError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("exit")]
    Exit(i32),
}
