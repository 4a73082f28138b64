// ABOUTME: AST node types, the typed statements produced by the parser and builder

/// A node in an arithmetic expression tree (shunting-yard output).
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Number(f64),
    Ident(String),
    BinOp {
        op: char,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
}

/// A sub-expression result, tagged by what resolving it requires at
/// evaluation time: the "type of stored buffer" behind each statement's payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Str(String),
    Ident(String),
    ExprTree(Box<ExprNode>),
    Call { name: String, args: Vec<Operand> },
    Slice {
        target: Box<Operand>,
        beg: Option<Box<Operand>>,
        end: Option<Box<Operand>>,
        single_char: bool,
    },
    /// The literal zero-value for a `var x : glist`/`var x : gstack` typed
    /// default: a reserved-keyword container type the execution core never
    /// manipulates, but still a real value, not an identifier reference to
    /// look up.
    GList,
    GStack,
    None,
}

/// `{op, lhs, rhs}` shared by `if` and `for`.
#[derive(Debug, Clone, PartialEq)]
pub struct CondPayload {
    pub op: String,
    pub lhs: Operand,
    pub rhs: Operand,
}

/// A non-block-introducing statement; the parser only ever produces these
/// directly. Block-introducing kinds are assembled by the AST builder.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafKind {
    Decl {
        name: String,
        rhs: Operand,
        is_const: bool,
    },
    FuncCall {
        name: String,
        args: Vec<Operand>,
    },
    Defer {
        name: String,
        args: Vec<Operand>,
    },
    Print {
        arg: Operand,
    },
    Read {
        target: String,
    },
    Return {
        val: Operand,
    },
    PostInc {
        name: String,
    },
    PostDec {
        name: String,
    },
}

/// One statement in the program. Block-introducing kinds carry their
/// children directly; every other kind is a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub line: usize,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Cond {
        payload: CondPayload,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    ForLoop {
        payload: CondPayload,
        body: Vec<Stmt>,
    },
    FuncDecl {
        name: String,
        params: Vec<String>,
        body: Vec<Stmt>,
    },
    Leaf(LeafKind),
}

/// A registered function's name, parameters, and body, collected from the
/// completed top-level `FuncDecl` statements in a post-build finalize pass.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Stmt>,
}
