// ABOUTME: Frame-based symbol table, lookup only ever searches the top frame

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::Operand;
use crate::error::EvalError;
use crate::token::is_reserved;
use crate::value::{Value, ValueKind};

pub type Cell = Rc<RefCell<Value>>;

/// One deferred call, captured at the `defer` statement and replayed LIFO
/// when the enclosing function body finishes.
#[derive(Debug, Clone)]
pub struct DeferredCall {
    pub name: String,
    pub args: Vec<Operand>,
}

struct SymbolEntry {
    name: String,
    value: Cell,
    is_const: bool,
    declaration_depth: usize,
}

/// The currently executing function's bindings. Lookup never crosses into an
/// enclosing frame: Cherry has no lexical closures.
struct Frame {
    entries: Vec<SymbolEntry>,
    defer_stack: Vec<DeferredCall>,
}

impl Frame {
    fn new() -> Self {
        Frame {
            entries: Vec::new(),
            defer_stack: Vec::new(),
        }
    }
}

pub struct SymbolTable {
    depth: usize,
    frames: Vec<Frame>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            depth: 0,
            frames: Vec::new(),
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::new());
    }

    /// Takes the top frame's deferred calls, leaving the frame (and its
    /// other bindings) in place so the deferred calls can still resolve
    /// frame-local identifiers while they run.
    pub fn drain_defers(&mut self) -> Vec<DeferredCall> {
        std::mem::take(&mut self.top_mut().defer_stack)
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    /// Registers the three pseudo-constants (`string`, `numeric`,
    /// `identifier`) mapped to this interpreter's `ValueKind` tag numbers, so
    /// user code can compare `type(x)` against a named constant.
    pub fn init_globals(&mut self) -> Result<(), EvalError> {
        for (name, kind) in [
            ("string", ValueKind::Str),
            ("numeric", ValueKind::Numeric),
            ("identifier", ValueKind::Identifier),
        ] {
            self.register(name, Value::Number(kind as i32 as f64), true)?;
        }
        Ok(())
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.frames.last_mut().expect("no active frame")
    }

    fn top(&self) -> &Frame {
        self.frames.last().expect("no active frame")
    }

    /// Searches only the top frame, matching Cherry's flat-frame scoping.
    pub fn lookup(&self, name: &str) -> Option<Cell> {
        self.top()
            .entries
            .iter()
            .rev()
            .find(|e| !e.name.is_empty() && e.name == name)
            .map(|e| Rc::clone(&e.value))
    }

    pub fn resolve_number(&self, name: &str) -> Result<f64, EvalError> {
        let cell = self
            .lookup(name)
            .ok_or_else(|| EvalError::UndeclaredSymbol(name.to_string()))?;
        cell.borrow()
            .as_number()
            .ok_or_else(|| EvalError::TypeMismatch {
                context: format!("{name}: expected a numeric value"),
            })
    }

    /// Creates a new entry, or rebinds an existing non-const one in place.
    pub fn register(&mut self, name: &str, value: Value, is_const: bool) -> Result<(), EvalError> {
        if is_reserved(name) {
            return Err(EvalError::ReservedName(name.to_string()));
        }

        let depth = self.depth;
        let existing = self
            .top_mut()
            .entries
            .iter_mut()
            .rev()
            .find(|e| !e.name.is_empty() && e.name == name);

        match existing {
            Some(entry) if entry.is_const => {
                return Err(EvalError::ConstReassignment(name.to_string()));
            }
            Some(entry) => {
                *entry.value.borrow_mut() = value;
            }
            None => {
                self.top_mut().entries.push(SymbolEntry {
                    name: name.to_string(),
                    value: Rc::new(RefCell::new(value)),
                    is_const,
                    declaration_depth: depth,
                });
            }
        }
        Ok(())
    }

    /// Binds already-resolved argument cells to the callee's parameter
    /// names in a freshly pushed frame. Identifier arguments alias the
    /// caller's storage; literals get a fresh cell.
    pub fn bind_args(&mut self, params: &[String], args: Vec<Cell>) {
        self.push_frame();
        for (name, cell) in params.iter().zip(args) {
            self.top_mut().entries.push(SymbolEntry {
                name: name.clone(),
                value: cell,
                is_const: false,
                declaration_depth: 0,
            });
        }
    }

    pub fn push_defer(&mut self, call: DeferredCall) {
        self.top_mut().defer_stack.push(call);
    }

    pub fn enter_block(&mut self) {
        self.depth += 1;
    }

    /// Retires (marks empty) every entry declared at a depth deeper than the
    /// one we're returning to. Storage itself is kept; Cherry frees in bulk.
    pub fn exit_block(&mut self) {
        let depth = self.depth;
        for entry in self.top_mut().entries.iter_mut() {
            if entry.declaration_depth > depth.saturating_sub(1) {
                entry.name.clear();
            }
        }
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
