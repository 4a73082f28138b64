// ABOUTME: Tree-walking evaluator, dispatches by statement kind, drives function calls

use std::collections::HashMap;
use std::rc::Rc;

use crate::alloc::Allocator;
use crate::ast::{CondPayload, FunctionSignature, LeafKind, Operand, Stmt, StmtKind};
use crate::env::{Cell, DeferredCall, SymbolTable};
use crate::error::{BuildError, CherryError, EvalError};
use crate::builtins;
use crate::exprtree::eval_tree;
use crate::value::Value;

/// Three-valued node-evaluation result: did the statement sequence run to
/// completion, or did a `return` fire partway through and unwind the rest of
/// the enclosing function body? Errors are carried by `Result`'s `Err` arm
/// instead of a third sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOutcome {
    Ok,
    Returned,
}

pub struct Evaluator {
    symtbl: SymbolTable,
    alloc: Allocator,
    functions: HashMap<String, Rc<FunctionSignature>>,
    return_stack: Vec<Value>,
    warnings: bool,
}

impl Evaluator {
    pub fn new(signatures: Vec<FunctionSignature>, warnings: bool) -> Result<Self, BuildError> {
        let mut functions = HashMap::new();
        for sig in signatures {
            functions.insert(sig.name.clone(), Rc::new(sig));
        }
        if !functions.contains_key("main") {
            return Err(BuildError::MissingMain);
        }
        Ok(Evaluator {
            symtbl: SymbolTable::new(),
            alloc: Allocator::new(),
            functions,
            return_stack: Vec::new(),
            warnings,
        })
    }

    /// Runs the program to completion; `Ok(0)` on success, otherwise
    /// `Err(CherryError::Exit(code))` from the `exit` built-in or whichever
    /// error aborted the enclosing function call.
    pub fn run(&mut self) -> Result<i32, CherryError> {
        self.eval_call("main", &[])?;
        Ok(0)
    }

    pub fn cleanup_report(&self) -> String {
        self.alloc.cleanup_report()
    }

    fn eval_call(&mut self, name: &str, args: &[Operand]) -> Result<Value, CherryError> {
        if name == "gc" {
            return self.eval_gc(args);
        }

        if builtins::is_builtin(name) {
            let resolved = args
                .iter()
                .map(|a| self.resolve(a))
                .collect::<Result<Vec<_>, _>>()?;
            return builtins::call(name, &resolved);
        }

        let sig = self
            .functions
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedFunction(name.to_string()))?;

        if sig.params.len() != args.len() {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: sig.params.len().to_string(),
                actual: args.len(),
            }
            .into());
        }

        let arg_cells = args
            .iter()
            .map(|a| self.arg_cell(a))
            .collect::<Result<Vec<_>, _>>()?;

        self.call_user_function(&sig, arg_cells)
    }

    fn eval_gc(&mut self, args: &[Operand]) -> Result<Value, CherryError> {
        if args.len() != 1 {
            return Err(EvalError::ArityMismatch {
                name: "gc".to_string(),
                expected: "1".to_string(),
                actual: args.len(),
            }
            .into());
        }
        if let Operand::Ident(name) = &args[0] {
            if let Some(cell) = self.symtbl.lookup(name) {
                self.alloc.mark_free(&cell);
            }
        }
        Ok(Value::None)
    }

    /// `main` gets a frame with no bindings; everything else binds its
    /// resolved argument cells to the callee's parameter names.
    fn call_user_function(
        &mut self,
        sig: &FunctionSignature,
        arg_cells: Vec<Cell>,
    ) -> Result<Value, CherryError> {
        self.symtbl.bind_args(&sig.params, arg_cells);
        // Re-registered on every call, including `main`, so type names
        // resolve the same way regardless of call depth.
        self.symtbl.init_globals()?;

        let outcome = self.eval_block(&sig.body)?;
        let return_value = match outcome {
            NodeOutcome::Returned => self.return_stack.pop().unwrap_or(Value::None),
            NodeOutcome::Ok => Value::None,
        };

        let defers = self.symtbl.drain_defers();
        for call in defers.into_iter().rev() {
            self.eval_call(&call.name, &call.args)?;
        }
        self.symtbl.pop_frame();

        Ok(return_value)
    }

    /// An identifier argument aliases the caller's storage cell; every other
    /// operand kind resolves to a value and gets a fresh cell.
    fn arg_cell(&mut self, operand: &Operand) -> Result<Cell, CherryError> {
        if let Operand::Ident(name) = operand {
            if let Some(cell) = self.symtbl.lookup(name) {
                return Ok(cell);
            }
        }
        let value = self.resolve(operand)?;
        self.alloc.track();
        Ok(Rc::new(std::cell::RefCell::new(value)))
    }

    fn eval_block(&mut self, stmts: &[Stmt]) -> Result<NodeOutcome, CherryError> {
        for stmt in stmts {
            if self.eval_stmt(stmt)? == NodeOutcome::Returned {
                return Ok(NodeOutcome::Returned);
            }
        }
        Ok(NodeOutcome::Ok)
    }

    fn eval_stmt(&mut self, stmt: &Stmt) -> Result<NodeOutcome, CherryError> {
        match &stmt.kind {
            StmtKind::Cond {
                payload,
                then_body,
                else_body,
            } => self.eval_cond(payload, then_body, else_body),
            StmtKind::ForLoop { payload, body } => self.eval_for(payload, body),
            StmtKind::FuncDecl { .. } => Ok(NodeOutcome::Ok),
            StmtKind::Leaf(leaf) => self.eval_leaf(leaf),
        }
    }

    fn eval_cond(
        &mut self,
        payload: &CondPayload,
        then_body: &[Stmt],
        else_body: &[Stmt],
    ) -> Result<NodeOutcome, CherryError> {
        self.symtbl.enter_block();
        self.warn_if_static(payload);
        let truthy = self.compare(payload)?;
        let outcome = if truthy {
            self.eval_block(then_body)
        } else {
            self.eval_block(else_body)
        };
        self.symtbl.exit_block();
        outcome
    }

    fn eval_for(&mut self, payload: &CondPayload, body: &[Stmt]) -> Result<NodeOutcome, CherryError> {
        self.symtbl.enter_block();
        self.warn_if_static(payload);

        if self.warnings && is_static(&payload.lhs) && is_static(&payload.rhs) && self.compare(payload)? {
            self.symtbl.exit_block();
            return Err(EvalError::InfiniteLoop.into());
        }

        let result = loop {
            if !self.compare(payload)? {
                break Ok(NodeOutcome::Ok);
            }
            match self.eval_block(body) {
                Ok(NodeOutcome::Returned) => break Ok(NodeOutcome::Returned),
                Ok(NodeOutcome::Ok) => continue,
                Err(e) => break Err(e),
            }
        };
        self.symtbl.exit_block();
        result
    }

    fn warn_if_static(&self, payload: &CondPayload) {
        if self.warnings && is_static(&payload.lhs) && is_static(&payload.rhs) {
            eprintln!("warning: condition at evaluates statically and never changes");
        }
    }

    fn eval_leaf(&mut self, leaf: &LeafKind) -> Result<NodeOutcome, CherryError> {
        match leaf {
            LeafKind::Decl { name, rhs, is_const } => {
                let value = self.resolve(rhs)?;
                self.alloc.track();
                self.symtbl.register(name, value, *is_const)?;
                Ok(NodeOutcome::Ok)
            }
            LeafKind::FuncCall { name, args } => {
                self.eval_call(name, args)?;
                Ok(NodeOutcome::Ok)
            }
            LeafKind::Defer { name, args } => {
                self.symtbl.push_defer(DeferredCall {
                    name: name.clone(),
                    args: args.clone(),
                });
                Ok(NodeOutcome::Ok)
            }
            LeafKind::Print { arg } => {
                let value = self.resolve(arg)?;
                println!("{value}");
                Ok(NodeOutcome::Ok)
            }
            LeafKind::Read { target } => {
                let mut line = String::new();
                std::io::stdin().read_line(&mut line)?;
                let token = line.split_whitespace().next().unwrap_or("").to_string();
                self.alloc.track();
                self.symtbl.register(target, Value::Str(token), false)?;
                Ok(NodeOutcome::Ok)
            }
            LeafKind::Return { val } => {
                let value = self.resolve(val)?;
                self.return_stack.push(value);
                Ok(NodeOutcome::Returned)
            }
            LeafKind::PostInc { name } => self.eval_unary(name, 1.0),
            LeafKind::PostDec { name } => self.eval_unary(name, -1.0),
        }
    }

    fn eval_unary(&mut self, name: &str, delta: f64) -> Result<NodeOutcome, CherryError> {
        let n = self.symtbl.resolve_number(name)?;
        self.symtbl.register(name, Value::Number(n + delta), false)?;
        Ok(NodeOutcome::Ok)
    }

    /// Resolves any sub-expression operand to a concrete runtime value.
    fn resolve(&mut self, operand: &Operand) -> Result<Value, CherryError> {
        match operand {
            Operand::Number(n) => Ok(Value::Number(*n)),
            Operand::Str(s) => Ok(Value::Str(s.clone())),
            Operand::GList => Ok(Value::GList),
            Operand::GStack => Ok(Value::GStack),
            Operand::None => Ok(Value::None),
            Operand::Ident(name) => {
                let cell = self
                    .symtbl
                    .lookup(name)
                    .ok_or_else(|| EvalError::UndeclaredSymbol(name.clone()))?;
                let value = cell.borrow().clone();
                Ok(value)
            }
            Operand::ExprTree(tree) => {
                let symtbl = &self.symtbl;
                let n = eval_tree(tree, &|name| symtbl.resolve_number(name))?;
                Ok(Value::Number(n))
            }
            Operand::Call { name, args } => self.eval_call(name, args),
            Operand::Slice {
                target,
                beg,
                end,
                single_char,
            } => self.eval_slice(target, beg.as_deref(), end.as_deref(), *single_char),
        }
    }

    fn eval_slice(
        &mut self,
        target: &Operand,
        beg: Option<&Operand>,
        end: Option<&Operand>,
        single_char: bool,
    ) -> Result<Value, CherryError> {
        let target = self.resolve(target)?;
        let s = target.as_str().ok_or(EvalError::IndexerOnNonString)?;
        let length = s.len() as i64;

        let lower = match beg {
            Some(op) => self.resolve_index(op)?,
            None => 0,
        };
        let mut upper = match end {
            Some(op) => self.resolve_index(op)?,
            None => length,
        };
        if single_char {
            upper = lower + 1;
        }
        // Upper is clamped to the string length before range validation runs;
        // only an overshooting lower bound (or a negative bound, or upper <
        // lower) is rejected outright.
        if upper > length {
            upper = length;
        }

        if lower < 0 || upper < 0 || upper < lower || lower > length || (single_char && lower >= length) {
            return Err(EvalError::SliceOutOfRange.into());
        }

        Ok(Value::Str(s[lower as usize..upper as usize].to_string()))
    }

    fn resolve_index(&mut self, operand: &Operand) -> Result<i64, CherryError> {
        let value = self.resolve(operand)?;
        let n = value.as_number().ok_or_else(|| EvalError::TypeMismatch {
            context: "slice bound: expected a numeric value".into(),
        })?;
        Ok(n as i64)
    }

    /// Same type required on both sides, unless both are `none`. Numeric
    /// compares by IEEE semantics, string by lexicographic byte order.
    ///
    /// Two `none` operands compare equal for `==`/`!=`; ordering operators
    /// (`< <= > >=`) on two `none` operands are rejected outright rather
    /// than returning a meaningless ordering.
    fn compare(&mut self, payload: &CondPayload) -> Result<bool, CherryError> {
        let lhs = self.resolve(&payload.lhs)?;
        let rhs = self.resolve(&payload.rhs)?;

        let ordering = match (&lhs, &rhs) {
            (Value::None, Value::None) => match payload.op.as_str() {
                "==" => return Ok(true),
                "!=" => return Ok(false),
                _ => {
                    return Err(EvalError::TypeMismatch {
                        context: "comparison: ordering operator on two none operands".into(),
                    }
                    .into())
                }
            },
            (Value::Number(a), Value::Number(b)) => {
                a.partial_cmp(b).ok_or(EvalError::TypeMismatch {
                    context: "comparison: NaN operand".into(),
                })?
            }
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            _ => {
                return Err(EvalError::TypeMismatch {
                    context: "comparison: operand types differ".into(),
                }
                .into())
            }
        };

        Ok(match payload.op.as_str() {
            "<" => ordering.is_lt(),
            "<=" => ordering.is_le(),
            "==" => ordering.is_eq(),
            "!=" => !ordering.is_eq(),
            ">=" => ordering.is_ge(),
            ">" => ordering.is_gt(),
            other => {
                return Err(EvalError::TypeMismatch {
                    context: format!("unrecognized comparison operator {other:?}"),
                }
                .into())
            }
        })
    }
}

fn is_static(operand: &Operand) -> bool {
    !matches!(operand, Operand::ExprTree(_) | Operand::Call { .. })
}
