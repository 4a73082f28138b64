// ABOUTME: AST builder, assembles per-line parser output into the final statement tree

use crate::ast::{CondPayload, FunctionSignature, Stmt, StmtKind};
use crate::error::BuildError;
use crate::parser::ParsedNode;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Left,
    Right,
}

/// A block-introducing statement still accumulating its children. Lives by
/// value on `block_stack` and is only spliced into its parent's children
/// vector when its closing `end` is processed: lazy attach on close, rather
/// than splicing pointers into a parent node as each child statement arrives.
enum OpenBlock {
    Def {
        name: String,
        params: Vec<String>,
        line: usize,
        left: Vec<Stmt>,
    },
    Cond {
        payload: CondPayload,
        line: usize,
        left: Vec<Stmt>,
        right: Vec<Stmt>,
    },
    ForLoop {
        payload: CondPayload,
        line: usize,
        left: Vec<Stmt>,
    },
}

impl OpenBlock {
    fn active_children(&mut self, side: Side) -> &mut Vec<Stmt> {
        match self {
            OpenBlock::Def { left, .. } => left,
            OpenBlock::ForLoop { left, .. } => left,
            OpenBlock::Cond { left, right, .. } => match side {
                Side::Left => left,
                Side::Right => right,
            },
        }
    }

    fn into_stmt(self) -> Stmt {
        match self {
            OpenBlock::Def {
                name,
                params,
                line,
                left,
            } => Stmt {
                line,
                kind: StmtKind::FuncDecl {
                    name,
                    params,
                    body: left,
                },
            },
            OpenBlock::Cond {
                payload,
                line,
                left,
                right,
            } => Stmt {
                line,
                kind: StmtKind::Cond {
                    payload,
                    then_body: left,
                    else_body: right,
                },
            },
            OpenBlock::ForLoop {
                payload,
                line,
                left,
            } => Stmt {
                line,
                kind: StmtKind::ForLoop {
                    payload,
                    body: left,
                },
            },
        }
    }
}

pub struct Builder {
    body: Vec<Stmt>,
    block_stack: Vec<OpenBlock>,
    aux_stack: Vec<Side>,
    active_side: Side,
    in_func: bool,
    signatures: Vec<FunctionSignature>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            body: Vec::new(),
            block_stack: Vec::new(),
            aux_stack: Vec::new(),
            active_side: Side::Left,
            in_func: false,
            signatures: Vec::new(),
        }
    }

    pub fn feed(&mut self, line: usize, node: ParsedNode) -> Result<(), BuildError> {
        match node {
            ParsedNode::Def { name, params } => {
                if self.in_func {
                    return Err(BuildError::NestedDef(line));
                }
                self.in_func = true;
                self.open_block(OpenBlock::Def {
                    name,
                    params,
                    line,
                    left: Vec::new(),
                });
            }
            ParsedNode::If(payload) => {
                self.require_context(line)?;
                self.open_block(OpenBlock::Cond {
                    payload,
                    line,
                    left: Vec::new(),
                    right: Vec::new(),
                });
            }
            ParsedNode::For(payload) => {
                self.require_context(line)?;
                self.open_block(OpenBlock::ForLoop {
                    payload,
                    line,
                    left: Vec::new(),
                });
            }
            ParsedNode::Else => {
                match self.block_stack.last() {
                    Some(OpenBlock::Cond { .. }) => self.active_side = Side::Right,
                    _ => return Err(BuildError::ElseWithoutIf(line)),
                }
            }
            ParsedNode::End => {
                let closed = self
                    .block_stack
                    .pop()
                    .ok_or(BuildError::EndWithoutBlock(line))?;
                let was_def = matches!(closed, OpenBlock::Def { .. });
                let stmt = closed.into_stmt();
                self.active_side = self.aux_stack.pop().unwrap_or(Side::Left);
                if was_def {
                    self.in_func = false;
                    if let StmtKind::FuncDecl { name, params, body } = &stmt.kind {
                        self.signatures.push(FunctionSignature {
                            name: name.clone(),
                            params: params.clone(),
                            body: body.clone(),
                        });
                    }
                }
                self.append(stmt);
            }
            ParsedNode::Leaf(leaf) => {
                self.require_context(line)?;
                self.append(Stmt {
                    line,
                    kind: StmtKind::Leaf(leaf),
                });
            }
        }
        Ok(())
    }

    fn require_context(&self, line: usize) -> Result<(), BuildError> {
        if !self.in_func && self.block_stack.is_empty() {
            Err(BuildError::DanglingStatement(line))
        } else {
            Ok(())
        }
    }

    fn open_block(&mut self, block: OpenBlock) {
        self.aux_stack.push(self.active_side);
        self.block_stack.push(block);
        self.active_side = Side::Left;
    }

    fn append(&mut self, stmt: Stmt) {
        let side = self.active_side;
        match self.block_stack.last_mut() {
            Some(top) => top.active_children(side).push(stmt),
            None => self.body.push(stmt),
        }
    }

    pub fn finish(self) -> Result<(Vec<Stmt>, Vec<FunctionSignature>), BuildError> {
        if self.in_func || !self.block_stack.is_empty() {
            return Err(BuildError::UnbalancedAtEof(self.block_stack.len().max(1)));
        }
        Ok((self.body, self.signatures))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{LeafKind, Operand};
    use crate::lexer::lex;
    use crate::parser::parse_line;

    fn feed_all(b: &mut Builder, lines: &[&str]) {
        for (i, line) in lines.iter().enumerate() {
            let node = parse_line(lex(line).unwrap().into()).unwrap();
            b.feed(i + 1, node).unwrap();
        }
    }

    #[test]
    fn builds_simple_function() {
        let mut b = Builder::new();
        feed_all(
            &mut b,
            &["def main()", "var x = 1", "print x", "end"],
        );
        let (body, sigs) = b.finish().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].name, "main");
        match &body[0].kind {
            StmtKind::FuncDecl { name, body, .. } => {
                assert_eq!(name, "main");
                assert_eq!(body.len(), 2);
            }
            _ => panic!("expected FuncDecl"),
        }
    }

    #[test]
    fn if_else_splits_into_both_bodies() {
        let mut b = Builder::new();
        feed_all(
            &mut b,
            &[
                "def main()",
                "if 1 < 2",
                "print 1",
                "else",
                "print 2",
                "end",
                "end",
            ],
        );
        let (body, _) = b.finish().unwrap();
        match &body[0].kind {
            StmtKind::FuncDecl { body: fn_body, .. } => match &fn_body[0].kind {
                StmtKind::Cond {
                    then_body,
                    else_body,
                    ..
                } => {
                    assert_eq!(then_body.len(), 1);
                    assert_eq!(else_body.len(), 1);
                }
                _ => panic!("expected Cond"),
            },
            _ => panic!("expected FuncDecl"),
        }
    }

    #[test]
    fn nested_for_inside_if() {
        let mut b = Builder::new();
        feed_all(
            &mut b,
            &[
                "def main()",
                "if 1 < 2",
                "for i < 3",
                "print i",
                "i++",
                "end",
                "end",
                "end",
            ],
        );
        let (body, _) = b.finish().unwrap();
        match &body[0].kind {
            StmtKind::FuncDecl { body: fn_body, .. } => match &fn_body[0].kind {
                StmtKind::Cond { then_body, .. } => match &then_body[0].kind {
                    StmtKind::ForLoop { body, .. } => assert_eq!(body.len(), 2),
                    _ => panic!("expected ForLoop"),
                },
                _ => panic!("expected Cond"),
            },
            _ => panic!("expected FuncDecl"),
        }
    }

    #[test]
    fn nested_def_is_an_error() {
        let mut b = Builder::new();
        let node = parse_line(lex("def main()").unwrap().into()).unwrap();
        b.feed(1, node).unwrap();
        let node = parse_line(lex("def inner()").unwrap().into()).unwrap();
        assert_eq!(b.feed(2, node), Err(BuildError::NestedDef(2)));
    }

    #[test]
    fn else_without_if_is_an_error() {
        let mut b = Builder::new();
        let node = parse_line(lex("def main()").unwrap().into()).unwrap();
        b.feed(1, node).unwrap();
        let node = parse_line(lex("else").unwrap().into()).unwrap();
        assert_eq!(b.feed(2, node), Err(BuildError::ElseWithoutIf(2)));
    }

    #[test]
    fn end_without_block_is_an_error() {
        let mut b = Builder::new();
        let node = parse_line(lex("end").unwrap().into()).unwrap();
        assert_eq!(b.feed(1, node), Err(BuildError::EndWithoutBlock(1)));
    }

    #[test]
    fn dangling_statement_outside_function_is_an_error() {
        let mut b = Builder::new();
        let node = parse_line(lex("var x = 1").unwrap().into()).unwrap();
        assert_eq!(b.feed(1, node), Err(BuildError::DanglingStatement(1)));
    }

    #[test]
    fn unbalanced_at_eof_is_an_error() {
        let mut b = Builder::new();
        let node = parse_line(lex("def main()").unwrap().into()).unwrap();
        b.feed(1, node).unwrap();
        assert!(matches!(b.finish(), Err(BuildError::UnbalancedAtEof(_))));
    }

    #[test]
    fn defer_leaf_is_preserved_in_body() {
        let mut b = Builder::new();
        feed_all(
            &mut b,
            &["def main()", "defer put(\"bye\")", "end"],
        );
        let (body, _) = b.finish().unwrap();
        match &body[0].kind {
            StmtKind::FuncDecl { body: fn_body, .. } => match &fn_body[0].kind {
                StmtKind::Leaf(LeafKind::Defer { name, args }) => {
                    assert_eq!(name, "put");
                    assert_eq!(args, &vec![Operand::Str("bye".into())]);
                }
                _ => panic!("expected Defer leaf"),
            },
            _ => panic!("expected FuncDecl"),
        }
    }
}
