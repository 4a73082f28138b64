// ABOUTME: Shunting-yard expression compiler with constant folding

use std::collections::VecDeque;

use crate::ast::{ExprNode, Operand};
use crate::error::{EvalError, ParseError};
use crate::token::Token;

fn precedence(op: char) -> u8 {
    match op {
        '+' | '-' => 1,
        '*' | '/' => 2,
        _ => 0,
    }
}

/// True for tokens that can terminate expression consumption without being
/// part of the expression themselves (statement separators the caller owns).
fn terminates(tok: &Token) -> bool {
    matches!(tok, Token::Syntax(',') | Token::Syntax(':') | Token::SqBr(']'))
}

/// Consumes a leading run of tokens that form one arithmetic expression,
/// leaving anything past the expression's natural end untouched in `tokens`.
/// Folds to a literal `Operand::Number` when no identifier leaf appears.
pub fn compile_expr(tokens: &mut VecDeque<Token>) -> Result<Operand, ParseError> {
    let mut operands: Vec<ExprNode> = Vec::new();
    let mut operators: Vec<Option<char>> = Vec::new(); // None marks an open '('
    let mut expect_operand = true;
    let mut consumed_any = false;

    loop {
        let Some(tok) = tokens.front() else { break };

        if expect_operand {
            match tok {
                Token::Number(n) => {
                    operands.push(ExprNode::Number(*n));
                    expect_operand = false;
                    consumed_any = true;
                    tokens.pop_front();
                }
                Token::Ident(name) => {
                    operands.push(ExprNode::Ident(name.clone()));
                    expect_operand = false;
                    consumed_any = true;
                    tokens.pop_front();
                }
                Token::Op(s) if s == "+" || s == "-" => {
                    // Leading/nested unary sign: fold in an implicit zero.
                    operands.push(ExprNode::Number(0.0));
                    expect_operand = false;
                    consumed_any = true;
                    // token is not consumed here; it is handled as a binary
                    // operator on the next iteration.
                }
                Token::Paren('(') => {
                    operators.push(None);
                    consumed_any = true;
                    tokens.pop_front();
                }
                Token::Op(_) => {
                    return Err(ParseError::ExpectedOperand(tok.text()));
                }
                other if terminates(other) => {
                    if consumed_any {
                        return Err(ParseError::ExpectedOperand(other.text()));
                    }
                    return Err(ParseError::EmptyExpression);
                }
                other => return Err(ParseError::ExpectedOperand(other.text())),
            }
            continue;
        }

        // expect_operand == false: looking for a binary operator, ')', or a terminator.
        match tok {
            Token::Op(s) if matches!(s.as_str(), "+" | "-" | "*" | "/") => {
                let op = s.chars().next().unwrap();
                while let Some(Some(top)) = operators.last() {
                    if precedence(*top) >= precedence(op) {
                        let top = operators.pop().unwrap().unwrap();
                        fold_top(&mut operands, top)?;
                    } else {
                        break;
                    }
                }
                operators.push(Some(op));
                expect_operand = true;
                tokens.pop_front();
            }
            Token::Paren(')') => {
                if !operators.iter().any(|o| o.is_none()) {
                    break; // belongs to an enclosing call/grouping, not ours
                }
                loop {
                    match operators.pop() {
                        Some(Some(op)) => fold_top(&mut operands, op)?,
                        Some(None) => break,
                        None => return Err(ParseError::UnbalancedParens),
                    }
                }
                tokens.pop_front();
            }
            _ => break,
        }
    }

    if !consumed_any {
        return Err(ParseError::EmptyExpression);
    }

    while let Some(top) = operators.pop() {
        match top {
            Some(op) => fold_top(&mut operands, op)?,
            None => return Err(ParseError::UnbalancedParens),
        }
    }

    if operands.len() != 1 {
        return Err(ParseError::UnbalancedParens);
    }

    Ok(node_to_operand(operands.pop().unwrap()))
}

fn fold_top(operands: &mut Vec<ExprNode>, op: char) -> Result<(), ParseError> {
    let rhs = operands.pop().ok_or(ParseError::UnbalancedParens)?;
    let lhs = operands.pop().ok_or(ParseError::UnbalancedParens)?;
    operands.push(ExprNode::BinOp {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    });
    Ok(())
}

fn has_ident(node: &ExprNode) -> bool {
    match node {
        ExprNode::Number(_) => false,
        ExprNode::Ident(_) => true,
        ExprNode::BinOp { lhs, rhs, .. } => has_ident(lhs) || has_ident(rhs),
    }
}

fn node_to_operand(node: ExprNode) -> Operand {
    match &node {
        ExprNode::Ident(name) if name == "none" => Operand::None,
        ExprNode::Ident(name) => Operand::Ident(name.clone()),
        ExprNode::Number(n) => Operand::Number(*n),
        ExprNode::BinOp { .. } => {
            if has_ident(&node) {
                Operand::ExprTree(Box::new(node))
            } else {
                Operand::Number(eval_literal(&node).expect("literal tree must fold"))
            }
        }
    }
}

/// Evaluates a tree with no identifier leaves. Used for constant folding.
fn eval_literal(node: &ExprNode) -> Result<f64, EvalError> {
    match node {
        ExprNode::Number(n) => Ok(*n),
        ExprNode::Ident(_) => Err(EvalError::TypeMismatch {
            context: "constant folding".into(),
        }),
        ExprNode::BinOp { op, lhs, rhs } => {
            let l = eval_literal(lhs)?;
            let r = eval_literal(rhs)?;
            apply_op(*op, l, r)
        }
    }
}

/// Evaluates a tree against a symbol lookup closure. Used at run time for
/// `exprtree`-tagged operands.
pub fn eval_tree<F>(node: &ExprNode, lookup: &F) -> Result<f64, EvalError>
where
    F: Fn(&str) -> Result<f64, EvalError>,
{
    match node {
        ExprNode::Number(n) => Ok(*n),
        ExprNode::Ident(name) => lookup(name),
        ExprNode::BinOp { op, lhs, rhs } => {
            let l = eval_tree(lhs, lookup)?;
            let r = eval_tree(rhs, lookup)?;
            apply_op(*op, l, r)
        }
    }
}

fn apply_op(op: char, l: f64, r: f64) -> Result<f64, EvalError> {
    match op {
        '+' => Ok(l + r),
        '-' => Ok(l - r),
        '*' => Ok(l * r),
        '/' => Ok(l / r),
        _ => Err(EvalError::TypeMismatch {
            context: "expression operator".into(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(toks: Vec<Token>) -> VecDeque<Token> {
        toks.into_iter().collect()
    }

    #[test]
    fn folds_constant_with_precedence() {
        let mut t = tokens(vec![
            Token::Number(2.0),
            Token::Op("+".into()),
            Token::Number(3.0),
            Token::Op("*".into()),
            Token::Number(4.0),
        ]);
        assert_eq!(compile_expr(&mut t).unwrap(), Operand::Number(14.0));
    }

    #[test]
    fn folds_parenthesized_group() {
        let mut t = tokens(vec![
            Token::Paren('('),
            Token::Number(2.0),
            Token::Op("+".into()),
            Token::Number(3.0),
            Token::Paren(')'),
            Token::Op("*".into()),
            Token::Number(4.0),
        ]);
        assert_eq!(compile_expr(&mut t).unwrap(), Operand::Number(20.0));
    }

    #[test]
    fn folds_leading_unary_minus() {
        let mut t = tokens(vec![
            Token::Op("-".into()),
            Token::Number(5.0),
            Token::Op("+".into()),
            Token::Number(2.0),
        ]);
        assert_eq!(compile_expr(&mut t).unwrap(), Operand::Number(-3.0));
    }

    #[test]
    fn identifier_keeps_expr_as_tree() {
        let mut t = tokens(vec![
            Token::Ident("x".into()),
            Token::Op("+".into()),
            Token::Number(1.0),
        ]);
        match compile_expr(&mut t).unwrap() {
            Operand::ExprTree(tree) => {
                let v = eval_tree(&tree, &|name| {
                    assert_eq!(name, "x");
                    Ok(4.0)
                })
                .unwrap();
                assert_eq!(v, 5.0);
            }
            other => panic!("expected exprtree, got {:?}", other),
        }
    }

    #[test]
    fn single_identifier_shortcuts_to_ident_operand() {
        let mut t = tokens(vec![Token::Ident("x".into())]);
        assert_eq!(compile_expr(&mut t).unwrap(), Operand::Ident("x".into()));
    }

    #[test]
    fn bare_none_keyword_becomes_none_operand() {
        let mut t = tokens(vec![Token::Ident("none".into())]);
        assert_eq!(compile_expr(&mut t).unwrap(), Operand::None);
    }

    #[test]
    fn stops_at_trailing_comma() {
        let mut t = tokens(vec![
            Token::Number(1.0),
            Token::Op("+".into()),
            Token::Number(9.0),
            Token::Syntax(','),
            Token::Number(3.0),
        ]);
        assert_eq!(compile_expr(&mut t).unwrap(), Operand::Number(10.0));
        assert_eq!(t.len(), 2); // comma and the next argument are left untouched
    }
}
