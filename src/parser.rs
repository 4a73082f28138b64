// ABOUTME: Statement parser, turns one line's tokens into a node for the AST builder

use std::collections::VecDeque;

use crate::ast::{CondPayload, LeafKind, Operand};
use crate::error::ParseError;
use crate::exprtree::compile_expr;
use crate::token::Token;

/// One parsed line, not yet spliced into the tree. Block-opening and
/// block-closing markers are handled by the AST builder; everything else is
/// a finished leaf statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedNode {
    If(CondPayload),
    For(CondPayload),
    Def { name: String, params: Vec<String> },
    Else,
    End,
    Leaf(LeafKind),
}

const COMPARISON_OPS: &[&str] = &["<", "<=", "==", "!=", ">=", ">"];

pub fn parse_line(mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    let head = tokens.pop_front().ok_or(ParseError::EmptyStatement)?;

    let node = match &head {
        Token::Ident(kw) if kw == "var" => parse_decl(tokens, false)?,
        Token::Ident(kw) if kw == "const" => parse_decl(tokens, true)?,
        Token::Ident(kw) if kw == "def" => parse_def(tokens)?,
        Token::Ident(kw) if kw == "defer" => parse_defer(tokens)?,
        Token::Ident(kw) if kw == "if" => ParsedNode::If(parse_cond(tokens)?),
        Token::Ident(kw) if kw == "for" => ParsedNode::For(parse_cond(tokens)?),
        Token::Ident(kw) if kw == "print" => parse_print(tokens)?,
        Token::Ident(kw) if kw == "read" => parse_read(tokens)?,
        Token::Ident(kw) if kw == "return" => parse_return(tokens)?,
        Token::Ident(kw) if kw == "else" => require_exhausted(tokens, ParsedNode::Else)?,
        Token::Ident(kw) if kw == "end" => require_exhausted(tokens, ParsedNode::End)?,
        Token::Ident(name) => parse_name_led(name.clone(), tokens)?,
        _ => return Err(ParseError::UnrecognizedStatement),
    };

    Ok(node)
}

fn parse_name_led(name: String, mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    match tokens.front() {
        Some(Token::Paren('(')) => {
            tokens.pop_front();
            let args = parse_arglist(&mut tokens, false)?;
            require_exhausted(tokens, ())?;
            Ok(ParsedNode::Leaf(LeafKind::FuncCall { name, args }))
        }
        Some(Token::Op(op)) if op == "++" => {
            tokens.pop_front();
            require_exhausted(tokens, ())?;
            Ok(ParsedNode::Leaf(LeafKind::PostInc { name }))
        }
        Some(Token::Op(op)) if op == "--" => {
            tokens.pop_front();
            require_exhausted(tokens, ())?;
            Ok(ParsedNode::Leaf(LeafKind::PostDec { name }))
        }
        _ => Err(ParseError::UnrecognizedStatement),
    }
}

fn parse_defer(mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    let name = expect_ident(&mut tokens)?;
    expect_paren(&mut tokens, '(')?;
    let args = parse_arglist(&mut tokens, false)?;
    require_exhausted(tokens, ())?;
    Ok(ParsedNode::Leaf(LeafKind::Defer { name, args }))
}

/// `(a, b, c)`, already past the opening paren. `onlyvar` restricts
/// arguments to bare identifiers, for `def` parameter lists.
fn parse_arglist(tokens: &mut VecDeque<Token>, onlyvar: bool) -> Result<Vec<Operand>, ParseError> {
    let mut args = Vec::new();

    if matches!(tokens.front(), Some(Token::Paren(')'))) {
        tokens.pop_front();
        return Ok(args);
    }

    loop {
        if onlyvar {
            let name = expect_ident(tokens)?;
            args.push(Operand::Ident(name));
        } else {
            args.push(parse_next(tokens)?);
        }

        match tokens.pop_front() {
            Some(Token::Syntax(',')) => continue,
            Some(Token::Paren(')')) => break,
            Some(other) => return Err(ParseError::BadArgumentKind(other.text())),
            None => return Err(ParseError::MissingCloseParen),
        }
    }

    Ok(args)
}

/// The sub-expression parser: function call, slice, or arithmetic expression.
pub fn parse_next(tokens: &mut VecDeque<Token>) -> Result<Operand, ParseError> {
    let second = tokens.get(1);
    match (tokens.front(), second) {
        (Some(Token::Ident(name)), Some(Token::Paren('('))) => {
            let name = name.clone();
            tokens.pop_front();
            tokens.pop_front();
            let args = parse_arglist(tokens, false)?;
            Ok(Operand::Call { name, args })
        }
        (Some(Token::Ident(name)), Some(Token::SqBr('['))) => {
            let target = Operand::Ident(name.clone());
            tokens.pop_front();
            parse_slice(tokens, target)
        }
        (Some(Token::Str(s)), Some(Token::SqBr('['))) => {
            let target = Operand::Str(s.clone());
            tokens.pop_front();
            parse_slice(tokens, target)
        }
        (Some(Token::Str(s)), _) => {
            let value = s.clone();
            tokens.pop_front();
            Ok(Operand::Str(value))
        }
        _ => compile_expr(tokens),
    }
}

fn parse_slice(tokens: &mut VecDeque<Token>, target: Operand) -> Result<Operand, ParseError> {
    expect_sqbr(tokens, '[')?;

    let beg = if matches!(tokens.front(), Some(Token::Syntax(':')) | Some(Token::SqBr(']'))) {
        None
    } else {
        Some(Box::new(parse_next(tokens)?))
    };

    match tokens.pop_front() {
        Some(Token::Syntax(':')) => {
            let end = if matches!(tokens.front(), Some(Token::SqBr(']'))) {
                None
            } else {
                Some(Box::new(parse_next(tokens)?))
            };
            expect_sqbr(tokens, ']')?;
            Ok(Operand::Slice {
                target: Box::new(target),
                beg,
                end,
                single_char: false,
            })
        }
        Some(Token::SqBr(']')) => Ok(Operand::Slice {
            target: Box::new(target),
            beg,
            end: None,
            single_char: true,
        }),
        Some(other) => Err(ParseError::UnexpectedToken(other.text())),
        None => Err(ParseError::MissingCloseBracket),
    }
}

fn parse_decl(mut tokens: VecDeque<Token>, is_const: bool) -> Result<ParsedNode, ParseError> {
    let name = expect_ident(&mut tokens)?;

    match tokens.pop_front() {
        Some(Token::Op(op)) if op == "=" => {
            let rhs = parse_next(&mut tokens)?;
            require_exhausted(tokens, ())?;
            Ok(ParsedNode::Leaf(LeafKind::Decl {
                name,
                rhs,
                is_const,
            }))
        }
        Some(Token::Syntax(':')) => {
            let type_name = expect_ident(&mut tokens)?;
            require_exhausted(tokens, ())?;
            let rhs = default_for_type(&type_name)?;
            Ok(ParsedNode::Leaf(LeafKind::Decl {
                name,
                rhs,
                is_const,
            }))
        }
        Some(other) => Err(ParseError::UnexpectedToken(other.text())),
        None => Err(ParseError::MissingKeyword),
    }
}

fn default_for_type(type_name: &str) -> Result<Operand, ParseError> {
    match type_name {
        "int" => Ok(Operand::Number(0.0)),
        "str" => Ok(Operand::Str(String::new())),
        "glist" => Ok(Operand::GList),
        "gstack" => Ok(Operand::GStack),
        other => Err(ParseError::UnexpectedToken(other.to_string())),
    }
}

fn parse_def(mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    let name = expect_ident(&mut tokens)?;
    expect_paren(&mut tokens, '(')?;
    let args = parse_arglist(&mut tokens, true)?;
    require_exhausted(tokens, ())?;
    let params = args
        .into_iter()
        .map(|op| match op {
            Operand::Ident(name) => name,
            _ => unreachable!("parse_arglist(onlyvar=true) only yields Ident operands"),
        })
        .collect();
    Ok(ParsedNode::Def { name, params })
}

fn parse_cond(mut tokens: VecDeque<Token>) -> Result<CondPayload, ParseError> {
    let lhs = parse_next(&mut tokens)?;
    let op = match tokens.pop_front() {
        Some(Token::Op(s)) if COMPARISON_OPS.contains(&s.as_str()) => s,
        Some(other) => return Err(ParseError::BadOperator(other.text())),
        None => return Err(ParseError::BadOperator(String::new())),
    };
    let rhs = parse_next(&mut tokens)?;
    require_exhausted(tokens, ())?;
    Ok(CondPayload { op, lhs, rhs })
}

fn parse_print(mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    let arg = parse_next(&mut tokens)?;
    require_exhausted(tokens, ())?;
    Ok(ParsedNode::Leaf(LeafKind::Print { arg }))
}

fn parse_read(mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    let target = expect_ident(&mut tokens)?;
    require_exhausted(tokens, ())?;
    Ok(ParsedNode::Leaf(LeafKind::Read { target }))
}

fn parse_return(mut tokens: VecDeque<Token>) -> Result<ParsedNode, ParseError> {
    let val = if tokens.is_empty() {
        Operand::None
    } else {
        parse_next(&mut tokens)?
    };
    require_exhausted(tokens, ())?;
    Ok(ParsedNode::Leaf(LeafKind::Return { val }))
}

fn expect_ident(tokens: &mut VecDeque<Token>) -> Result<String, ParseError> {
    match tokens.pop_front() {
        Some(Token::Ident(name)) => Ok(name),
        Some(other) => Err(ParseError::BadArgumentKind(other.text())),
        None => Err(ParseError::MissingKeyword),
    }
}

fn expect_paren(tokens: &mut VecDeque<Token>, c: char) -> Result<(), ParseError> {
    match tokens.pop_front() {
        Some(Token::Paren(p)) if p == c => Ok(()),
        Some(other) => Err(ParseError::UnexpectedToken(other.text())),
        None => Err(ParseError::MissingOpenParen),
    }
}

fn expect_sqbr(tokens: &mut VecDeque<Token>, c: char) -> Result<(), ParseError> {
    match tokens.pop_front() {
        Some(Token::SqBr(b)) if b == c => Ok(()),
        Some(other) => Err(ParseError::UnexpectedToken(other.text())),
        None => Err(ParseError::MissingCloseBracket),
    }
}

fn require_exhausted<T>(tokens: VecDeque<Token>, value: T) -> Result<T, ParseError> {
    if tokens.is_empty() {
        Ok(value)
    } else {
        Err(ParseError::ExcessTokens(
            tokens.iter().map(|t| t.text()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn parse(line: &str) -> ParsedNode {
        parse_line(lex(line).unwrap().into()).unwrap()
    }

    #[test]
    fn parses_var_decl_with_expression() {
        match parse("var x = 2 + 3 * 4") {
            ParsedNode::Leaf(LeafKind::Decl { name, rhs, is_const }) => {
                assert_eq!(name, "x");
                assert!(!is_const);
                assert_eq!(rhs, Operand::Number(14.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_typed_default_decl() {
        match parse("var s : str") {
            ParsedNode::Leaf(LeafKind::Decl { rhs, .. }) => {
                assert_eq!(rhs, Operand::Str(String::new()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn glist_and_gstack_typed_defaults_are_literal_values_not_identifiers() {
        match parse("var l : glist") {
            ParsedNode::Leaf(LeafKind::Decl { rhs, .. }) => assert_eq!(rhs, Operand::GList),
            other => panic!("unexpected {:?}", other),
        }
        match parse("var s : gstack") {
            ParsedNode::Leaf(LeafKind::Decl { rhs, .. }) => assert_eq!(rhs, Operand::GStack),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_if_condition() {
        match parse("if i < 3") {
            ParsedNode::If(payload) => {
                assert_eq!(payload.op, "<");
                assert_eq!(payload.lhs, Operand::Ident("i".into()));
                assert_eq!(payload.rhs, Operand::Number(3.0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_function_call_statement() {
        match parse("add(2, 3)") {
            ParsedNode::Leaf(LeafKind::FuncCall { name, args }) => {
                assert_eq!(name, "add");
                assert_eq!(args, vec![Operand::Number(2.0), Operand::Number(3.0)]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_slice_expression_in_print() {
        match parse("print s[1:4]") {
            ParsedNode::Leaf(LeafKind::Print { arg }) => match arg {
                Operand::Slice { beg, end, single_char, .. } => {
                    assert_eq!(*beg.unwrap(), Operand::Number(1.0));
                    assert_eq!(*end.unwrap(), Operand::Number(4.0));
                    assert!(!single_char);
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_single_char_slice() {
        match parse("print s[2]") {
            ParsedNode::Leaf(LeafKind::Print { arg }) => match arg {
                Operand::Slice { single_char, end, .. } => {
                    assert!(single_char);
                    assert!(end.is_none());
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_post_increment() {
        match parse("i++") {
            ParsedNode::Leaf(LeafKind::PostInc { name }) => assert_eq!(name, "i"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_def_header() {
        match parse("def add(a, b)") {
            ParsedNode::Def { name, params } => {
                assert_eq!(name, "add");
                assert_eq!(params, vec!["a".to_string(), "b".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn excess_tokens_is_an_error() {
        assert!(matches!(
            parse_line(lex("i++ junk").unwrap().into()),
            Err(ParseError::ExcessTokens(_))
        ));
    }

    #[test]
    fn defer_parses_as_call_payload() {
        match parse("defer put(\"bye\")") {
            ParsedNode::Leaf(LeafKind::Defer { name, args }) => {
                assert_eq!(name, "put");
                assert_eq!(args, vec![Operand::Str("bye".into())]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
