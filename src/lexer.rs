// ABOUTME: Tokenizer, turns one raw source line into a sequence of tokens

use crate::error::LexError;
use crate::token::Token;

fn is_bitwise(c: char) -> bool {
    c == '^' || c == '~'
}

fn is_brace(c: char) -> bool {
    c == '{' || c == '}'
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>' | '+' | '-' | '*' | '/' | '%')
}

fn is_paren(c: char) -> bool {
    c == '(' || c == ')'
}

fn is_sqbr(c: char) -> bool {
    c == '[' || c == ']'
}

fn is_syntax(c: char) -> bool {
    is_bitwise(c)
        || is_brace(c)
        || is_operator_char(c)
        || is_paren(c)
        || is_sqbr(c)
        || matches!(c, '.' | ',' | ':' | ';' | '!')
}

/// Tokenize one source line. A line that is empty, all whitespace, or a `#`
/// comment yields an empty token sequence.
pub fn lex(line: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = line.trim_end_matches('\n').chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '#' {
            break;
        }

        if is_bitwise(c) {
            tokens.push(Token::Bitwise(c));
            i += 1;
            continue;
        }

        if is_brace(c) {
            tokens.push(Token::Brace(c));
            i += 1;
            continue;
        }

        if is_paren(c) {
            tokens.push(Token::Paren(c));
            i += 1;
            continue;
        }

        if is_sqbr(c) {
            tokens.push(Token::SqBr(c));
            i += 1;
            continue;
        }

        // Operator class must run before the syntax catch-all so `==`, `!=`,
        // `<=`, `>=`, `++`, `--` are not split into two tokens.
        if is_operator_char(c) {
            let two = i + 1 < chars.len() && is_operator_char(chars[i + 1]);
            let width = if two { 2 } else { 1 };
            let text: String = chars[i..i + width].iter().collect();
            tokens.push(Token::Op(text));
            i += width;
            continue;
        }

        if is_syntax(c) {
            tokens.push(Token::Syntax(c));
            i += 1;
            continue;
        }

        if c == '"' || c == '\'' {
            let (tok, consumed) = lex_string(&chars[i..])?;
            tokens.push(tok);
            i += consumed;
            continue;
        }

        if c.is_control() {
            return Err(LexError::UnclassifiableChar(c));
        }

        if c.is_ascii_digit() {
            let (tok, consumed) = lex_number(&chars[i..]);
            tokens.push(tok);
            i += consumed;
            continue;
        }

        let (tok, consumed) = lex_identifier(&chars[i..]);
        tokens.push(tok);
        i += consumed;
    }

    Ok(tokens)
}

/// Reads a quoted literal. Backslash escapes (and consumes) the following
/// character; it is dropped rather than translated, so `\'` inside a
/// `'...'` literal contributes a literal `'` without ending the string.
fn lex_string(rest: &[char]) -> Result<(Token, usize), LexError> {
    let quote = rest[0];
    let mut value = String::new();
    let mut i = 1;

    while i < rest.len() {
        if rest[i] == '\\' && i + 1 < rest.len() {
            value.push(rest[i + 1]);
            i += 2;
            continue;
        }
        if rest[i] == quote {
            return Ok((Token::Str(value), i + 1));
        }
        value.push(rest[i]);
        i += 1;
    }

    Err(LexError::UnterminatedString)
}

/// Consumes digits, `.`, and `,`; a trailing `,` is un-consumed. Numeric
/// validity is not checked here; `f64::parse` does that at token
/// construction, deferring validation until the token is actually used.
fn lex_number(rest: &[char]) -> (Token, usize) {
    let mut i = 0;
    while i < rest.len() && (rest[i].is_ascii_digit() || rest[i] == '.' || rest[i] == ',') {
        i += 1;
    }
    if i > 0 && rest[i - 1] == ',' {
        i -= 1;
    }

    let text: String = rest[..i].iter().filter(|c| **c != ',').collect();
    let value = text.parse::<f64>().unwrap_or(f64::NAN);
    (Token::Number(value), i)
}

fn lex_identifier(rest: &[char]) -> (Token, usize) {
    let mut i = 0;
    while i < rest.len() && !rest[i].is_whitespace() && !is_syntax(rest[i]) {
        i += 1;
    }
    let text: String = rest[..i].iter().collect();
    (Token::Ident(text), i)
}
