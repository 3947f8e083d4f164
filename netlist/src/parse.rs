use std::fmt::Display;

use indexmap::IndexMap;
use yap::{IntoTokens, Tokens};

use crate::{Cell, Const, Design, Module, ParamValue, Trit, Value, Wire};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Keyword(String),
    Id(String),
    Int(i64),
    Const(Const),
    String(String),
    Punct(char),
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Keyword(keyword) => write!(f, "{keyword}"),
            Token::Id(id) => write!(f, "{id}"),
            Token::Int(value) => write!(f, "{value}"),
            Token::Const(value) => write!(f, "{value}"),
            Token::String(value) => crate::param::write_string(f, value),
            Token::Punct(chr) => write!(f, "{chr}"),
        }
    }
}

fn parse_string(t: &mut impl Tokens<Item = char>) -> Result<String, String> {
    let mut value = Vec::new();
    loop {
        match t.next() {
            None => return Err("unterminated string".into()),
            Some('"') => break,
            Some('\\') => match t.next() {
                Some('n') => value.push(b'\n'),
                Some('t') => value.push(b'\t'),
                Some(chr @ '0'..='7') => {
                    let mut code = chr.to_digit(8).unwrap_or(0);
                    for _ in 0..2 {
                        match t.peek().and_then(|chr| chr.to_digit(8)) {
                            Some(digit) => {
                                t.next();
                                code = code * 8 + digit;
                            }
                            None => break,
                        }
                    }
                    value.push(code as u8);
                }
                Some(chr) => value.extend(chr.to_string().bytes()),
                None => return Err("unterminated string".into()),
            },
            Some(chr) => value.extend(chr.to_string().bytes()),
        }
    }
    String::from_utf8(value).map_err(|_| "string is not valid UTF-8".to_string())
}

fn parse_number(t: &mut impl Tokens<Item = char>) -> Result<Token, String> {
    let negative = t.token('-');
    let digits: String = t.take_while(|chr| chr.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Err("expected a number".into());
    }
    if !negative && t.token('\'') {
        let width: usize = digits.parse().map_err(|_| format!("invalid constant width {digits}"))?;
        let bits: String = t.take_while(|chr| matches!(chr, '0' | '1' | 'x' | 'z' | 'm' | '-')).collect();
        if bits.len() > width {
            return Err(format!("constant {width}'{bits} has more bits than its width"));
        }
        let mut value = Const::new();
        for chr in bits.chars().rev() {
            value.push(match chr {
                '0' => Trit::Zero,
                '1' => Trit::One,
                _ => Trit::Undef,
            });
        }
        // Bits missing from the text are zero.
        while value.len() < width {
            value.push(Trit::Zero);
        }
        return Ok(Token::Const(value));
    }
    let value: i64 = digits.parse().map_err(|_| format!("integer {digits} is out of range"))?;
    Ok(Token::Int(if negative { -value } else { value }))
}

fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut t = line.into_tokens();
    let mut tokens = Vec::new();
    loop {
        t.skip_while(|chr| chr.is_ascii_whitespace());
        let Some(chr) = t.peek() else { break };
        match chr {
            '#' => break,
            '"' => {
                t.next();
                tokens.push(Token::String(parse_string(&mut t)?));
            }
            '\\' | '$' => {
                let id: String = t.take_while(|chr| !chr.is_ascii_whitespace()).collect();
                tokens.push(Token::Id(id));
            }
            '-' | '0'..='9' => tokens.push(parse_number(&mut t)?),
            '[' | ']' | ':' | '{' | '}' => {
                t.next();
                tokens.push(Token::Punct(chr));
            }
            chr if chr.is_ascii_alphabetic() => {
                let keyword: String = t.take_while(|chr| chr.is_ascii_alphanumeric() || *chr == '_').collect();
                tokens.push(Token::Keyword(keyword));
            }
            chr => return Err(format!("unexpected character {chr:?}")),
        }
    }
    Ok(tokens)
}

struct Line {
    number: usize,
    tokens: Vec<Token>,
    position: usize,
}

impl Line {
    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError { line: self.number, message: message.into() }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn keyword(&self) -> Option<&str> {
        match self.tokens.first() {
            Some(Token::Keyword(keyword)) => Some(keyword),
            _ => None,
        }
    }

    fn expect_id(&mut self) -> Result<String, ParseError> {
        match self.next() {
            Some(Token::Id(id)) => Ok(id),
            Some(token) => Err(self.error(format!("expected an identifier, found {token}"))),
            None => Err(self.error("expected an identifier")),
        }
    }

    fn expect_int(&mut self) -> Result<i64, ParseError> {
        match self.next() {
            Some(Token::Int(value)) => Ok(value),
            Some(token) => Err(self.error(format!("expected an integer, found {token}"))),
            None => Err(self.error("expected an integer")),
        }
    }

    fn expect_usize(&mut self) -> Result<usize, ParseError> {
        let value = self.expect_int()?;
        usize::try_from(value).map_err(|_| self.error(format!("expected a non-negative integer, found {value}")))
    }

    fn expect_punct(&mut self, expected: char) -> Result<(), ParseError> {
        match self.next() {
            Some(Token::Punct(chr)) if chr == expected => Ok(()),
            _ => Err(self.error(format!("expected '{expected}'"))),
        }
    }

    fn expect_end(&self) -> Result<(), ParseError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("unexpected {token} at end of line"))),
        }
    }

    fn param_value(&mut self) -> Result<ParamValue, ParseError> {
        match self.next() {
            Some(Token::Int(value)) => Ok(ParamValue::Int(value)),
            Some(Token::Const(value)) => Ok(ParamValue::Const(value)),
            Some(Token::String(value)) => Ok(ParamValue::String(value)),
            Some(token) => Err(self.error(format!("expected a value, found {token}"))),
            None => Err(self.error("expected a value")),
        }
    }

    fn sigspec(&mut self, module: &Module) -> Result<Value, ParseError> {
        match self.next() {
            Some(Token::Const(value)) => Ok(Value::from(value)),
            Some(Token::Int(value)) => Ok(Value::from(Const::from_uint(value as u64, 32))),
            Some(Token::Punct('{')) => {
                let mut parts = Vec::new();
                while self.peek() != Some(&Token::Punct('}')) {
                    if self.peek().is_none() {
                        return Err(self.error("unterminated concatenation"));
                    }
                    parts.push(self.sigspec(module)?);
                }
                self.next();
                // Concatenations list the most significant part first.
                let mut value = Value::new();
                for part in parts.iter().rev() {
                    value.extend(part.iter());
                }
                Ok(value)
            }
            Some(Token::Id(name)) => {
                let Some(wire_id) = module.find_wire(&name) else {
                    return Err(self.error(format!("wire {name} is not declared in module {}", module.name())));
                };
                let width = module.wire(wire_id).width;
                let value = module.wire_value(wire_id);
                if self.peek() != Some(&Token::Punct('[')) {
                    return Ok(value);
                }
                self.next();
                let msb = self.expect_usize()?;
                let lsb = if self.peek() == Some(&Token::Punct(':')) {
                    self.next();
                    self.expect_usize()?
                } else {
                    msb
                };
                self.expect_punct(']')?;
                if lsb > msb || msb >= width {
                    return Err(self.error(format!("slice [{msb}:{lsb}] is out of range for wire {name}")));
                }
                Ok(value.slice(lsb..msb + 1))
            }
            Some(token) => Err(self.error(format!("expected a signal, found {token}"))),
            None => Err(self.error("expected a signal")),
        }
    }
}

fn strip_public(name: String) -> String {
    match name.strip_prefix('\\') {
        Some(stripped) => stripped.to_string(),
        None => name,
    }
}

struct Parser {
    lines: Vec<Line>,
    position: usize,
    last_line: usize,
}

impl Parser {
    fn next_line(&mut self) -> Option<Line> {
        if self.position < self.lines.len() {
            let line = std::mem::replace(
                &mut self.lines[self.position],
                Line { number: 0, tokens: Vec::new(), position: 0 },
            );
            self.position += 1;
            Some(line)
        } else {
            None
        }
    }

    fn eof_error(&self, message: &str) -> ParseError {
        ParseError { line: self.last_line, message: message.into() }
    }

    fn attribute(line: &mut Line, attributes: &mut IndexMap<String, ParamValue>) -> Result<(), ParseError> {
        let name = line.expect_id()?;
        let value = line.param_value()?;
        line.expect_end()?;
        attributes.insert(name, value);
        Ok(())
    }

    fn design(&mut self) -> Result<Design, ParseError> {
        let mut design = Design::new();
        let mut attributes = IndexMap::new();
        while let Some(mut line) = self.next_line() {
            line.next();
            match line.keyword() {
                Some("autoidx") => {
                    line.expect_int()?;
                    line.expect_end()?;
                }
                Some("attribute") => Self::attribute(&mut line, &mut attributes)?,
                Some("module") => {
                    let name = line.expect_id()?;
                    line.expect_end()?;
                    if design.has_module(&name) {
                        return Err(line.error(format!("module {name} is defined more than once")));
                    }
                    let mut module = Module::new(name);
                    module.attributes = std::mem::take(&mut attributes);
                    self.module(&mut module)?;
                    design.add_module(module);
                }
                _ => return Err(line.error("expected 'module'")),
            }
        }
        Ok(design)
    }

    fn module(&mut self, module: &mut Module) -> Result<(), ParseError> {
        let mut attributes = IndexMap::new();
        loop {
            let Some(mut line) = self.next_line() else {
                return Err(self.eof_error(&format!("module {} is not terminated with 'end'", module.name())));
            };
            line.next();
            match line.keyword() {
                Some("end") => {
                    line.expect_end()?;
                    return Ok(());
                }
                Some("attribute") => Self::attribute(&mut line, &mut attributes)?,
                Some("parameter") => (),
                Some("wire") => {
                    let mut wire = Wire::new(String::new(), 1);
                    loop {
                        match line.next() {
                            Some(Token::Keyword(keyword)) => match keyword.as_str() {
                                "width" => wire.width = line.expect_usize()?,
                                "offset" => wire.start_offset = line.expect_int()?,
                                "upto" => wire.upto = true,
                                "signed" => (),
                                "input" => {
                                    wire.port_id = line.expect_usize()?;
                                    wire.port_input = true;
                                }
                                "output" => {
                                    wire.port_id = line.expect_usize()?;
                                    wire.port_output = true;
                                }
                                "inout" => {
                                    wire.port_id = line.expect_usize()?;
                                    wire.port_input = true;
                                    wire.port_output = true;
                                }
                                _ => return Err(line.error(format!("unknown wire option {keyword}"))),
                            },
                            Some(Token::Id(name)) => {
                                wire.name = name;
                                break;
                            }
                            _ => return Err(line.error("expected a wire name")),
                        }
                    }
                    line.expect_end()?;
                    if module.find_wire(&wire.name).is_some() || module.find_cell(&wire.name).is_some() {
                        return Err(line.error(format!("name {} is used more than once", wire.name)));
                    }
                    wire.attributes = std::mem::take(&mut attributes);
                    module.add_wire(wire);
                }
                Some("cell") => {
                    let kind = line.expect_id()?;
                    let name = line.expect_id()?;
                    line.expect_end()?;
                    if module.find_wire(&name).is_some() || module.find_cell(&name).is_some() {
                        return Err(line.error(format!("name {name} is used more than once")));
                    }
                    let mut cell = Cell::new(name, kind);
                    cell.attributes = std::mem::take(&mut attributes);
                    self.cell(module, &mut cell)?;
                    module.add_cell(cell);
                }
                Some("connect") => {
                    let lhs = line.sigspec(module)?;
                    let rhs = line.sigspec(module)?;
                    line.expect_end()?;
                    if lhs.len() != rhs.len() {
                        return Err(line.error(format!(
                            "connection of {} bits to {} bits",
                            lhs.len(),
                            rhs.len()
                        )));
                    }
                    if lhs.iter().any(|net| net.as_const().is_some()) {
                        return Err(line.error("left-hand side of a connection must not be constant"));
                    }
                    module.connect(lhs, rhs);
                }
                Some(keyword) => return Err(line.error(format!("unsupported statement '{keyword}'"))),
                None => return Err(line.error("expected a statement")),
            }
        }
    }

    fn cell(&mut self, module: &Module, cell: &mut Cell) -> Result<(), ParseError> {
        loop {
            let Some(mut line) = self.next_line() else {
                return Err(self.eof_error(&format!("cell {} is not terminated with 'end'", cell.name)));
            };
            line.next();
            match line.keyword() {
                Some("end") => {
                    line.expect_end()?;
                    return Ok(());
                }
                Some("parameter") => {
                    while let Some(Token::Keyword(_)) = line.peek() {
                        line.next();
                    }
                    let name = strip_public(line.expect_id()?);
                    let value = line.param_value()?;
                    line.expect_end()?;
                    cell.parameters.insert(name, value);
                }
                Some("connect") => {
                    let port = strip_public(line.expect_id()?);
                    let value = line.sigspec(module)?;
                    line.expect_end()?;
                    cell.connections.insert(port, value);
                }
                _ => return Err(line.error("expected 'parameter', 'connect', or 'end'")),
            }
        }
    }
}

/// Parses a design from RTLIL text.
pub fn parse(source: &str) -> Result<Design, ParseError> {
    let mut lines = Vec::new();
    let mut last_line = 0;
    for (index, text) in source.lines().enumerate() {
        last_line = index + 1;
        let tokens = tokenize(text).map_err(|message| ParseError { line: index + 1, message })?;
        if !tokens.is_empty() {
            lines.push(Line { number: index + 1, tokens, position: 0 });
        }
    }
    Parser { lines, position: 0, last_line }.design()
}
