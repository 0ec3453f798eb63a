//! Evaluation of placement-rule formulas.
//!
//! Location rules describe where tiles go with small integer expressions
//! such as `W-1`, `(W - w) / 2` or `max(w, 8)`. The expressions may refer to
//! the device size (`W`, `H`) and to the footprint of the tile being placed
//! (`w`, `h`).
//!
//! Grammar:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/' | '%') unary)*
//! unary   := '-' unary | primary
//! primary := INT | VAR | FUNC '(' expr ',' expr ')' | '(' expr ')'
//! VAR     := 'W' | 'H' | 'w' | 'h'
//! FUNC    := 'min' | 'max' | 'gcd' | 'lcm'
//! ```

/// Values bound to the formula variables while placing one tile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulaVars {
    /// `W`: device width in grid cells.
    pub device_width: i64,
    /// `H`: device height in grid cells.
    pub device_height: i64,
    /// `w`: width of the tile being placed.
    pub tile_width: i64,
    /// `h`: height of the tile being placed.
    pub tile_height: i64,
}

impl FormulaVars {
    /// Binds the four variables.
    pub fn new(device_width: i64, device_height: i64, tile_width: i64, tile_height: i64) -> Self {
        Self {
            device_width,
            device_height,
            tile_width,
            tile_height,
        }
    }

    fn lookup(&self, name: &str) -> Option<i64> {
        match name {
            "W" => Some(self.device_width),
            "H" => Some(self.device_height),
            "w" => Some(self.tile_width),
            "h" => Some(self.tile_height),
            _ => None,
        }
    }
}

/// A malformed or unevaluable placement formula.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    /// The formula is empty or only whitespace.
    #[error("empty formula")]
    Empty,

    /// A character that cannot start any token.
    #[error("unexpected character '{ch}' at offset {offset} in formula `{expr}`")]
    UnexpectedChar {
        /// The full formula text.
        expr: String,
        /// The offending character.
        ch: char,
        /// Byte offset of the character.
        offset: usize,
    },

    /// A name that is neither a variable nor a function.
    #[error("unknown identifier `{name}` in formula `{expr}`")]
    UnknownIdentifier {
        /// The full formula text.
        expr: String,
        /// The unknown name.
        name: String,
    },

    /// A token where another was required.
    #[error("expected {expected}, found {found} in formula `{expr}`")]
    UnexpectedToken {
        /// The full formula text.
        expr: String,
        /// What the parser was looking for.
        expected: &'static str,
        /// What it found instead.
        found: String,
    },

    /// Division or modulo by zero.
    #[error("division by zero in formula `{expr}`")]
    DivisionByZero {
        /// The full formula text.
        expr: String,
    },

    /// Parentheses, function calls or unary minus nest too deeply.
    #[error("formula nests deeper than {limit} levels: `{expr}`")]
    TooDeep {
        /// The full formula text.
        expr: String,
        /// The nesting limit.
        limit: usize,
    },

    /// A literal or intermediate result does not fit in 64 bits.
    #[error("integer overflow in formula `{expr}`")]
    Overflow {
        /// The full formula text.
        expr: String,
    },
}

/// Deepest nesting of parentheses, calls and unary minus the parser accepts.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Int(i64),
    Name(String),
    Op(char),
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Int(v) => format!("`{v}`"),
            Token::Name(n) => format!("`{n}`"),
            Token::Op(c) => format!("`{c}`"),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
        }
    }
}

/// Evaluates placement-rule formulas.
///
/// Stateless; each call tokenizes and evaluates the expression from
/// scratch, so one evaluator can be shared between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaEvaluator;

impl FormulaEvaluator {
    /// Creates a new evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `expr` with the given variable bindings.
    ///
    /// # Errors
    ///
    /// Returns [`FormulaError`] if the expression does not follow the
    /// grammar, names an unknown identifier, divides by zero, or overflows.
    pub fn evaluate(&self, expr: &str, vars: &FormulaVars) -> Result<i64, FormulaError> {
        let tokens = tokenize(expr)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }
        let mut parser = Parser {
            expr,
            tokens,
            pos: 0,
            depth: 0,
            vars,
        };
        let value = parser.expr()?;
        match parser.peek() {
            None => Ok(value),
            Some(tok) => Err(parser.unexpected("end of formula", Some(tok.clone()))),
        }
    }
}

fn tokenize(expr: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = expr.char_indices().peekable();

    while let Some(&(offset, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' => {
                let mut value: i64 = 0;
                while let Some(&(_, d)) = chars.peek() {
                    let Some(digit) = d.to_digit(10) else { break };
                    value = value
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(i64::from(digit)))
                        .ok_or_else(|| FormulaError::Overflow {
                            expr: expr.to_string(),
                        })?;
                    chars.next();
                }
                tokens.push(Token::Int(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                tokens.push(Token::Name(name));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(ch));
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            _ => {
                return Err(FormulaError::UnexpectedChar {
                    expr: expr.to_string(),
                    ch,
                    offset,
                })
            }
        }
    }

    Ok(tokens)
}

struct Parser<'e> {
    expr: &'e str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    vars: &'e FormulaVars,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn unexpected(&self, expected: &'static str, found: Option<Token>) -> FormulaError {
        FormulaError::UnexpectedToken {
            expr: self.expr.to_string(),
            expected,
            found: found.map_or_else(|| "end of formula".to_string(), |t| t.describe()),
        }
    }

    fn expect(&mut self, want: Token, expected: &'static str) -> Result<(), FormulaError> {
        match self.bump() {
            Some(tok) if tok == want => Ok(()),
            other => Err(self.unexpected(expected, other)),
        }
    }

    fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth == MAX_NESTING {
            return Err(FormulaError::TooDeep {
                expr: self.expr.to_string(),
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn overflow(&self) -> FormulaError {
        FormulaError::Overflow {
            expr: self.expr.to_string(),
        }
    }

    fn expr(&mut self) -> Result<i64, FormulaError> {
        let mut lhs = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.bump();
            let rhs = self.term()?;
            lhs = if op == '+' {
                lhs.checked_add(rhs)
            } else {
                lhs.checked_sub(rhs)
            }
            .ok_or_else(|| self.overflow())?;
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<i64, FormulaError> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/' | '%'))) = self.peek().cloned() {
            self.bump();
            let rhs = self.unary()?;
            if op != '*' && rhs == 0 {
                return Err(FormulaError::DivisionByZero {
                    expr: self.expr.to_string(),
                });
            }
            lhs = match op {
                '*' => lhs.checked_mul(rhs),
                '/' => lhs.checked_div(rhs),
                _ => lhs.checked_rem(rhs),
            }
            .ok_or_else(|| self.overflow())?;
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<i64, FormulaError> {
        if self.peek() == Some(&Token::Op('-')) {
            self.bump();
            let value = self.nested(Self::unary)?;
            return value.checked_neg().ok_or_else(|| self.overflow());
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<i64, FormulaError> {
        match self.bump() {
            Some(Token::Int(value)) => Ok(value),
            Some(Token::LParen) => self.nested(|p| {
                let value = p.expr()?;
                p.expect(Token::RParen, "`)`")?;
                Ok(value)
            }),
            Some(Token::Name(name)) => {
                if let Some(value) = self.vars.lookup(&name) {
                    return Ok(value);
                }
                let func: fn(i64, i64) -> Option<i64> = match name.as_str() {
                    "min" => |a, b| Some(a.min(b)),
                    "max" => |a, b| Some(a.max(b)),
                    "gcd" => |a, b| Some(gcd(a, b)),
                    "lcm" => lcm,
                    _ => {
                        return Err(FormulaError::UnknownIdentifier {
                            expr: self.expr.to_string(),
                            name,
                        })
                    }
                };
                self.expect(Token::LParen, "`(` after function name")?;
                let (a, b) = self.nested(|p| {
                    let a = p.expr()?;
                    p.expect(Token::Comma, "`,`")?;
                    let b = p.expr()?;
                    p.expect(Token::RParen, "`)`")?;
                    Ok((a, b))
                })?;
                func(a, b).ok_or_else(|| self.overflow())
            }
            other => Err(self.unexpected("a number, variable or `(`", other)),
        }
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    // gcd(i64::MIN, 0) is the only result that does not fit back.
    i64::try_from(a).unwrap_or(i64::MAX)
}

fn lcm(a: i64, b: i64) -> Option<i64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b).map(i64::abs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> FormulaVars {
        FormulaVars::new(40, 30, 2, 3)
    }

    fn eval(expr: &str) -> Result<i64, FormulaError> {
        FormulaEvaluator::new().evaluate(expr, &vars())
    }

    #[test]
    fn literals_and_variables() {
        assert_eq!(eval("7").unwrap(), 7);
        assert_eq!(eval("W").unwrap(), 40);
        assert_eq!(eval("H").unwrap(), 30);
        assert_eq!(eval("w").unwrap(), 2);
        assert_eq!(eval("h").unwrap(), 3);
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(eval("W-1").unwrap(), 39);
        assert_eq!(eval("2 + 3 * 4").unwrap(), 14);
        assert_eq!(eval("(2 + 3) * 4").unwrap(), 20);
        assert_eq!(eval("20 - 5 - 3").unwrap(), 12);
        assert_eq!(eval("64 / 4 / 2").unwrap(), 8);
        assert_eq!(eval("W % 7").unwrap(), 5);
        assert_eq!(eval("(W - w) / 2").unwrap(), 19);
    }

    #[test]
    fn unary_minus() {
        assert_eq!(eval("-1").unwrap(), -1);
        assert_eq!(eval("-(W - 1)").unwrap(), -39);
        assert_eq!(eval("2 * -h").unwrap(), -6);
        assert_eq!(eval("--4").unwrap(), 4);
    }

    #[test]
    fn functions() {
        assert_eq!(eval("min(W, H)").unwrap(), 30);
        assert_eq!(eval("max(w, h) + 1").unwrap(), 4);
        assert_eq!(eval("gcd(W, H)").unwrap(), 10);
        assert_eq!(eval("lcm(4, 6)").unwrap(), 12);
        assert_eq!(eval("lcm(0, 6)").unwrap(), 0);
    }

    #[test]
    fn nesting_is_capped() {
        let ok = format!("{}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(eval(&ok).unwrap(), 1);
        assert_eq!(eval(&format!("{}4", "-".repeat(MAX_NESTING))).unwrap(), 4);

        let parens = format!("{}1", "(".repeat(10_000));
        assert!(matches!(eval(&parens), Err(FormulaError::TooDeep { limit: MAX_NESTING, .. })));
        let minus = format!("{}1", "-".repeat(10_000));
        assert!(matches!(eval(&minus), Err(FormulaError::TooDeep { .. })));
        let calls = format!("{}1{}", "min(1, ".repeat(100), ")".repeat(100));
        assert!(matches!(eval(&calls), Err(FormulaError::TooDeep { .. })));
    }

    #[test]
    fn whitespace_insignificant() {
        assert_eq!(eval("  W   -  1 ").unwrap(), 39);
    }

    #[test]
    fn empty_is_error() {
        assert_eq!(eval("").unwrap_err(), FormulaError::Empty);
        assert_eq!(eval("   ").unwrap_err(), FormulaError::Empty);
    }

    #[test]
    fn unknown_identifier() {
        let err = eval("W - x").unwrap_err();
        assert!(matches!(err, FormulaError::UnknownIdentifier { ref name, .. } if name == "x"));
    }

    #[test]
    fn unexpected_character() {
        let err = eval("W ^ 2").unwrap_err();
        assert!(matches!(err, FormulaError::UnexpectedChar { ch: '^', offset: 2, .. }));
    }

    #[test]
    fn unbalanced_parens() {
        assert!(matches!(eval("(W - 1").unwrap_err(), FormulaError::UnexpectedToken { .. }));
        assert!(matches!(eval("W - 1)").unwrap_err(), FormulaError::UnexpectedToken { .. }));
    }

    #[test]
    fn dangling_operator() {
        let err = eval("W -").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected a number, variable or `(`, found end of formula in formula `W -`"
        );
    }

    #[test]
    fn function_arity() {
        assert!(eval("min(W)").is_err());
        assert!(eval("max W, H").is_err());
    }

    #[test]
    fn division_by_zero() {
        assert!(matches!(eval("W / 0").unwrap_err(), FormulaError::DivisionByZero { .. }));
        assert!(matches!(eval("W % (w - 2)").unwrap_err(), FormulaError::DivisionByZero { .. }));
    }

    #[test]
    fn overflow() {
        assert!(matches!(
            eval("99999999999999999999").unwrap_err(),
            FormulaError::Overflow { .. }
        ));
        assert!(matches!(
            eval("9223372036854775807 + 1").unwrap_err(),
            FormulaError::Overflow { .. }
        ));
    }
}
