use crate::{QuadError, QuadResult, Scalar};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// Scalar expression as scheme constants are written in the literature,
/// e.g. `(155 - sqrt(15))/1200` or `3.298552309659655E-01/3`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expr {
    Const(BigRational),
    Pi,
    Sqrt(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Neg(Box<Expr>),
}

impl Expr {
    pub fn int(n: i64) -> Self {
        Expr::Const(BigRational::from_integer(BigInt::from(n)))
    }
    /// `n / d`; a zero `d` stays an unevaluated quotient that fails in
    /// [`eval`](Self::eval).
    pub fn rational(n: i64, d: i64) -> Self {
        if d == 0 {
            return Expr::div(Expr::int(n), Expr::int(d));
        }
        Expr::Const(BigRational::new(BigInt::from(n), BigInt::from(d)))
    }
    pub fn sqrt(a: Expr) -> Self {
        Expr::Sqrt(Box::new(a))
    }
    pub fn add(a: Expr, b: Expr) -> Self {
        Expr::Add(Box::new(a), Box::new(b))
    }
    pub fn sub(a: Expr, b: Expr) -> Self {
        Expr::Add(Box::new(a), Box::new(Expr::neg(b)))
    }
    pub fn mul(a: Expr, b: Expr) -> Self {
        Expr::Mul(Box::new(a), Box::new(b))
    }
    pub fn div(a: Expr, b: Expr) -> Self {
        Expr::Div(Box::new(a), Box::new(b))
    }
    pub fn neg(a: Expr) -> Self {
        Expr::Neg(Box::new(a))
    }

    /// Parse an expression over numbers, `pi`, `sqrt(..)`, `+ - * /` and
    /// parentheses. Decimal literals become exact rationals.
    pub fn parse(input: &str) -> QuadResult<Expr> {
        let mut parser = Parser {
            src: input.as_bytes(),
            pos: 0,
        };
        let expr = parser.expr()?;
        parser.skip_ws();
        if parser.pos != parser.src.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }

    /// Fold constant subtrees.
    pub fn simplify(self) -> Expr {
        match self {
            Expr::Add(a, b) => match (a.simplify(), b.simplify()) {
                (Expr::Const(c1), Expr::Const(c2)) => Expr::Const(c1 + c2),
                (Expr::Const(c), other) | (other, Expr::Const(c)) if c.is_zero() => other,
                (sa, sb) => Expr::add(sa, sb),
            },
            Expr::Mul(a, b) => match (a.simplify(), b.simplify()) {
                (Expr::Const(c1), Expr::Const(c2)) => Expr::Const(c1 * c2),
                (Expr::Const(c), other) | (other, Expr::Const(c)) if c.is_one() => other,
                (sa, sb) => Expr::mul(sa, sb),
            },
            Expr::Div(a, b) => match (a.simplify(), b.simplify()) {
                (Expr::Const(c1), Expr::Const(c2)) if !c2.is_zero() => Expr::Const(c1 / c2),
                (sa, Expr::Const(c)) if c.is_one() => sa,
                (sa, sb) => Expr::div(sa, sb),
            },
            Expr::Neg(a) => match a.simplify() {
                Expr::Const(c) => Expr::Const(-c),
                Expr::Neg(inner) => *inner,
                sa => Expr::neg(sa),
            },
            Expr::Sqrt(a) => Expr::sqrt(a.simplify()),
            other => other,
        }
    }

    /// Evaluate in the arithmetic of `T`.
    pub fn eval<T: Scalar>(&self) -> QuadResult<T> {
        match self {
            Expr::Const(c) => Ok(T::from_rational(c)),
            Expr::Pi => T::pi(),
            Expr::Sqrt(a) => a.eval::<T>()?.sqrt(),
            Expr::Add(a, b) => Ok(a.eval::<T>()?.add(&b.eval::<T>()?)),
            Expr::Mul(a, b) => Ok(a.eval::<T>()?.mul(&b.eval::<T>()?)),
            Expr::Div(a, b) => a.eval::<T>()?.div(&b.eval::<T>()?),
            Expr::Neg(a) => Ok(a.eval::<T>()?.neg()),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(c) => {
                if c.is_negative() {
                    write!(f, "(-{})", -c)
                } else if c.is_integer() {
                    write!(f, "{}", c.to_integer())
                } else {
                    write!(f, "({}/{})", c.numer(), c.denom())
                }
            }
            Expr::Pi => write!(f, "pi"),
            Expr::Sqrt(a) => write!(f, "sqrt({})", a),
            Expr::Add(a, b) => write!(f, "({} + {})", a, b),
            Expr::Mul(a, b) => write!(f, "({}*{})", a, b),
            Expr::Div(a, b) => write!(f, "({}/{})", a, b),
            Expr::Neg(a) => write!(f, "(-{})", a),
        }
    }
}

/// Largest power of ten a decimal literal may scale by.
const MAX_DECIMAL_SHIFT: u64 = 4096;

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, message: &str) -> QuadError {
        QuadError::Parse {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> QuadResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            if self.eat(b'+') {
                lhs = Expr::add(lhs, self.term()?);
            } else if self.eat(b'-') {
                lhs = Expr::sub(lhs, self.term()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn term(&mut self) -> QuadResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            if self.eat(b'*') {
                lhs = Expr::mul(lhs, self.unary()?);
            } else if self.eat(b'/') {
                lhs = Expr::div(lhs, self.unary()?);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn unary(&mut self) -> QuadResult<Expr> {
        if self.eat(b'-') {
            return Ok(Expr::neg(self.unary()?));
        }
        if self.eat(b'+') {
            return self.unary();
        }
        self.primary()
    }

    fn primary(&mut self) -> QuadResult<Expr> {
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let inner = self.expr()?;
                if !self.eat(b')') {
                    return Err(self.error("expected ')'"));
                }
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() => {
                let start = self.pos;
                while self.pos < self.src.len() && self.src[self.pos].is_ascii_alphanumeric() {
                    self.pos += 1;
                }
                match &self.src[start..self.pos] {
                    b"pi" => Ok(Expr::Pi),
                    b"sqrt" => {
                        if !self.eat(b'(') {
                            return Err(self.error("expected '(' after sqrt"));
                        }
                        let inner = self.expr()?;
                        if !self.eat(b')') {
                            return Err(self.error("expected ')'"));
                        }
                        Ok(Expr::sqrt(inner))
                    }
                    _ => {
                        self.pos = start;
                        Err(self.error("unknown identifier"))
                    }
                }
            }
            Some(_) => Err(self.error("unexpected character")),
            None => Err(self.error("unexpected end of input")),
        }
    }

    /// `digits [. digits] [(e|E) [+|-] digits]`, read exactly.
    fn number(&mut self) -> QuadResult<Expr> {
        let start = self.pos;
        let mut digits = String::new();
        let mut frac_len: i64 = 0;
        let mut seen_dot = false;
        while let Some(&c) = self.src.get(self.pos) {
            if c.is_ascii_digit() {
                digits.push(c as char);
                if seen_dot {
                    frac_len += 1;
                }
            } else if c == b'.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            self.pos += 1;
        }
        if digits.is_empty() {
            self.pos = start;
            return Err(self.error("malformed number"));
        }
        let mut exponent: i64 = 0;
        if matches!(self.src.get(self.pos), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            let negative = match self.src.get(self.pos) {
                Some(b'-') => {
                    self.pos += 1;
                    true
                }
                Some(b'+') => {
                    self.pos += 1;
                    false
                }
                _ => false,
            };
            let exp_start = self.pos;
            while matches!(self.src.get(self.pos), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            let text = std::str::from_utf8(&self.src[exp_start..self.pos])
                .map_err(|_| self.error("malformed exponent"))?;
            exponent = text
                .parse::<i64>()
                .map_err(|_| self.error("malformed exponent"))?;
            if negative {
                exponent = -exponent;
            }
        }
        let mantissa: BigInt = digits
            .parse()
            .map_err(|_| self.error("malformed number"))?;
        let shift = exponent
            .checked_sub(frac_len)
            .filter(|s| s.unsigned_abs() <= MAX_DECIMAL_SHIFT)
            .ok_or_else(|| self.error("exponent out of range"))?;
        let ten = BigRational::from_integer(BigInt::from(10));
        let power = num_traits::pow(ten, shift.unsigned_abs() as usize);
        let scale = if shift >= 0 { power } else { power.recip() };
        Ok(Expr::Const(BigRational::from_integer(mantissa) * scale))
    }
}
