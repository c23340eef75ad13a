use crate::convert::{subscript_to_i64, superscript_to_i64};
use crate::errors::*;
use crate::trig::AngleUnit;
use crate::value::*;

/// Expression evaluation result: either value or error
pub type EvalResult = Result<Value, EvalError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// floored modulus, or modular exponentiation when the left side is a power
    Modulus,
    Power,
    /// `x + p%`
    AddPercent,
    /// `x - p%`
    SubtractPercent,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add | BinaryOp::AddPercent => "+",
            BinaryOp::Subtract | BinaryOp::SubtractPercent => "−",
            BinaryOp::Multiply => "×",
            BinaryOp::Divide => "÷",
            BinaryOp::Modulus => "mod",
            BinaryOp::Power => "^",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    /// `x%`
    Percent,
    Not,
    Factorial,
    Sqrt,
    CubeRoot,
    FourthRoot,
    Floor,
    Ceiling,
    Round,
    /// fractional part, `x - floor(x)`
    Fraction,
    Abs,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "−",
            UnaryOp::Percent => "%",
            UnaryOp::Not => "not",
            UnaryOp::Factorial => "!",
            UnaryOp::Sqrt => "√",
            UnaryOp::CubeRoot => "∛",
            UnaryOp::FourthRoot => "∜",
            UnaryOp::Floor => "⌊⌋",
            UnaryOp::Ceiling => "⌈⌉",
            UnaryOp::Round => "[]",
            UnaryOp::Fraction => "{}",
            UnaryOp::Abs => "||",
        }
    }
}

/// Node of a parsed expression. Leaves keep the token text, power and root
/// forms keep their superscript or subscript payload undecoded
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// numeric literal
    Constant(String),
    Variable(String),
    /// `x²`: the superscript applies to the whole variable, or to its last
    /// letter when the name is read as a product of one-letter variables
    VariableWithPower {
        name: String,
        power: String,
    },
    Function {
        name: String,
        argument: Box<Node>,
    },
    /// `sin²(x)`; a negative power calls the inverse function `sin⁻¹`
    FunctionWithPower {
        name: String,
        power: String,
        argument: Box<Node>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    /// `₃√x`
    NthRoot {
        index: String,
        operand: Box<Node>,
    },
    /// `x³`
    PowerInt {
        base: Box<Node>,
        exponent: String,
    },
    /// `[value] from in to`; without a value the conversion rate is returned
    Convert {
        value: Option<Box<Node>>,
        from: String,
        to: String,
    },
    Assign {
        name: String,
        value: Box<Node>,
    },
}

impl Node {
    pub fn constant(token: &str) -> Node {
        Node::Constant(token.to_string())
    }

    pub fn variable(name: &str) -> Node {
        Node::Variable(name.to_string())
    }

    pub fn function(name: &str, argument: Node) -> Node {
        Node::Function {
            name: name.to_string(),
            argument: Box::new(argument),
        }
    }

    pub fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Node) -> Node {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

/// Per-call evaluation settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalOptions {
    /// base of numeric literals without a subscript suffix
    pub base: u32,
    /// word length in bits for boolean operations
    pub wordlen: u32,
    pub angle_units: AngleUnit,
    pub context: Context,
}

impl Default for EvalOptions {
    fn default() -> EvalOptions {
        EvalOptions {
            base: 10,
            wordlen: 32,
            angle_units: AngleUnit::Radians,
            context: Context::default(),
        }
    }
}

impl EvalOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_base(mut self, base: u32) -> Self {
        self.base = base;
        self
    }

    pub fn with_wordlen(mut self, wordlen: u32) -> Self {
        self.wordlen = wordlen;
        self
    }

    pub fn with_angle_units(mut self, angle_units: AngleUnit) -> Self {
        self.angle_units = angle_units;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }
}

/// Lookups the evaluator delegates to its caller. Every method declines by
/// default, so an implementation provides only what it supports
pub trait Resolver {
    /// Value of a variable or constant
    fn variable(&self, _name: &str) -> Option<Value> {
        None
    }

    fn set_variable(&mut self, name: &str, _value: &Value) -> Result<(), EvalError> {
        Err(EvalError::new(
            ErrorKind::UnknownVariable,
            Some(name),
            format!("Cannot assign a value to '{}'", name),
        ))
    }

    /// Applies a function by name. `Ok(None)` means the function is unknown
    fn function(&self, _name: &str, _argument: &Value, _options: &EvalOptions) -> MathResult<Option<Value>> {
        Ok(None)
    }

    /// Converts between units, `None` if the conversion is unknown
    fn convert(&self, _value: &Value, _from: &str, _to: &str) -> Option<Value> {
        None
    }
}

/// Resolver that knows nothing
pub struct NoResolver;

impl Resolver for NoResolver {}

/// Walks a tree bottom-up and stops at the first error
pub struct Evaluator<'a> {
    options: &'a EvalOptions,
    resolver: &'a mut dyn Resolver,
}

fn superscript(token: &str) -> Result<i64, EvalError> {
    superscript_to_i64(token).ok_or_else(|| MathError::Parse(token.to_string()).into())
}

fn math(res: MathResult, token: &str) -> EvalResult {
    res.map_err(|e| EvalError::from(e).with_token(token))
}

impl<'a> Evaluator<'a> {
    pub fn new(options: &'a EvalOptions, resolver: &'a mut dyn Resolver) -> Self {
        Evaluator { options, resolver }
    }

    fn ctx(&self) -> Context {
        self.options.context
    }

    pub fn evaluate(&mut self, node: &Node) -> EvalResult {
        match node {
            Node::Constant(token) => math(self.ctx().parse(token, self.options.base), token),
            Node::Variable(name) => self.variable(name, None),
            Node::VariableWithPower { name, power } => self.variable(name, Some(superscript(power)?)),
            Node::Function { name, argument } => {
                let arg = self.evaluate(argument)?;
                self.function(name, &arg)
            }
            Node::FunctionWithPower { name, power, argument } => {
                let pow = superscript(power)?;
                let arg = self.evaluate(argument)?;
                let (res, pow) = if pow < 0 {
                    let inverse = format!("{}⁻¹", name);
                    let res = self.function(&inverse, &arg).map_err(|e| match e.kind {
                        ErrorKind::UnknownFunction => EvalError::unknown_function(name),
                        _ => e,
                    })?;
                    (res, -pow)
                } else {
                    (self.function(name, &arg)?, pow)
                };
                math(res.power_integer(&pow.into()), name)
            }
            Node::Binary { op, left, right } => self.binary(*op, left, right),
            Node::Unary { op, operand } => {
                let v = self.evaluate(operand)?;
                self.unary(*op, &v)
            }
            Node::NthRoot { index, operand } => {
                let n = subscript_to_i64(index).ok_or_else(|| EvalError::from(MathError::Parse(index.to_string())))?;
                let v = self.evaluate(operand)?;
                math(v.root(n), "√")
            }
            Node::PowerInt { base, exponent } => {
                let n = superscript(exponent)?;
                let v = self.evaluate(base)?;
                math(v.power_integer(&n.into()), exponent)
            }
            Node::Convert { value, from, to } => {
                let v = match value {
                    Some(node) => self.evaluate(node)?,
                    None => self.ctx().integer(1),
                };
                self.resolver.convert(&v, from, to).ok_or_else(|| EvalError::unknown_conversion(from, to))
            }
            Node::Assign { name, value } => {
                let v = self.evaluate(value)?;
                self.resolver.set_variable(name, &v)?;
                Ok(v)
            }
        }
    }

    /// Looks a variable up. An unknown name of several letters is tried as a
    /// product of one-letter variables: `xy` is `x × y`
    fn variable(&self, name: &str, power: Option<i64>) -> EvalResult {
        let raise = |v: Value| match power {
            Some(p) => math(v.power_integer(&p.into()), name),
            None => Ok(v),
        };
        if let Some(v) = self.resolver.variable(name) {
            return raise(v);
        }

        let letters: Vec<char> = name.chars().collect();
        if letters.len() < 2 {
            return Err(EvalError::unknown_variable(name));
        }
        let mut product = self.ctx().integer(1);
        for (i, c) in letters.iter().enumerate() {
            let mut buf = [0u8; 4];
            let v = match self.resolver.variable(c.encode_utf8(&mut buf)) {
                Some(v) => v,
                None => {
                    tracing::trace!(name, letter = %c, "variable is not a product of letters");
                    return Err(EvalError::unknown_variable(name));
                }
            };
            let v = if i + 1 == letters.len() { raise(v)? } else { v };
            product = product.multiply(&v);
        }
        Ok(product)
    }

    fn function(&self, name: &str, arg: &Value) -> EvalResult {
        match self.resolver.function(name, arg, self.options) {
            Ok(Some(v)) => Ok(v),
            Ok(None) => Err(EvalError::unknown_function(name)),
            Err(e) => Err(EvalError::from(e).with_token(name)),
        }
    }

    /// operands of boolean operations must fit the word
    fn word(&self, v: &Value, op: &str) -> Result<(), EvalError> {
        if v.is_overflow(self.options.wordlen) {
            return Err(EvalError::from(MathError::Overflow(self.options.wordlen)).with_token(op));
        }
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, left: &Node, right: &Node) -> EvalResult {
        let sym = op.symbol();
        if op == BinaryOp::Modulus {
            if let Node::Binary {
                op: BinaryOp::Power,
                left: base,
                right: exponent,
            } = left
            {
                let base = self.evaluate(base)?;
                let exponent = self.evaluate(exponent)?;
                let modulus = self.evaluate(right)?;
                return math(base.modular_exponentiation(&exponent, &modulus), sym);
            }
        }

        let l = self.evaluate(left)?;
        let r = self.evaluate(right)?;
        let ctx = self.ctx();
        let hundred = ctx.integer(100);
        match op {
            BinaryOp::Add => Ok(l.addition(&r)),
            BinaryOp::Subtract => Ok(l.subtract(&r)),
            BinaryOp::Multiply => Ok(l.multiply(&r)),
            BinaryOp::Divide => math(l.divide(&r), sym),
            BinaryOp::Modulus => math(l.modulus_divide(&r), sym),
            BinaryOp::Power => math(l.power(&r), sym),
            BinaryOp::AddPercent => {
                let factor = math(r.addition(&hundred).divide(&hundred), sym)?;
                Ok(l.multiply(&factor))
            }
            BinaryOp::SubtractPercent => {
                let factor = math(r.subtract(&hundred).divide(&hundred.negate()), sym)?;
                Ok(l.multiply(&factor))
            }
            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
                self.word(&l, sym)?;
                self.word(&r, sym)?;
                let res = match op {
                    BinaryOp::And => l.and(&r),
                    BinaryOp::Or => l.or(&r),
                    _ => l.xor(&r),
                };
                math(res, sym)
            }
        }
    }

    fn unary(&self, op: UnaryOp, v: &Value) -> EvalResult {
        let sym = op.symbol();
        match op {
            UnaryOp::Negate => Ok(v.negate()),
            UnaryOp::Percent => math(v.divide(&self.ctx().integer(100)), sym),
            UnaryOp::Not => {
                self.word(v, sym)?;
                math(v.not(self.options.wordlen), sym)
            }
            UnaryOp::Factorial => math(v.factorial(), sym),
            UnaryOp::Sqrt => math(v.sqrt(), sym),
            UnaryOp::CubeRoot => math(v.root(3), sym),
            UnaryOp::FourthRoot => math(v.root(4), sym),
            UnaryOp::Floor => Ok(v.floor()),
            UnaryOp::Ceiling => Ok(v.ceiling()),
            UnaryOp::Round => Ok(v.round()),
            UnaryOp::Fraction => Ok(v.fractional_part()),
            UnaryOp::Abs => Ok(v.abs()),
        }
    }
}

/// Evaluates an already built tree
pub fn evaluate_tree(node: &Node, options: &EvalOptions, resolver: &mut dyn Resolver) -> EvalResult {
    let res = Evaluator::new(options, resolver).evaluate(node);
    match &res {
        Ok(v) => tracing::debug!(result = %v, "evaluated"),
        Err(e) => tracing::debug!(kind = %e.kind, token = ?e.token, "evaluation failed: {}", e),
    }
    res
}
