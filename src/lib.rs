//! # Arbitrary-precision calculator core
//!
//! Every number is a complex value with a configurable binary precision
//! (1000 bits by default). Integers, rationals and reals are complex numbers
//! with a zero imaginary part, so `sqrt(-4)` simply evaluates to `2i`.
//!
//! The crate has three layers:
//! * the numeric library: methods on [`Value`] for arithmetic, powers and
//!   roots, trigonometric and hyperbolic functions, factorial, modular
//!   exponentiation, prime factorization, boolean word operations and
//!   parsing of numbers written in many scripts
//! * financial formulas in [`financial`]
//! * an expression evaluator: [`parse_expression`] builds a [`Node`] tree,
//!   [`evaluate_tree`] walks it and asks a [`Resolver`] for variables,
//!   functions and unit conversions
//!
//! [`Workspace`] is a ready to use resolver with constants, user variables,
//! the last result `ans` and the built-in functions.
//!
//! Numbers can be written as:
//! * decimal digits of many scripts: `42`, `٤٢`, `४२`
//! * with a subscript base: `ff₁₆`, `101₂`
//! * with a vulgar fraction: `1½`
//! * as degrees, minutes and seconds: `12°30'45"`
//!
//! Operators (starting from highest priority):
//! * `!`, `%` and superscript powers `x²` - postfix
//! * `^`, `**` - power (right associative)
//! * `-`, `+`, `not`, `√`, `∛`, `∜`, `₃√` - prefix
//! * `×`, `*`, `÷`, `/`, `mod` and implicit multiplication `2x`
//! * `+`, `-`
//! * `and`
//! * `or`, `xor`
//!
//! Brackets: `(x)`, floor `⌊x⌋`, ceiling `⌈x⌉`, round `[x]`, fractional part
//! `{x}` and absolute value `|x|`.
//!
//! Statements are expressions, assignments `x = 2 + 3` or conversions
//! `90 degrees in radians`.
//!
//! A percent after `+` or `-` is relative to the left side: `200 + 25%` is `250`.
//! A power followed by `mod` is computed as a modular power, so
//! `7^128 mod 13` never builds the huge intermediate number.
//!
//! ```
//! use mpcalc::{Workspace, ErrorKind};
//!
//! let mut ws = Workspace::new();
//! assert_eq!(ws.evaluate("2 + 3 * 4").unwrap().to_string(), "14");
//! assert_eq!(ws.evaluate("1/0").unwrap_err().kind, ErrorKind::Domain);
//! ```

#[macro_use]
extern crate pest_derive;

pub mod bitwise;
pub mod convert;
pub mod errors;
pub mod factor;
pub mod financial;
pub mod parse;
pub mod tree;
pub mod trig;
pub mod value;
pub mod workspace;

pub use errors::{ErrorKind, EvalError, MathError, StatusChannel};
pub use parse::{evaluate, parse_expression};
pub use tree::{evaluate_tree, BinaryOp, EvalOptions, EvalResult, Evaluator, NoResolver, Node, Resolver, UnaryOp};
pub use trig::AngleUnit;
pub use value::{Context, MathResult, Value, DEFAULT_PRECISION};
pub use workspace::Workspace;
