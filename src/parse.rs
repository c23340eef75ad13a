use lazy_static::lazy_static;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest::Parser;

use crate::errors::*;
use crate::tree::*;

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

lazy_static! {
    // lowest priority first
    static ref PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or_op, Assoc::Left) | Op::infix(Rule::xor_op, Assoc::Left))
        .op(Op::infix(Rule::and_op, Assoc::Left))
        .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
        .op(Op::infix(Rule::mul, Assoc::Left)
            | Op::infix(Rule::div, Assoc::Left)
            | Op::infix(Rule::mod_op, Assoc::Left)
            | Op::infix(Rule::implicit, Assoc::Left))
        .op(Op::prefix(Rule::neg)
            | Op::prefix(Rule::pos)
            | Op::prefix(Rule::not_op)
            | Op::prefix(Rule::sqrt_op)
            | Op::prefix(Rule::cbrt_op)
            | Op::prefix(Rule::fourth_op)
            | Op::prefix(Rule::nth_root))
        .op(Op::infix(Rule::pow, Assoc::Right))
        .op(Op::postfix(Rule::factorial) | Op::postfix(Rule::percent) | Op::postfix(Rule::power_script));
}

type NodeResult = Result<Node, EvalError>;

fn unexpected(pair: &Pair<Rule>) -> EvalError {
    EvalError::syntax(pair.as_str())
}

fn next<'i>(pairs: &mut Pairs<'i, Rule>, context: &str) -> Result<Pair<'i, Rule>, EvalError> {
    pairs.next().ok_or_else(|| EvalError::syntax(context))
}

/// `name` with an optional superscript power after it
fn name_with_power(pair: Pair<Rule>) -> Result<(String, Option<String>), EvalError> {
    let text = pair.as_str().to_string();
    let mut inner = pair.into_inner();
    let name = next(&mut inner, &text)?.as_str().to_string();
    let power = inner.next().map(|p| p.as_str().to_string());
    Ok((name, power))
}

fn bracket(op: UnaryOp, pair: Pair<Rule>) -> NodeResult {
    let text = pair.as_str().to_string();
    let inner = next(&mut pair.into_inner(), &text)?;
    Ok(Node::unary(op, expression(inner.into_inner())?))
}

fn primary(pair: Pair<Rule>) -> NodeResult {
    match pair.as_rule() {
        Rule::number => Ok(Node::constant(pair.as_str())),
        Rule::variable => match name_with_power(pair)? {
            (name, None) => Ok(Node::Variable(name)),
            (name, Some(power)) => Ok(Node::VariableWithPower { name, power }),
        },
        Rule::function => {
            let text = pair.as_str().to_string();
            let mut inner = pair.into_inner();
            let (name, power) = name_with_power(next(&mut inner, &text)?)?;
            let argument = Box::new(expression(next(&mut inner, &text)?.into_inner())?);
            Ok(match power {
                None => Node::Function { name, argument },
                Some(power) => Node::FunctionWithPower { name, power, argument },
            })
        }
        Rule::paren => {
            let text = pair.as_str().to_string();
            expression(next(&mut pair.into_inner(), &text)?.into_inner())
        }
        Rule::floor => bracket(UnaryOp::Floor, pair),
        Rule::ceiling => bracket(UnaryOp::Ceiling, pair),
        Rule::round => bracket(UnaryOp::Round, pair),
        Rule::fraction => bracket(UnaryOp::Fraction, pair),
        Rule::abs => bracket(UnaryOp::Abs, pair),
        _ => Err(unexpected(&pair)),
    }
}

fn expression(pairs: Pairs<Rule>) -> NodeResult {
    PRATT
        .map_primary(primary)
        .map_prefix(|op, rhs| {
            let rhs = rhs?;
            let unary = match op.as_rule() {
                Rule::pos => return Ok(rhs),
                Rule::neg => UnaryOp::Negate,
                Rule::not_op => UnaryOp::Not,
                Rule::sqrt_op => UnaryOp::Sqrt,
                Rule::cbrt_op => UnaryOp::CubeRoot,
                Rule::fourth_op => UnaryOp::FourthRoot,
                Rule::nth_root => {
                    return Ok(Node::NthRoot {
                        index: op.as_str().trim_end_matches('√').to_string(),
                        operand: Box::new(rhs),
                    })
                }
                _ => return Err(unexpected(&op)),
            };
            Ok(Node::unary(unary, rhs))
        })
        .map_postfix(|lhs, op| {
            let lhs = lhs?;
            match op.as_rule() {
                Rule::factorial => Ok(Node::unary(UnaryOp::Factorial, lhs)),
                Rule::percent => Ok(Node::unary(UnaryOp::Percent, lhs)),
                Rule::power_script => Ok(Node::PowerInt {
                    base: Box::new(lhs),
                    exponent: op.as_str().to_string(),
                }),
                _ => Err(unexpected(&op)),
            }
        })
        .map_infix(|lhs, op, rhs| {
            let (lhs, rhs) = (lhs?, rhs?);
            let binary = match op.as_rule() {
                Rule::or_op => BinaryOp::Or,
                Rule::xor_op => BinaryOp::Xor,
                Rule::and_op => BinaryOp::And,
                Rule::mul | Rule::implicit => BinaryOp::Multiply,
                Rule::div => BinaryOp::Divide,
                Rule::mod_op => BinaryOp::Modulus,
                Rule::pow => BinaryOp::Power,
                // `a + p%` and `a - p%` change `a` by `p` percent of itself
                Rule::add | Rule::sub => {
                    let (plain, percent) = match op.as_rule() {
                        Rule::add => (BinaryOp::Add, BinaryOp::AddPercent),
                        _ => (BinaryOp::Subtract, BinaryOp::SubtractPercent),
                    };
                    return Ok(match rhs {
                        Node::Unary {
                            op: UnaryOp::Percent,
                            operand,
                        } => Node::Binary {
                            op: percent,
                            left: Box::new(lhs),
                            right: operand,
                        },
                        rhs => Node::binary(plain, lhs, rhs),
                    });
                }
                _ => return Err(unexpected(&op)),
            };
            Ok(Node::binary(binary, lhs, rhs))
        })
        .parse(pairs)
}

fn statement(pair: Pair<Rule>) -> NodeResult {
    let text = pair.as_str().to_string();
    match pair.as_rule() {
        Rule::expr => expression(pair.into_inner()),
        Rule::assignment => {
            let mut inner = pair.into_inner();
            let name = next(&mut inner, &text)?.as_str().to_string();
            let value = Box::new(expression(next(&mut inner, &text)?.into_inner())?);
            Ok(Node::Assign { name, value })
        }
        Rule::conversion => {
            let mut value = None;
            let mut units = Vec::new();
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::number => value = Some(Box::new(Node::constant(p.as_str()))),
                    Rule::unit => units.push(p.as_str().to_string()),
                    _ => {}
                }
            }
            let mut units = units.into_iter();
            match (units.next(), units.next()) {
                (Some(from), Some(to)) => Ok(Node::Convert { value, from, to }),
                _ => Err(EvalError::syntax(&text)),
            }
        }
        _ => Err(unexpected(&pair)),
    }
}

/// Parses an expression, an assignment `name = expr` or a unit conversion
/// `[number] unit in unit` into a tree
pub fn parse_expression(expr: &str) -> Result<Node, EvalError> {
    let pairs = match CalcParser::parse(Rule::statement, expr) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(expr, "grammar rejected expression: {}", e);
            return Err(EvalError::syntax(expr));
        }
    };
    for pair in pairs {
        if pair.as_rule() != Rule::EOI {
            let node = statement(pair)?;
            tracing::debug!(?node, "parsed");
            return Ok(node);
        }
    }
    Err(EvalError::syntax(expr))
}

/// Parses and evaluates an expression
pub fn evaluate(expr: &str, options: &EvalOptions, resolver: &mut dyn Resolver) -> EvalResult {
    let node = parse_expression(expr)?;
    evaluate_tree(&node, options, resolver)
}
