//! Number-expression evaluation.
//!
//! A pure reduction of an [`Expression`] subtree into a [`Number`]; no
//! ambient state. All four operators share one precedence level and
//! left-associate, arithmetic wraps modulo 2^32, and the long flag of a
//! result is the disjunction of its operands' flags.

use crate::ast::Expression;
use crate::literals::{parse_number, Number};

pub fn eval(expression: &Expression, source: &[u8]) -> Number {
    match expression {
        Expression::Literal(token) => parse_number(token.slice(source)),
        Expression::Grouped(grouped) => eval(&grouped.expression, source),
        Expression::Binary(binary) => {
            let left = eval(&binary.left, source);
            let right = eval(&binary.right, source);
            apply(binary.operator.operator(source), left, right)
        }
        // A lone NOT contributes nothing on its own; it only clears bits
        // from its siblings, which eval_flags handles.
        Expression::Not(not) => {
            let number = parse_number(not.number.slice(source));
            Number {
                value: 0,
                is_long: number.is_long,
            }
        }
    }
}

pub fn apply(operator: u8, left: Number, right: Number) -> Number {
    let value = match operator {
        b'-' => left.value.wrapping_sub(right.value),
        b'|' => left.value | right.value,
        b'&' => left.value & right.value,
        _ => left.value.wrapping_add(right.value),
    };
    Number {
        value,
        is_long: left.is_long || right.is_long,
    }
}

/// Evaluates a style-like field over a starting mask of implicit bits.
///
/// Plain terms accumulate left to right with their operator; a `NOT n`
/// term instead clears `n`'s bits from the running value, which is how it
/// can remove bits of the implicit default.
pub fn eval_flags(default: u32, expression: &Expression, source: &[u8]) -> u32 {
    match expression {
        Expression::Not(not) => default & !parse_number(not.number.slice(source)).value,
        Expression::Binary(binary) => {
            let acc = eval_flags(default, &binary.left, source);
            match &*binary.right {
                Expression::Not(not) => acc & !parse_number(not.number.slice(source)).value,
                right => {
                    apply(
                        binary.operator.operator(source),
                        Number::new(acc),
                        eval(right, source),
                    )
                    .value
                }
            }
        }
        other => default | eval(other, source).value,
    }
}
