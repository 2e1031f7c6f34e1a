#![forbid(unsafe_code)]

use tessera_ast::{Expr, InfixOp, Position};

use crate::convert::{to_bool, to_int, to_str};
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

impl Evaluator {
    pub(crate) fn eval_infix(
        &mut self,
        pos: Position,
        op: InfixOp,
        left: &Expr,
        right: &Expr,
    ) -> Result<Value, EvalError> {
        let l = self.eval_expression(left)?;

        // short-circuit "falsy && ..." and "truthy || ..."
        match op {
            InfixOp::And => {
                if to_bool(&l) == Some(false) {
                    return Ok(Value::Bool(false));
                }
            }
            InfixOp::Or => {
                if to_bool(&l) == Some(true) {
                    return Ok(Value::Bool(true));
                }
            }
            _ => {}
        }

        let r = self.eval_expression(right)?;

        if let (Some(ls), Some(rs)) = (to_str(&l), to_str(&r)) {
            return eval_string_infix(ls, rs, op, pos);
        }

        if let (Some(li), Some(ri)) = (to_int(&l), to_int(&r)) {
            return eval_int_infix(li, ri, op, pos);
        }

        if let (Some(lb), Some(rb)) = (to_bool(&l), to_bool(&r)) {
            return eval_bool_infix(lb, rb, op, pos);
        }

        Err(EvalError::new(
            pos,
            format!(
                "cannot handle expression types in '{op}' infix expression: {} vs {}",
                l.kind(),
                r.kind()
            ),
        ))
    }
}

fn eval_string_infix(l: &str, r: &str, op: InfixOp, pos: Position) -> Result<Value, EvalError> {
    match op {
        InfixOp::Eq => Ok(Value::Bool(l == r)),
        InfixOp::NotEq => Ok(Value::Bool(l != r)),
        InfixOp::Add => {
            // joining with an empty side returns the other side unchanged
            if l.is_empty() {
                return Ok(Value::Str(r.to_string()));
            }
            if r.is_empty() {
                return Ok(Value::Str(l.to_string()));
            }
            Ok(Value::Str(format!("{l}{r}")))
        }
        _ => Err(EvalError::new(
            pos,
            format!("unexpected operator in string infix expression: {op}"),
        )),
    }
}

fn eval_int_infix(l: i64, r: i64, op: InfixOp, pos: Position) -> Result<Value, EvalError> {
    let v = match op {
        InfixOp::Eq => Value::Bool(l == r),
        InfixOp::NotEq => Value::Bool(l != r),
        InfixOp::Lt => Value::Bool(l < r),
        InfixOp::Le => Value::Bool(l <= r),
        InfixOp::Gt => Value::Bool(l > r),
        InfixOp::Ge => Value::Bool(l >= r),
        InfixOp::Add => Value::Int(l.wrapping_add(r)),
        InfixOp::Sub => Value::Int(l.wrapping_sub(r)),
        InfixOp::Mul => Value::Int(l.wrapping_mul(r)),
        InfixOp::Div => {
            if r == 0 {
                return Err(EvalError::new(pos, "division by zero"));
            }
            Value::Int(l.wrapping_div(r))
        }
        InfixOp::Rem => {
            if r == 0 {
                return Err(EvalError::new(pos, "division by zero"));
            }
            Value::Int(l.wrapping_rem(r))
        }
        _ => {
            return Err(EvalError::new(
                pos,
                format!("unexpected operator in int infix expression: {op}"),
            ))
        }
    };

    Ok(v)
}

fn eval_bool_infix(l: bool, r: bool, op: InfixOp, pos: Position) -> Result<Value, EvalError> {
    match op {
        InfixOp::Eq => Ok(Value::Bool(l == r)),
        InfixOp::NotEq => Ok(Value::Bool(l != r)),
        InfixOp::And => Ok(Value::Bool(l && r)),
        InfixOp::Or => Ok(Value::Bool(l || r)),
        _ => Err(EvalError::new(
            pos,
            format!("unexpected operator in bool infix expression: {op}"),
        )),
    }
}
