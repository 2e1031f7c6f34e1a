#![forbid(unsafe_code)]

use tessera_ast::{Expr, Position, PrefixOp};

use crate::convert::{to_bool, to_int};
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

impl Evaluator {
    pub(crate) fn eval_prefix(
        &mut self,
        pos: Position,
        op: PrefixOp,
        expr: &Expr,
    ) -> Result<Value, EvalError> {
        let v = self.eval_expression(expr)?;

        match op {
            PrefixOp::Neg => to_int(&v).map(|i| Value::Int(i.wrapping_neg())),
            PrefixOp::Not => to_bool(&v).map(|b| Value::Bool(!b)),
        }
        .ok_or_else(|| {
            EvalError::new(
                pos,
                format!(
                    "incompatible expression type for '{op}' prefix expression: {}",
                    v.kind()
                ),
            )
        })
    }
}
