#![forbid(unsafe_code)]

use tessera_ast::{Expr, Position};

use crate::convert::to_str;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::Value;

impl Evaluator {
    pub(crate) fn eval_field(
        &mut self,
        pos: Position,
        callee: &Expr,
        index: &Expr,
    ) -> Result<Value, EvalError> {
        let index_value = self.eval_expression(index)?;
        let Some(name) = to_str(&index_value) else {
            return Err(EvalError::new(
                index.pos,
                format!(
                    "type of index expression in field expression is not string: {}",
                    index_value.kind()
                ),
            ));
        };
        let name = name.to_string();

        let callee_value = self.eval_expression(callee)?;

        if callee_value.is_nil() {
            return Err(EvalError::new(
                pos,
                format!("cannot get field or function '{name}' from nil object"),
            ));
        }

        match callee_value {
            Value::Map(map) => map.get(&name).cloned().ok_or_else(|| {
                EvalError::new(pos, format!("key not found in map: {name}"))
            }),

            Value::Object(obj) => {
                if let Some(v) = obj.field(&name) {
                    return Ok(v);
                }
                if let Some(f) = obj.method(&name) {
                    return Ok(Value::Func(f));
                }
                Err(EvalError::new(
                    pos,
                    format!(
                        "field or function not found in object of type {}: {name}",
                        obj.type_name()
                    ),
                ))
            }

            other => Err(EvalError::new(
                pos,
                format!(
                    "field or function not found in object of type {}: {name}",
                    other.kind()
                ),
            )),
        }
    }
}
