#![forbid(unsafe_code)]

use tessera_ast::{Expr, Position};

use crate::convert::convert_arg;
use crate::error::EvalError;
use crate::eval::Evaluator;
use crate::value::{Arg, Value};

impl Evaluator {
    pub(crate) fn eval_call(
        &mut self,
        pos: Position,
        callee: &Expr,
        args: &[Expr],
    ) -> Result<Value, EvalError> {
        let callee_value = self.eval_expression(callee)?;
        let Value::Func(func) = callee_value else {
            return Err(EvalError::new(
                callee.pos,
                format!(
                    "callee expression in call expression is not a function: {}",
                    callee_value.kind()
                ),
            ));
        };

        let params = func.params().to_vec();

        if args.len() > params.len() {
            return Err(EvalError::new(pos, "too many arguments for function call"));
        }

        let mut call_args = Vec::with_capacity(params.len());

        for (expr, kind) in args.iter().zip(&params) {
            let v = self.eval_expression(expr)?;
            let value_kind = v.kind();

            let Some(arg) = convert_arg(v, *kind) else {
                return Err(EvalError::new(
                    expr.pos,
                    format!("cannot convert argument of type {value_kind} to required type {kind}"),
                ));
            };

            call_args.push(arg);
        }

        // remaining parameters are filled by the argument resolvers
        for (i, kind) in params.iter().enumerate().skip(args.len()) {
            let mut resolved: Option<Arg> = None;

            for resolver in self.resolvers() {
                match resolver(*kind) {
                    Err(report) => return Err(EvalError::host(pos, report)),
                    Ok(Some(arg)) => {
                        resolved = Some(arg);
                        break;
                    }
                    Ok(None) => {}
                }
            }

            let Some(arg) = resolved else {
                return Err(EvalError::new(
                    pos,
                    format!(
                        "cannot resolve argument #{} for function call: {kind}",
                        i + 1
                    ),
                ));
            };

            call_args.push(arg);
        }

        func.call(call_args)
            .map_err(|report| EvalError::host(pos, report))
    }
}
