#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use crate::value::{Arg, ParamKind, Value};

pub(crate) fn to_int(v: &Value) -> Option<i64> {
    v.as_int()
}

pub(crate) fn to_bool(v: &Value) -> Option<bool> {
    v.as_bool()
}

/// The string view of a value; safe strings count as strings.
pub(crate) fn to_str(v: &Value) -> Option<&str> {
    v.as_str()
}

/// Converts an explicitly passed value to a declared parameter kind. `Nil`
/// converts to the kind's zero value; scope and context parameters can only
/// be filled by argument resolvers.
pub(crate) fn convert_arg(v: Value, kind: ParamKind) -> Option<Arg> {
    let v = match kind {
        ParamKind::Value => v,
        ParamKind::Int => match v {
            Value::Int(_) => v,
            Value::Nil => Value::Int(0),
            _ => return None,
        },
        ParamKind::Bool => match v {
            Value::Bool(_) => v,
            Value::Nil => Value::Bool(false),
            _ => return None,
        },
        ParamKind::Str => match v {
            Value::Str(_) => v,
            Value::Safe(s) => Value::Str(s.into_string()),
            Value::Nil => Value::Str(String::new()),
            _ => return None,
        },
        ParamKind::Map => match v {
            Value::Map(_) => v,
            Value::Nil => Value::Map(BTreeMap::new()),
            _ => return None,
        },
        ParamKind::Scope | ParamKind::Context => return None,
    };

    Some(Arg::Value(v))
}
