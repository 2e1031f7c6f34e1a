#![forbid(unsafe_code)]

//! Template-facing helper functions. Each helper exists both as a plain
//! function and as a prebuilt [`Func`] (the `*_func` constructors) ready to
//! be handed to a renderer as scope data.

use tessera_interpret::{Arg, Func, IntRanger, ParamKind, SafeString, Scope, Value};

/// Stringifies `v` and marks the result as safe for direct output.
pub fn safe(v: &Value) -> SafeString {
    SafeString::new(display_string(v))
}

/// Stringifies `v`, escapes HTML special characters, and marks the result
/// as safe for direct output.
pub fn html(v: &Value) -> SafeString {
    SafeString::new(escape_html(&display_string(v)))
}

/// The length of a string (in bytes), a sequence, or a mapping.
pub fn len(v: &Value) -> miette::Result<i64> {
    match v {
        Value::Str(s) => Ok(s.len() as i64),
        Value::Safe(s) => Ok(s.as_str().len() as i64),
        Value::Seq(s) => Ok(s.len() as i64),
        Value::Map(m) => Ok(m.len() as i64),
        other => Err(miette::miette!(
            "cannot get length of unsupported type: {}",
            other.kind()
        )),
    }
}

/// Whether the scope chain binds `name`. The scope argument is usually
/// filled by the render adapter's argument resolver.
pub fn has(name: &str, scope: &Scope) -> bool {
    scope.has_value(name)
}

pub fn has_prefix(s: &str, prefix: &str) -> bool {
    s.starts_with(prefix)
}

pub fn has_suffix(s: &str, suffix: &str) -> bool {
    s.ends_with(suffix)
}

/// Stringifies a value for the `safe`/`html` helpers: nil is empty, ints
/// and bools print naturally, sequences concatenate their elements, and
/// kinds with no string form yield a `[?TYPE? kind]` marker.
pub fn display_string(v: &Value) -> String {
    match v {
        Value::Nil => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Str(s) => s.clone(),
        Value::Safe(s) => s.as_str().to_string(),
        Value::Seq(items) => items.iter().map(display_string).collect(),
        other => format!("[?TYPE? {}]", other.kind()),
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn safe_func() -> Func {
    Func::new([ParamKind::Value], |args| {
        let v = value_arg(args, 0)?;
        Ok(Value::Safe(safe(&v)))
    })
}

pub fn html_func() -> Func {
    Func::new([ParamKind::Value], |args| {
        let v = value_arg(args, 0)?;
        Ok(Value::Safe(html(&v)))
    })
}

pub fn len_func() -> Func {
    Func::new([ParamKind::Value], |args| {
        let v = value_arg(args, 0)?;
        len(&v).map(Value::Int)
    })
}

pub fn has_func() -> Func {
    Func::new([ParamKind::Str, ParamKind::Scope], |args| {
        let name = string_arg(&args, 0)?;
        let scope = match args.into_iter().nth(1) {
            Some(Arg::Scope(s)) => s,
            other => return Err(miette::miette!("expected a scope argument, got {other:?}")),
        };
        Ok(Value::Bool(has(&name, &scope)))
    })
}

pub fn has_prefix_func() -> Func {
    Func::new([ParamKind::Str, ParamKind::Str], |args| {
        let s = string_arg(&args, 0)?;
        let w = string_arg(&args, 1)?;
        Ok(Value::Bool(has_prefix(&s, &w)))
    })
}

pub fn has_suffix_func() -> Func {
    Func::new([ParamKind::Str, ParamKind::Str], |args| {
        let s = string_arg(&args, 0)?;
        let w = string_arg(&args, 1)?;
        Ok(Value::Bool(has_suffix(&s, &w)))
    })
}

/// Ranger constructor over a half-open integer range.
pub fn range_func() -> Func {
    Func::new([ParamKind::Int, ParamKind::Int], |args| {
        let min = int_arg(&args, 0)?;
        let max = int_arg(&args, 1)?;
        Ok(Value::ranger(IntRanger::new(min, max)?))
    })
}

/// Ranger constructor over an inclusive integer range.
pub fn from_to_func() -> Func {
    Func::new([ParamKind::Int, ParamKind::Int], |args| {
        let min = int_arg(&args, 0)?;
        let max = int_arg(&args, 1)?;
        Ok(Value::ranger(IntRanger::from_to(min, max)?))
    })
}

fn value_arg(args: Vec<Arg>, i: usize) -> miette::Result<Value> {
    args.into_iter()
        .nth(i)
        .ok_or_else(|| miette::miette!("missing argument #{}", i + 1))?
        .into_value()
}

fn string_arg(args: &[Arg], i: usize) -> miette::Result<String> {
    match args.get(i) {
        Some(Arg::Value(Value::Str(s))) => Ok(s.clone()),
        Some(Arg::Value(Value::Safe(s))) => Ok(s.as_str().to_string()),
        other => Err(miette::miette!("expected a string argument, got {other:?}")),
    }
}

fn int_arg(args: &[Arg], i: usize) -> miette::Result<i64> {
    match args.get(i) {
        Some(Arg::Value(Value::Int(v))) => Ok(*v),
        other => Err(miette::miette!("expected an int argument, got {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_stringifies_common_values() {
        assert_eq!(safe(&Value::from("foo")).as_str(), "foo");
        assert_eq!(safe(&Value::Int(123)).as_str(), "123");
        assert_eq!(safe(&Value::Bool(true)).as_str(), "true");
        assert_eq!(safe(&Value::Nil).as_str(), "");
        assert_eq!(
            safe(&Value::Seq(vec![
                Value::from("a"),
                Value::from("<b>"),
                Value::Int(1),
                Value::Nil,
                Value::Bool(false),
            ]))
            .as_str(),
            "a<b>1false"
        );
    }

    #[test]
    fn html_escapes_special_characters() {
        assert_eq!(html(&Value::from("foo")).as_str(), "foo");
        assert_eq!(html(&Value::from("<foo>")).as_str(), "&lt;foo&gt;");
        assert_eq!(
            html(&Value::from(r#"a & b "c" 'd'"#)).as_str(),
            "a &amp; b &#34;c&#34; &#39;d&#39;"
        );
        assert_eq!(
            html(&Value::Seq(vec![Value::from("a"), Value::from("<b>"), Value::from("c")]))
                .as_str(),
            "a&lt;b&gt;c"
        );
        assert_eq!(html(&Value::Int(123)).as_str(), "123");
    }

    #[test]
    fn len_measures_strings_sequences_and_maps() {
        assert_eq!(len(&Value::from("foo")).unwrap(), 3);
        assert_eq!(len(&Value::from("")).unwrap(), 0);
        assert_eq!(
            len(&Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)])).unwrap(),
            3
        );
        assert_eq!(len(&Value::Seq(vec![])).unwrap(), 0);
        assert!(len(&Value::Int(5)).is_err());
        assert!(len(&Value::Nil).is_err());
    }

    #[test]
    fn has_checks_the_scope_chain() {
        let s = Scope::new();
        s.set("foo", true);

        assert!(has("foo", &s));
        assert!(!has("bar", &s));

        let child = Scope::with_parent(&s);
        assert!(has("foo", &child));
    }

    #[test]
    fn prefix_and_suffix() {
        assert!(has_prefix("foobar", "foo"));
        assert!(!has_prefix("foobar", "bar"));
        assert!(has_suffix("foobar", "bar"));
        assert!(!has_suffix("foobar", "foo"));
    }
}
