#![forbid(unsafe_code)]

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::ranger::Ranger;
use crate::scope::Scope;

/// A string the host has marked as safe for direct output. The render
/// adapter emits `SafeString` contents verbatim; every other non-empty
/// string becomes `!UNSAFE!`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SafeString(String);

impl SafeString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for SafeString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SafeString {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for SafeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Protocol a host value implements to expose fields and methods to
/// template code. Field lookup wins over method lookup; methods return a
/// [`Func`] already bound to its receiver (typically by capturing a clone).
pub trait Object: fmt::Debug {
    fn type_name(&self) -> &'static str;

    fn field(&self, name: &str) -> Option<Value>;

    fn method(&self, name: &str) -> Option<Func> {
        let _ = name;
        None
    }
}

/// A runtime value. Integers are always 64-bit signed.
#[derive(Clone)]
pub enum Value {
    Nil,
    Int(i64),
    Bool(bool),
    Str(String),
    Safe(SafeString),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(Rc<dyn Object>),
    Func(Func),
    Ranger(Rc<RefCell<dyn Ranger>>),
}

impl Value {
    pub fn safe(s: impl Into<SafeString>) -> Self {
        Value::Safe(s.into())
    }

    pub fn object(o: impl Object + 'static) -> Self {
        Value::Object(Rc::new(o))
    }

    pub fn ranger(r: impl Ranger + 'static) -> Self {
        Value::Ranger(Rc::new(RefCell::new(r)))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string view of a value; safe strings count as string-kinded.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Safe(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// The value's kind name, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Safe(_) => "safe string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
            Value::Func(_) => "function",
            Value::Ranger(_) => "ranger",
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Safe(s) => write!(f, "Safe({:?})", s.as_str()),
            Value::Seq(s) => f.debug_tuple("Seq").field(s).finish(),
            Value::Map(m) => f.debug_tuple("Map").field(m).finish(),
            Value::Object(o) => write!(f, "Object({})", o.type_name()),
            Value::Func(func) => write!(f, "Func(/{})", func.params().len()),
            Value::Ranger(_) => f.write_str("Ranger"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Safe(a), Value::Safe(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(&a.inner, &b.inner),
            (Value::Ranger(a), Value::Ranger(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<SafeString> for Value {
    fn from(s: SafeString) -> Self {
        Value::Safe(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(s: Vec<Value>) -> Self {
        Value::Seq(s)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(m: BTreeMap<String, Value>) -> Self {
        Value::Map(m)
    }
}

impl From<Func> for Value {
    fn from(f: Func) -> Self {
        Value::Func(f)
    }
}

/// The declared type of a host function parameter. Explicit call arguments
/// are converted to this; parameters beyond the explicit arguments are
/// filled by the evaluator's argument resolvers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// Any value, passed through unconverted.
    Value,
    Int,
    Bool,
    Str,
    Map,
    /// Resolver-only: the scope handed to the evaluator.
    Scope,
    /// Resolver-only: the host's render context.
    Context,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::Value => "value",
            ParamKind::Int => "int",
            ParamKind::Bool => "bool",
            ParamKind::Str => "string",
            ParamKind::Map => "map",
            ParamKind::Scope => "scope",
            ParamKind::Context => "context",
        })
    }
}

/// One argument in a host function call.
#[derive(Clone, Debug)]
pub enum Arg {
    Value(Value),
    Scope(Scope),
    Context(Context),
}

impl Arg {
    pub fn into_value(self) -> miette::Result<Value> {
        match self {
            Arg::Value(v) => Ok(v),
            other => Err(miette::miette!("expected a value argument, got {other:?}")),
        }
    }

    pub fn into_scope(self) -> miette::Result<Scope> {
        match self {
            Arg::Scope(s) => Ok(s),
            other => Err(miette::miette!("expected a scope argument, got {other:?}")),
        }
    }

    pub fn into_context(self) -> miette::Result<Context> {
        match self {
            Arg::Context(c) => Ok(c),
            other => Err(miette::miette!("expected a context argument, got {other:?}")),
        }
    }
}

/// Opaque host context handle. The evaluator never looks inside; it is
/// handed to host functions through the argument-resolver mechanism so they
/// can observe cancellation or carry request state.
#[derive(Clone)]
pub struct Context {
    inner: Rc<dyn Any>,
}

impl Context {
    pub fn new<T: 'static>(v: T) -> Self {
        Self { inner: Rc::new(v) }
    }

    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.inner.downcast_ref()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Context")
    }
}

/// A callable host value with a typed parameter list.
#[derive(Clone)]
pub struct Func {
    pub(crate) inner: Rc<FuncInner>,
}

pub(crate) struct FuncInner {
    params: Vec<ParamKind>,
    #[allow(clippy::type_complexity)]
    f: Box<dyn Fn(Vec<Arg>) -> miette::Result<Value>>,
}

impl Func {
    pub fn new(
        params: impl Into<Vec<ParamKind>>,
        f: impl Fn(Vec<Arg>) -> miette::Result<Value> + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(FuncInner {
                params: params.into(),
                f: Box::new(f),
            }),
        }
    }

    pub fn params(&self) -> &[ParamKind] {
        &self.inner.params
    }

    pub fn call(&self, args: Vec<Arg>) -> miette::Result<Value> {
        (self.inner.f)(args)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Func").field(&self.inner.params).finish()
    }
}
