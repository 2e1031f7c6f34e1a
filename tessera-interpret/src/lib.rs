#![forbid(unsafe_code)]

mod call;
mod convert;
mod error;
mod eval;
mod field;
mod infix;
mod prefix;
mod ranger;
mod scope;
mod value;

pub use error::EvalError;
pub use eval::{ArgumentResolver, Evaluator, LiteralStringer, Node};
pub use ranger::{IntRanger, MapRanger, Ranger, SeqRanger, Status};
pub use scope::Scope;
pub use value::{Arg, Context, Func, Object, ParamKind, SafeString, Value};
