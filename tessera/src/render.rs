#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::rc::Rc;

use tessera_ast::{Block, Expr, ExprKind, Program, Stmt, StmtKind};
use tessera_interpret::{
    Arg, ArgumentResolver, Context, Evaluator, Func, LiteralStringer, ParamKind, SafeString,
    Scope, Value,
};

use crate::{Error, RenderError};

/// Loads a template by name, returning a reader over its bytes. The
/// renderer calls it exactly once per render and drains the reader to EOF.
pub type LoadFn = Box<dyn Fn(&str) -> std::io::Result<Box<dyn Read>>>;

/// The default name of the function templates call to render another
/// template.
pub const DEFAULT_TEMPLATE_FUNC_NAME: &str = "t";

/// Renderer parses templates, evaluates their code, and writes out the
/// output through the safe-string gate.
///
/// Cheap to clone; clones share the loader and configuration.
#[derive(Clone)]
pub struct Renderer {
    inner: Rc<RendererInner>,
}

struct RendererInner {
    load: LoadFn,
    resolve_arg: Option<ArgumentResolver>,
    scope_data: BTreeMap<String, Value>,
    template_func_name: String,
}

/// Configuration record for a [`Renderer`].
pub struct RendererBuilder {
    load: LoadFn,
    resolve_arg: Option<ArgumentResolver>,
    scope_data: BTreeMap<String, Value>,
    template_func_name: String,
}

impl Renderer {
    pub fn builder(load: impl Fn(&str) -> std::io::Result<Box<dyn Read>> + 'static) -> RendererBuilder {
        RendererBuilder {
            load: Box::new(load),
            resolve_arg: None,
            scope_data: BTreeMap::new(),
            template_func_name: DEFAULT_TEMPLATE_FUNC_NAME.to_string(),
        }
    }

    /// Renders the named template into `w`.
    ///
    /// The scope data configured on the renderer is visible to this
    /// template and to nested renders; the per-render `data` map is only
    /// visible to this template. The context is handed to host functions
    /// with context-typed parameters via the argument-resolver mechanism.
    pub fn render(
        &self,
        ctx: &Context,
        w: &mut dyn Write,
        name: &str,
        data: &BTreeMap<String, Value>,
    ) -> Result<(), RenderError> {
        tracing::debug!(template = name, "rendering template");

        self.render_inner(ctx, w, name, data)
            .map_err(|source| RenderError::new(name, source))
    }

    fn render_inner(
        &self,
        ctx: &Context,
        w: &mut dyn Write,
        name: &str,
        data: &BTreeMap<String, Value>,
    ) -> Result<(), Error> {
        let user_scope = Scope::new();
        for (k, v) in &self.inner.scope_data {
            user_scope.set(k.clone(), v.clone());
        }

        if user_scope.has_value(&self.inner.template_func_name) {
            return Err(Error::ReservedName(self.inner.template_func_name.clone()));
        }

        user_scope.lock();

        let renderer_scope = Scope::with_parent(&user_scope);
        renderer_scope.set(
            self.inner.template_func_name.clone(),
            self.template_func(),
        );
        renderer_scope.lock();

        let mut reader = (self.inner.load)(name)?;
        let mut src = String::new();
        reader.read_to_string(&mut src)?;

        let ctx = ctx.clone();
        let host_resolver = self.inner.resolve_arg.clone();
        let resolver: ArgumentResolver = Rc::new(move |kind| {
            if kind == ParamKind::Context {
                return Ok(Some(Arg::Context(ctx.clone())));
            }
            match &host_resolver {
                Some(f) => f(kind),
                None => Ok(None),
            }
        });

        let options = RenderOptions {
            literal_stringer: Some(Rc::new(|s: &str| Ok(Value::Safe(SafeString::new(s))))),
            argument_resolver: Some(resolver),
        };

        render(&src, w, data, &renderer_scope, options)
    }

    /// The function bound under the template-call name. Renders another
    /// template into a buffer and returns it as a safe string; the calling
    /// template's per-render data is not inherited.
    fn template_func(&self) -> Func {
        let renderer = self.clone();

        Func::new(
            [ParamKind::Str, ParamKind::Map, ParamKind::Context],
            move |args| {
                let mut args = args.into_iter();
                let name = match args.next() {
                    Some(Arg::Value(Value::Str(s))) => s,
                    other => return Err(miette::miette!("expected a template name, got {other:?}")),
                };
                let data = match args.next() {
                    Some(Arg::Value(Value::Map(m))) => m,
                    other => return Err(miette::miette!("expected a data map, got {other:?}")),
                };
                let ctx = match args.next() {
                    Some(Arg::Context(c)) => c,
                    other => return Err(miette::miette!("expected a context, got {other:?}")),
                };

                let mut buf = Vec::new();
                renderer
                    .render(&ctx, &mut buf, &name, &data)
                    .map_err(|e| miette::miette!("{e}"))?;

                let s = String::from_utf8(buf)
                    .map_err(|e| miette::miette!("template output is not valid UTF-8: {e}"))?;
                Ok(Value::Safe(SafeString::new(s)))
            },
        )
    }
}

impl RendererBuilder {
    /// Adds one (name, value) pair to the scope data provided to every
    /// rendered template.
    pub fn scope_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scope_data.insert(name.into(), value.into());
        self
    }

    /// Merges a map of scope data.
    pub fn scope_data(mut self, data: BTreeMap<String, Value>) -> Self {
        self.scope_data.extend(data);
        self
    }

    /// Installs a host argument resolver, consulted after the built-in
    /// scope and context resolvers.
    pub fn argument_resolver(
        mut self,
        f: impl Fn(ParamKind) -> miette::Result<Option<Arg>> + 'static,
    ) -> Self {
        self.resolve_arg = Some(Rc::new(f));
        self
    }

    /// Overrides the reserved template-call function name (default `t`).
    pub fn template_func_name(mut self, name: impl Into<String>) -> Self {
        self.template_func_name = name.into();
        self
    }

    pub fn build(self) -> Renderer {
        Renderer {
            inner: Rc::new(RendererInner {
                load: self.load,
                resolve_arg: self.resolve_arg,
                scope_data: self.scope_data,
                template_func_name: self.template_func_name,
            }),
        }
    }
}

/// Options for the scope-level [`render`] entry point.
#[derive(Default)]
pub struct RenderOptions {
    /// Conversion applied to every literal text node. Defaults to passing
    /// the text through unchanged as a plain string, which the output gate
    /// then rejects; the [`Renderer`] installs a [`SafeString`] wrapper.
    pub literal_stringer: Option<LiteralStringer>,
    /// Extra argument resolver, consulted after the built-in scope
    /// resolver.
    pub argument_resolver: Option<ArgumentResolver>,
}

/// Renders an already-loaded template source against `scope`, seeding a
/// child scope from `data` and writing the flattened output to `w`.
pub fn render(
    src: &str,
    w: &mut dyn Write,
    data: &BTreeMap<String, Value>,
    scope: &Scope,
    options: RenderOptions,
) -> Result<(), Error> {
    let template_scope = Scope::with_parent(scope);
    for (k, v) in data {
        if !v.is_nil() {
            template_scope.set(k.clone(), v.clone());
        }
    }

    let prog = tessera_parse::parse_source(src)?;
    // wrap the program in a capture so that every statement's value
    // reaches the writer
    let prog = wrap_in_capture(prog);

    let mut ev = Evaluator::new();

    if let Some(ls) = options.literal_stringer {
        ev = ev.with_literal_stringer(move |s| ls(s));
    }

    let resolver_scope = template_scope.clone();
    ev = ev.with_argument_resolver(move |kind| {
        Ok(match kind {
            ParamKind::Scope => Some(Arg::Scope(resolver_scope.clone())),
            _ => None,
        })
    });

    if let Some(ra) = options.argument_resolver {
        ev = ev.with_argument_resolver(move |kind| ra(kind));
    }

    let value = ev.eval(&prog, &template_scope)?;

    write_value(w, &value)?;
    Ok(())
}

fn wrap_in_capture(prog: Program) -> Program {
    let pos = prog.pos;
    Program {
        pos,
        stmts: vec![Stmt {
            pos,
            kind: StmtKind::Expr(Expr {
                pos,
                kind: ExprKind::Capture {
                    block: Block {
                        pos,
                        stmts: prog.stmts,
                    },
                },
            }),
        }],
    }
}

fn write_value(w: &mut dyn Write, v: &Value) -> std::io::Result<()> {
    match v {
        Value::Seq(items) => {
            for item in items {
                w.write_all(expect_safe(item).as_bytes())?;
            }
            Ok(())
        }
        other => w.write_all(expect_safe(other).as_bytes()),
    }
}

/// The safety gate: nil and empty plain strings write nothing, safe
/// strings write their bytes, sequences recurse, and everything else
/// (in particular any non-empty bare string) renders as `!UNSAFE!`.
fn expect_safe(v: &Value) -> String {
    match v {
        Value::Nil => String::new(),
        Value::Safe(s) => s.as_str().to_string(),
        Value::Seq(items) => items.iter().map(expect_safe).collect(),
        Value::Str(s) if s.is_empty() => String::new(),
        _ => "!UNSAFE!".to_string(),
    }
}
