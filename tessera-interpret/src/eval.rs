#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tessera_ast::{Block, ConditionalBlock, Expr, ExprKind, Ident, Position, Program, Stmt, StmtKind};

use crate::convert::to_bool;
use crate::error::EvalError;
use crate::ranger::Ranger;
use crate::scope::Scope;
use crate::value::{Arg, ParamKind, Value};

/// Converts the raw text of a `LiteralText` node into a value, typically a
/// [`crate::SafeString`] so that literal template text is emitted verbatim.
pub type LiteralStringer = Rc<dyn Fn(&str) -> miette::Result<Value>>;

/// Supplies values for function parameters that were not passed explicitly.
/// Returns `Ok(None)` when it cannot produce the requested kind; the
/// evaluator then tries the next resolver in registration order.
pub type ArgumentResolver = Rc<dyn Fn(ParamKind) -> miette::Result<Option<Arg>>>;

/// Anything the evaluator can execute.
#[derive(Clone, Copy)]
pub enum Node<'a> {
    Program(&'a Program),
    Block(&'a Block),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
}

impl<'a> From<&'a Program> for Node<'a> {
    fn from(p: &'a Program) -> Self {
        Node::Program(p)
    }
}

impl<'a> From<&'a Block> for Node<'a> {
    fn from(b: &'a Block) -> Self {
        Node::Block(b)
    }
}

impl<'a> From<&'a Stmt> for Node<'a> {
    fn from(s: &'a Stmt) -> Self {
        Node::Stmt(s)
    }
}

impl<'a> From<&'a Expr> for Node<'a> {
    fn from(e: &'a Expr) -> Self {
        Node::Expr(e)
    }
}

/// Tree-walking evaluator. Executes a syntax tree against a [`Scope`],
/// producing the value of the last statement; "capture all" blocks instead
/// collect every statement's value.
#[derive(Default)]
pub struct Evaluator {
    literal_stringer: Option<LiteralStringer>,
    argument_resolvers: Vec<ArgumentResolver>,

    pub(crate) scope: Scope,
    pub(crate) loop_level: u32,
    pub(crate) break_requested: bool,
    pub(crate) continue_requested: bool,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the literal stringer. The default passes literal text
    /// through unchanged as a plain string.
    pub fn with_literal_stringer(
        mut self,
        f: impl Fn(&str) -> miette::Result<Value> + 'static,
    ) -> Self {
        self.literal_stringer = Some(Rc::new(f));
        self
    }

    /// Appends an argument resolver. Resolvers are tried in registration
    /// order; the first that yields a value for a parameter kind wins.
    pub fn with_argument_resolver(
        mut self,
        f: impl Fn(ParamKind) -> miette::Result<Option<Arg>> + 'static,
    ) -> Self {
        self.argument_resolvers.push(Rc::new(f));
        self
    }

    pub(crate) fn resolvers(&self) -> &[ArgumentResolver] {
        &self.argument_resolvers
    }

    /// Evaluates `node`, looking identifiers up in `scope` and storing
    /// `let` bindings through it.
    pub fn eval<'a>(
        &mut self,
        node: impl Into<Node<'a>>,
        scope: &Scope,
    ) -> Result<Value, EvalError> {
        self.scope = scope.clone();
        self.eval_node(node.into())
    }

    fn eval_node(&mut self, node: Node<'_>) -> Result<Value, EvalError> {
        match node {
            Node::Program(p) => self.eval_statements(&p.stmts),
            Node::Block(b) => self.eval_block(b),
            Node::Stmt(s) => self.eval_statement(s),
            Node::Expr(e) => self.eval_expression(e),
        }
    }

    fn eval_block(&mut self, b: &Block) -> Result<Value, EvalError> {
        let mut values = self.eval_block_capture_all(b)?;
        Ok(match values.pop() {
            Some(v) => v,
            None => Value::Nil,
        })
    }

    /// Evaluates a block under a fresh child scope, collecting every
    /// statement's value. The previous scope is restored on all exit paths.
    pub(crate) fn eval_block_capture_all(&mut self, b: &Block) -> Result<Vec<Value>, EvalError> {
        let saved = self.scope.clone();
        self.scope = Scope::with_parent(&saved);

        let result = self.eval_statements_capture_all(&b.stmts);

        self.scope = saved;
        result
    }

    fn eval_statements(&mut self, stmts: &[Stmt]) -> Result<Value, EvalError> {
        let mut values = self.eval_statements_capture_all(stmts)?;
        Ok(match values.pop() {
            Some(v) => v,
            None => Value::Nil,
        })
    }

    fn eval_statements_capture_all(&mut self, stmts: &[Stmt]) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::with_capacity(stmts.len());

        for stmt in stmts {
            let v = self.eval_statement(stmt)?;

            if self.break_requested {
                if self.loop_level == 0 {
                    return Err(EvalError::new(stmt.pos, "break outside of loop"));
                }
                break;
            }

            if self.continue_requested {
                if self.loop_level == 0 {
                    return Err(EvalError::new(stmt.pos, "continue outside of loop"));
                }
                break;
            }

            values.push(v);
        }

        Ok(values)
    }

    fn eval_statement(&mut self, stmt: &Stmt) -> Result<Value, EvalError> {
        match &stmt.kind {
            StmtKind::Expr(e) => self.eval_expression(e),
            StmtKind::Let { ident, value } => {
                let v = self.eval_expression(value)?;
                self.scope.set(ident.name.clone(), v);
                Ok(Value::Nil)
            }
            StmtKind::Break => {
                self.break_requested = true;
                Ok(Value::Nil)
            }
            StmtKind::Continue => {
                self.continue_requested = true;
                Ok(Value::Nil)
            }
        }
    }

    pub(crate) fn eval_expression(&mut self, e: &Expr) -> Result<Value, EvalError> {
        match &e.kind {
            ExprKind::Nil => Ok(Value::Nil),
            ExprKind::Int(i) => Ok(Value::Int(*i)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Str(s) => Ok(Value::Str(s.clone())),
            ExprKind::LiteralText(t) => self.eval_literal(e.pos, t),
            ExprKind::Ident(name) => self.eval_ident(e.pos, name),
            ExprKind::Prefix { op, expr } => self.eval_prefix(e.pos, *op, expr),
            ExprKind::Infix { op, left, right } => self.eval_infix(e.pos, *op, left, right),
            ExprKind::If { conditionals } => self.eval_if(conditionals),
            ExprKind::For {
                ident,
                status_ident,
                range,
                block,
            } => self.eval_for(ident, status_ident.as_ref(), range, block),
            ExprKind::Capture { block } => self.eval_capture(block),
            ExprKind::Call { callee, args } => self.eval_call(e.pos, callee, args),
            ExprKind::Field { callee, index } => self.eval_field(e.pos, callee, index),
            ExprKind::Hash { entries } => self.eval_hash(e.pos, entries),
        }
    }

    fn eval_literal(&mut self, pos: Position, text: &str) -> Result<Value, EvalError> {
        match &self.literal_stringer {
            Some(f) => f(text).map_err(|report| EvalError::host(pos, report)),
            None => Ok(Value::Str(text.to_string())),
        }
    }

    fn eval_ident(&mut self, pos: Position, name: &str) -> Result<Value, EvalError> {
        self.scope
            .value(name)
            .ok_or_else(|| EvalError::new(pos, format!("identifier not found in scope: {name}")))
    }

    fn eval_if(&mut self, conditionals: &[ConditionalBlock]) -> Result<Value, EvalError> {
        for c in conditionals {
            let cond = match &c.condition {
                None => true,
                Some(expr) => {
                    let v = self.eval_expression(expr)?;
                    to_bool(&v).ok_or_else(|| {
                        EvalError::new(
                            expr.pos,
                            format!(
                                "condition expression type in if expression is not bool: {}",
                                v.kind()
                            ),
                        )
                    })?
                }
            };

            if cond {
                let values = self.eval_block_capture_all(&c.block)?;
                return Ok(collapse(values));
            }
        }

        Ok(Value::Nil)
    }

    fn eval_for(
        &mut self,
        ident: &Ident,
        status_ident: Option<&Ident>,
        range: &Expr,
        block: &Block,
    ) -> Result<Value, EvalError> {
        // Loop identifiers must not conflate loop state with ambient state.
        if self.scope.has_value(&ident.name) {
            return Err(EvalError::new(
                ident.pos,
                format!("identifier in for statement already in use: {}", ident.name),
            ));
        }

        if let Some(status) = status_ident {
            if status.name == ident.name || self.scope.has_value(&status.name) {
                return Err(EvalError::new(
                    status.pos,
                    format!(
                        "status identifier in for statement already in use: {}",
                        status.name
                    ),
                ));
            }
        }

        let r = self.eval_expression(range)?;
        let Value::Ranger(ranger) = r else {
            return Err(EvalError::new(
                range.pos,
                format!(
                    "range expression in for statement did not produce a ranger: {}",
                    r.kind()
                ),
            ));
        };

        let saved = self.scope.clone();
        let loop_scope = Scope::with_parent(&saved);
        self.scope = loop_scope.clone();
        self.loop_level += 1;

        let result = self.run_loop(&loop_scope, ident, status_ident, &ranger, block);

        self.scope = saved;
        self.loop_level -= 1;

        result.map(collapse)
    }

    fn run_loop(
        &mut self,
        loop_scope: &Scope,
        ident: &Ident,
        status_ident: Option<&Ident>,
        ranger: &Rc<RefCell<dyn Ranger>>,
        block: &Block,
    ) -> Result<Vec<Value>, EvalError> {
        let mut values = Vec::new();

        while ranger.borrow_mut().next() {
            let v = ranger.borrow().value();

            loop_scope.clear_self();
            loop_scope.set(ident.name.clone(), v);
            if let Some(status) = status_ident {
                let st = ranger.borrow().status();
                loop_scope.set(status.name.clone(), st.to_value());
            }

            let block_values = self.eval_block_capture_all(block)?;
            values.extend(block_values);

            if self.break_requested {
                self.break_requested = false;
                break;
            }

            self.continue_requested = false;
        }

        Ok(values)
    }

    fn eval_capture(&mut self, block: &Block) -> Result<Value, EvalError> {
        let values = self.eval_block_capture_all(block)?;
        Ok(collapse(values))
    }

    fn eval_hash(
        &mut self,
        pos: Position,
        entries: &[(String, Expr)],
    ) -> Result<Value, EvalError> {
        let mut map = BTreeMap::new();

        for (key, expr) in entries {
            // possible only via a parser bug
            if map.contains_key(key) {
                return Err(EvalError::new(
                    pos,
                    format!("duplicate key in hash expression: {key}"),
                ));
            }

            let v = self.eval_expression(expr)?;
            map.insert(key.clone(), v);
        }

        Ok(Value::Map(map))
    }
}

/// Collapses a captured value list: empty becomes nil, a single value is
/// returned directly, anything longer becomes a sequence.
pub(crate) fn collapse(mut values: Vec<Value>) -> Value {
    match values.len() {
        0 => Value::Nil,
        1 => values.swap_remove(0),
        _ => Value::Seq(values),
    }
}
