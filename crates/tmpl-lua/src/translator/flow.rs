//! Structured control flow.
//!
//! Lua has `while`, `goto` to a visible label, and `pcall`. A `try` body runs
//! inside a function passed to `temper.pcall`, so `break`, `continue`,
//! labeled jumps and `return` that leave it cannot be expressed directly.
//! Such a jump instead returns a pair `(tag, 'flow')` from the protected
//! function, and the code after the `pcall` re-issues the jump one level out.
//! A `return` inside a protected body returns `(value, 'return')`.
//!
//! Each label remembers how many `try` boundaries lie between it and the
//! current position. Zero means a plain `goto` works.

use super::{LuaTranslator, Result};
use crate::ast::{BinOp, Chunk, Expr, Function, LastStmt, Stmt};
use crate::chunk::{basic_if_stmt, lua_chunk};
use crate::closure::LuaClosure;
use crate::names::{on_break, on_continue};
use crate::options::ClosureMode;
use crate::support::temper;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;
use tmpl_common::Pos;
use tmpl_ir::{Jump, Labeled, ReturnStmt, TranslateError, TryStmt, WhileStmt};
use tracing::trace;

/// A jump that has to leave a protected body by returning.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Signal {
    Break,
    Continue,
    Return,
    /// A labeled jump, by its Lua label. Lua labels always carry a
    /// `break_` or `continue_` prefix, so they never equal the other tags.
    Label(String),
}

impl Signal {
    /// The string the protected function returns for this signal.
    pub fn tag(&self) -> &str {
        match self {
            Signal::Break => "break",
            Signal::Continue => "continue",
            Signal::Return => "return",
            Signal::Label(label) => label,
        }
    }
}

#[derive(Clone, Debug)]
struct LabelFrame {
    on_break: String,
    on_continue: String,
    /// `try` boundaries entered since the label.
    crossings: u32,
}

#[derive(Default)]
struct LoopFrame {
    /// Created the first time a `continue` needs it.
    continue_label: Option<String>,
}

#[derive(Default)]
pub(super) struct FlowState {
    loops: Vec<LoopFrame>,
    labels: IndexMap<String, LabelFrame>,
    realized: FxHashSet<String>,
    used: IndexSet<Signal>,
    /// `try` nesting within the current function.
    depth: u32,
}

const FLOW: &str = "flow";

fn signal_return(tag: &str) -> Stmt {
    Stmt::Do(Chunk::new(
        Vec::new(),
        Some(LastStmt::Return(vec![Expr::str(tag), Expr::str(FLOW)])),
    ))
}

fn equals(name: &str, tag: &str) -> Expr {
    Expr::binop(BinOp::Eq, Expr::name(name), Expr::str(tag))
}

/// Chains `(test, body)` arms into one `if ... elseif ... end`.
fn if_chain(arms: Vec<(Expr, Chunk)>) -> Option<Stmt> {
    let mut arms = arms.into_iter();
    let (test, then) = arms.next()?;
    Some(Stmt::If {
        test,
        then,
        elseifs: arms.collect(),
        otherwise: None,
    })
}

impl LuaTranslator {
    /// Runs `f` in a fresh flow context.
    ///
    /// A function body starts over: no loops, no labels, depth zero. A
    /// protected body keeps its labels but sees one more boundary in front
    /// of each, and no loops. Returns the signals that escaped `f`. The
    /// outer context is restored whether or not `f` succeeds.
    pub(super) fn scoped<T>(
        &mut self,
        is_function: bool,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<(T, IndexSet<Signal>)> {
        let loops = std::mem::take(&mut self.flow.loops);
        let used = std::mem::take(&mut self.flow.used);
        let depth = self.flow.depth;
        let labels = if is_function {
            Some(std::mem::take(&mut self.flow.labels))
        } else {
            for frame in self.flow.labels.values_mut() {
                frame.crossings += 1;
            }
            None
        };
        self.flow.depth = if is_function { 0 } else { depth + 1 };

        let result = f(self);

        let escaped = std::mem::replace(&mut self.flow.used, used);
        self.flow.loops = loops;
        self.flow.depth = depth;
        match labels {
            Some(labels) => self.flow.labels = labels,
            None => {
                for frame in self.flow.labels.values_mut() {
                    frame.crossings -= 1;
                }
            }
        }
        result.map(|value| (value, escaped))
    }

    pub(super) fn translate_break(&mut self, jump: &Jump, out: &mut Vec<Stmt>) -> Result<()> {
        match &jump.label {
            Some(label) => {
                let target = self.label_frame(label, &jump.pos)?;
                out.push(self.jump_to(target.on_break, target.crossings));
            }
            None if !self.flow.loops.is_empty() => {
                out.push(Stmt::Do(Chunk::new(Vec::new(), Some(LastStmt::Break))));
            }
            None => out.push(self.escape(Signal::Break, &jump.pos)?),
        }
        Ok(())
    }

    pub(super) fn translate_continue(&mut self, jump: &Jump, out: &mut Vec<Stmt>) -> Result<()> {
        match &jump.label {
            Some(label) => {
                let target = self.label_frame(label, &jump.pos)?;
                out.push(self.jump_to(target.on_continue, target.crossings));
            }
            None => {
                if self.flow.loops.is_empty() {
                    out.push(self.escape(Signal::Continue, &jump.pos)?);
                    return Ok(());
                }
                let existing = self.flow.loops.last().and_then(|l| l.continue_label.clone());
                let label = match existing {
                    Some(label) => label,
                    None => {
                        let label = self.names.gensym("continue");
                        if let Some(frame) = self.flow.loops.last_mut() {
                            frame.continue_label = Some(label.clone());
                        }
                        label
                    }
                };
                out.push(Stmt::Goto(label));
            }
        }
        Ok(())
    }

    fn label_frame(&self, label: &str, pos: &Pos) -> Result<LabelFrame> {
        self.flow
            .labels
            .get(label)
            .cloned()
            .ok_or_else(|| TranslateError::invariant(pos, format!("jump to unknown label `{label}`")))
    }

    /// `goto lua_label` when no boundary intervenes, else a signal.
    fn jump_to(&mut self, lua_label: String, crossings: u32) -> Stmt {
        if crossings == 0 {
            self.flow.realized.insert(lua_label.clone());
            Stmt::Goto(lua_label)
        } else {
            let stmt = signal_return(&lua_label);
            self.flow.used.insert(Signal::Label(lua_label));
            stmt
        }
    }

    /// An unlabeled jump with no loop in reach: only legal inside a
    /// protected body, where it becomes a signal.
    fn escape(&mut self, signal: Signal, pos: &Pos) -> Result<Stmt> {
        if self.flow.depth == 0 {
            return Err(TranslateError::invariant(
                pos,
                format!("{} outside of any loop", signal.tag()),
            ));
        }
        let stmt = signal_return(signal.tag());
        self.flow.used.insert(signal);
        Ok(stmt)
    }

    pub(super) fn translate_return(&mut self, ret: &ReturnStmt, out: &mut Vec<Stmt>) -> Result<()> {
        let value = match &ret.expr {
            Some(expr) => self.expr(expr)?,
            None => Expr::nil(),
        };
        let mut values = vec![value];
        if self.flow.depth > 0 {
            values.push(Expr::str(Signal::Return.tag()));
            self.flow.used.insert(Signal::Return);
        }
        out.push(Stmt::Do(Chunk::new(
            Vec::new(),
            Some(LastStmt::Return(values)),
        )));
        Ok(())
    }

    pub(super) fn translate_labeled(&mut self, labeled: &Labeled, out: &mut Vec<Stmt>) -> Result<()> {
        let frame = LabelFrame {
            on_break: self.names.label(&on_break(&labeled.label)),
            on_continue: self.names.label(&on_continue(&labeled.label)),
            crossings: 0,
        };
        let previous = self.flow.labels.insert(labeled.label.clone(), frame.clone());
        let body = self.stmt_chunk(&labeled.body);
        match previous {
            Some(previous) => {
                self.flow.labels.insert(labeled.label.clone(), previous);
            }
            None => {
                self.flow.labels.shift_remove(&labeled.label);
            }
        }
        let body = body?;

        if self.flow.realized.contains(&frame.on_continue) {
            out.push(Stmt::Label(frame.on_continue));
        }
        out.push(Stmt::Do(body));
        if self.flow.realized.contains(&frame.on_break) {
            out.push(Stmt::Label(frame.on_break));
        }
        Ok(())
    }

    pub(super) fn translate_while(&mut self, w: &WhileStmt, out: &mut Vec<Stmt>) -> Result<()> {
        let test = self.expr(&w.test)?;
        self.flow.loops.push(LoopFrame::default());
        let body = self.stmt_chunk(&w.body);
        let frame = self.flow.loops.pop().unwrap_or_default();
        let body = body?;

        // Jumping back above the loop re-runs the test, which is what
        // `continue` means.
        if let Some(label) = frame.continue_label {
            out.push(Stmt::Label(label));
        }
        out.push(Stmt::While { test, body });
        Ok(())
    }

    pub(super) fn translate_try(&mut self, t: &TryStmt, out: &mut Vec<Stmt>) -> Result<()> {
        let ok = self.names.gensym("ok");
        let msg = self.names.gensym("msg");
        let flow = self.names.gensym("flow");

        let (tried, used) = self.scoped(false, |this| this.stmt_chunk(&t.tried))?;
        trace!(signals = used.len(), mode = %self.options.closure_mode, "lowering try");

        let mut write_back = Vec::new();
        let call = match self.options.closure_mode {
            ClosureMode::Basic => Expr::call(
                temper("pcall"),
                vec![Expr::Function(Function {
                    params: Vec::new(),
                    vararg: false,
                    body: tried,
                })],
            ),
            mode @ (ClosureMode::InlineTable | ClosureMode::GlobalTable) => {
                let obj = self.names.gensym("obj");
                let mut closure = LuaClosure::new(obj.clone(), &self.imported);
                let func = Function {
                    params: vec![obj.clone()],
                    vararg: false,
                    body: closure.scan(tried),
                };
                out.push(Stmt::local(obj.clone(), closure.table()));
                write_back = closure.write_back();
                let callee = if mode == ClosureMode::GlobalTable {
                    let name = self.names.gensym("f");
                    self.global_funcs.push(Stmt::LocalFunction {
                        name: name.clone(),
                        func,
                    });
                    Expr::name(name)
                } else {
                    Expr::Function(func)
                };
                Expr::call(temper("pcall"), vec![callee, Expr::name(obj)])
            }
        };
        out.push(Stmt::Local {
            names: vec![ok.clone(), msg.clone(), flow.clone()],
            exprs: vec![call],
        });
        out.extend(write_back);

        let mut flow_arms = Vec::new();
        if used.contains(&Signal::Break) {
            let mut stmts = Vec::new();
            self.translate_break(&Jump::default(), &mut stmts)?;
            flow_arms.push((equals(&msg, Signal::Break.tag()), lua_chunk(stmts, None)));
        }
        if used.contains(&Signal::Continue) {
            let mut stmts = Vec::new();
            self.translate_continue(&Jump::default(), &mut stmts)?;
            flow_arms.push((equals(&msg, Signal::Continue.tag()), lua_chunk(stmts, None)));
        }
        let frames: Vec<LabelFrame> = self.flow.labels.values().cloned().collect();
        for frame in frames {
            for lua_label in [frame.on_break, frame.on_continue] {
                if !used.contains(&Signal::Label(lua_label.clone())) {
                    continue;
                }
                let test = equals(&msg, &lua_label);
                let stmt = self.jump_to(lua_label, frame.crossings);
                flow_arms.push((test, lua_chunk(vec![stmt], None)));
            }
        }

        let mut ok_arms = Vec::new();
        if let Some(dispatch) = if_chain(flow_arms) {
            ok_arms.push((equals(&flow, FLOW), lua_chunk(vec![dispatch], None)));
        }
        if used.contains(&Signal::Return) {
            let mut values = vec![Expr::name(&msg)];
            if self.flow.depth > 0 {
                values.push(Expr::str(Signal::Return.tag()));
                self.flow.used.insert(Signal::Return);
            }
            ok_arms.push((
                equals(&flow, Signal::Return.tag()),
                Chunk::new(Vec::new(), Some(LastStmt::Return(values))),
            ));
        }

        let recover = self.stmt_chunk(&t.recover)?;
        match (if_chain(ok_arms), recover.is_empty()) {
            (Some(on_ok), true) => out.push(basic_if_stmt(
                Expr::name(&ok),
                lua_chunk(vec![on_ok], None),
                None,
            )),
            (Some(on_ok), false) => out.push(basic_if_stmt(
                Expr::name(&ok),
                lua_chunk(vec![on_ok], None),
                Some(recover),
            )),
            (None, false) => out.push(basic_if_stmt(Expr::not(Expr::name(&ok)), recover, None)),
            (None, true) => {}
        }
        Ok(())
    }
}
