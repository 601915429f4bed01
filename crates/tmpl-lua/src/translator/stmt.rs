use super::{LuaTranslator, Result};
use crate::ast::{Chunk, Expr, Function, SetTarget, Stmt};
use crate::chunk::{basic_if_stmt, if_stmt, lua_chunk};
use crate::support::{temper, temper_call};
use tmpl_ir::{
    Block, Formal, Parameters, PropertyId, SetProperty, Statement, Subject, TranslateError,
    TriState,
};

impl LuaTranslator {
    /// A statement as the body of a block.
    pub(super) fn stmt_chunk(&mut self, stmt: &Statement) -> Result<Chunk> {
        let mut out = Vec::new();
        self.stmt(stmt, &mut out)?;
        Ok(lua_chunk(out, None))
    }

    pub(super) fn block_chunk(&mut self, block: &Block) -> Result<Chunk> {
        let mut out = Vec::new();
        for stmt in &block.statements {
            self.stmt(stmt, &mut out)?;
        }
        Ok(lua_chunk(out, None))
    }

    pub(super) fn stmt(&mut self, stmt: &Statement, out: &mut Vec<Stmt>) -> Result<()> {
        self.nested(stmt.pos(), |this| this.stmt_inner(stmt, out))
    }

    fn stmt_inner(&mut self, stmt: &Statement, out: &mut Vec<Stmt>) -> Result<()> {
        match stmt {
            Statement::Assignment(s) => {
                if s.right.is_pure_virtual() {
                    out.push(Stmt::Call(temper_call("bubble", Vec::new())));
                } else {
                    let right = self.expr(&s.right)?;
                    let left = self.names.name(&s.left);
                    out.push(Stmt::set_name(left, right));
                }
            }
            Statement::Block(block) => out.push(Stmt::Do(self.block_chunk(block)?)),
            Statement::Break(jump) => self.translate_break(jump, out)?,
            Statement::Continue(jump) => self.translate_continue(jump, out)?,
            Statement::Comment(c) => out.push(Stmt::Comment(c.text.clone())),
            Statement::CodeFoldStart(_) => out.push(Stmt::Comment("code-fold-start".into())),
            Statement::CodeFoldEnd(_) => out.push(Stmt::Comment("code-fold-end".into())),
            Statement::Garbage(_) => out.push(Stmt::Comment("garbage".into())),
            Statement::HandlerScope(_) => out.push(Stmt::Comment("handler".into())),
            Statement::ModuleInitFailed(_) => out.push(Stmt::Comment("init-failed".into())),
            Statement::ExprStmt(s) => {
                // Lua only accepts calls in statement position.
                let expr = self.expr(&s.expr)?;
                if expr.is_call() {
                    out.push(Stmt::Call(expr));
                }
            }
            Statement::If(s) => {
                let test = self.expr(&s.test)?;
                let then = self.stmt_chunk(&s.consequent)?;
                let otherwise = match &s.alternate {
                    Some(alt) => Some(self.stmt_chunk(alt)?),
                    None => None,
                };
                out.push(if_stmt(test, then, otherwise));
            }
            Statement::Labeled(s) => self.translate_labeled(s, out)?,
            Statement::LocalDecl(s) => {
                let init = match &s.init {
                    Some(init) => vec![self.expr(init)?],
                    None => Vec::new(),
                };
                out.push(Stmt::Local {
                    names: vec![self.names.name(&s.name)],
                    exprs: init,
                });
            }
            Statement::LocalFunction(s) => {
                let name = self.names.name(&s.name);
                let func = self.function(&s.params, &s.body)?;
                out.push(Stmt::LocalFunction {
                    name: name.clone(),
                    func,
                });
                if s.may_yield {
                    out.push(Stmt::set_name(
                        name.clone(),
                        temper_call("adapt_generator_fn", vec![Expr::name(name)]),
                    ));
                }
            }
            Statement::Return(s) => self.translate_return(s, out)?,
            Statement::SetAbstractProperty(s) => {
                let subject = self.subject(&s.subject)?;
                let key = match &s.property {
                    PropertyId::External { name } => Expr::str(self.names.safe_name(name)),
                    PropertyId::Internal { id } => Expr::str(self.names.name(id)),
                };
                let right = self.expr(&s.right)?;
                out.push(Stmt::set(SetTarget::Index(subject, key), right));
            }
            Statement::SetBackedProperty(s) => self.set_backed(s, out)?,
            Statement::Throw(_) => out.push(Stmt::Call(temper_call("bubble", Vec::new()))),
            Statement::Try(s) => self.translate_try(s, out)?,
            Statement::While(s) => self.translate_while(s, out)?,
            Statement::Yield(_) => out.push(Stmt::Call(temper_call("yield", Vec::new()))),
            Statement::ComputedJump(m) => {
                return Err(TranslateError::unsupported(&m.pos, stmt.kind_name(), ""));
            }
        }
        Ok(())
    }

    fn set_backed(&mut self, s: &SetProperty, out: &mut Vec<Stmt>) -> Result<()> {
        let subject = self.subject(&s.subject)?;
        let subject = match subject {
            Expr::Name(_) => subject,
            Expr::Dot(..) if matches!(s.subject, Subject::Type { .. }) => subject,
            other => {
                let tmp = self.names.gensym("subject");
                out.push(Stmt::local(tmp.clone(), other));
                Expr::name(tmp)
            }
        };
        let field = self.property_name(&s.property);
        let right = self.expr(&s.right)?;
        out.push(Stmt::set(SetTarget::Dot(subject, field), right));
        Ok(())
    }

    /// A function literal for `params` and `body`, in its own flow context.
    pub(super) fn function(&mut self, params: &Parameters, body: &Block) -> Result<Function> {
        let (func, _) = self.scoped(true, |this| {
            let mut prologue = Vec::new();
            let mut names = Vec::with_capacity(params.params.len());
            for formal in &params.params {
                let name = this.names.name(&formal.name);
                if needs_null_default(formal) {
                    prologue.push(basic_if_stmt(
                        Expr::binop(crate::ast::BinOp::Eq, Expr::name(&name), Expr::nil()),
                        Chunk::new(vec![Stmt::set_name(name.clone(), temper("null"))], None),
                        None,
                    ));
                }
                names.push(name);
            }
            let vararg = match &params.rest {
                Some(rest) => {
                    let name = this.names.name(&rest.name);
                    prologue.push(Stmt::local(name, temper_call("listof", vec![Expr::Vararg])));
                    true
                }
                None => false,
            };
            let body = this.block_chunk(body)?;
            prologue.push(Stmt::Do(body));
            Ok(Function {
                params: names,
                vararg,
                body: lua_chunk(prologue, None),
            })
        })?;
        Ok(func)
    }
}

/// Missing trailing arguments arrive as `nil`; an optional parameter that
/// can hold `null` needs them turned into `temper.null`.
fn needs_null_default(formal: &Formal) -> bool {
    match formal.optional {
        TriState::True => false,
        TriState::False => formal.ty.as_ref().is_some_and(|ty| ty.can_be_null()),
        TriState::Unknown => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmpl_ir::{Type, WellKnownType, build};

    #[test]
    fn test_null_default_rules() {
        let nullable = Type::Union {
            members: vec![
                Type::nominal(WellKnownType::Int),
                Type::nominal(WellKnownType::Null),
            ],
        };
        let int = Type::nominal(WellKnownType::Int);
        let cases = [
            (Some(nullable.clone()), TriState::True, false),
            (Some(nullable), TriState::False, true),
            (Some(int.clone()), TriState::False, false),
            (Some(int), TriState::Unknown, true),
            (None, TriState::False, false),
        ];
        for (ty, optional, expected) in cases {
            let formal = Formal {
                optional,
                ty,
                ..build::formal(build::source("p", 0))
            };
            assert_eq!(needs_null_default(&formal), expected, "{optional:?}");
        }
    }
}
