use super::{LuaTranslator, Result};
use crate::ast::{Chunk, Expr, Function, SetTarget, Stmt};
use crate::support::temper_call;
use tmpl_common::ident::sanitize_identifier;
use tmpl_ir::{Block, Member, MethodLike, TestDecl, TopLevel, TranslateError, TypeDecl};

/// Statements for one top level, and the module-scoped name it declares.
#[derive(Debug, Default)]
pub struct TranslatedTopLevel {
    pub stmts: Vec<Stmt>,
    pub declared: Option<String>,
}

impl LuaTranslator {
    pub fn top_level(&mut self, top: &TopLevel) -> Result<TranslatedTopLevel> {
        let mut out = TranslatedTopLevel::default();
        match top {
            TopLevel::ModuleInitBlock(init) => {
                let (stmts, _) = self.scoped(true, |this| {
                    let mut stmts = Vec::new();
                    for stmt in &init.body.statements {
                        this.stmt(stmt, &mut stmts)?;
                    }
                    Ok(stmts)
                })?;
                out.stmts = stmts;
            }
            TopLevel::ModuleFunction(f) => {
                let name = self.names.name(&f.name);
                let func = self.function(&f.params, &f.body)?;
                let value = self.function_value(func, f.may_yield, &format!("::{name}"));
                out.stmts.push(Stmt::set_name(name.clone(), value));
                out.declared = Some(name);
            }
            TopLevel::ModuleLevelDecl(decl) => {
                let init = match &decl.init {
                    Some(init) => self.expr(init)?,
                    None => Expr::nil(),
                };
                let name = self.names.name(&decl.name);
                out.stmts.push(Stmt::set_name(name.clone(), init));
                out.declared = Some(name);
            }
            TopLevel::Test(test) => out.stmts.push(self.test(test)?),
            TopLevel::TypeDecl(decl) => {
                let name = self.type_decl(decl, &mut out.stmts)?;
                out.declared = Some(name);
            }
            TopLevel::TypeConnection(conn) => {
                let name = self.names.name(&conn.name);
                out.stmts
                    .push(Stmt::Comment(format!("Type {name} connected to {}", conn.to)));
            }
            TopLevel::Garbage(g) => out.stmts.push(Stmt::Comment(
                g.message.clone().unwrap_or_else(|| "garbage".to_string()),
            )),
            TopLevel::PooledValue(p) => {
                return Err(TranslateError::unsupported(&p.pos, top.kind_name(), ""));
            }
        }
        Ok(out)
    }

    /// `Test_.test_x = function() temper.test('x', function(t) ... end) end`
    fn test(&mut self, test: &TestDecl) -> Result<Stmt> {
        let method = self
            .names
            .label(&format!("test_{}", sanitize_identifier(&test.raw_name)));
        let body = self.function(&test.params, &test.body)?;
        let run = temper_call(
            "test",
            vec![Expr::str(test.raw_name.clone()), Expr::Function(body)],
        );
        let entry = Function {
            params: Vec::new(),
            vararg: false,
            body: Chunk::new(vec![Stmt::Call(run)], None),
        };
        Ok(Stmt::set(
            SetTarget::Dot(Expr::name("Test_"), method),
            Expr::Function(entry),
        ))
    }

    fn type_decl(&mut self, decl: &TypeDecl, out: &mut Vec<Stmt>) -> Result<String> {
        let name = self.names.name(&decl.name);
        let mut args = vec![Expr::str(name.clone())];
        for sup in &decl.supers {
            args.push(self.type_name_expr(sup));
        }
        out.push(Stmt::set_name(name.clone(), temper_call("type", args)));

        let mut statics = Vec::new();
        for member in &decl.members {
            match member {
                Member::Constructor(ctor) => {
                    let func = self.function(&ctor.params, &ctor.body)?;
                    let value = self.function_value(func, false, &format!("{name}::constructor"));
                    out.push(Stmt::set(
                        SetTarget::Dot(Expr::name(&name), "constructor".into()),
                        value,
                    ));
                }
                Member::Getter(m) => {
                    let dot = self.names.safe_name(&m.dot_name);
                    let label = format!("{name}::get({})", m.dot_name);
                    let value = self.method_value(m, &label)?;
                    out.push(Stmt::set(
                        SetTarget::Dot(Expr::dot(Expr::name(&name), "get"), dot),
                        value,
                    ));
                }
                Member::Setter(m) => {
                    let dot = self.names.safe_name(&m.dot_name);
                    let label = format!("{name}::set({})", m.dot_name);
                    let value = self.method_value(m, &label)?;
                    out.push(Stmt::set(
                        SetTarget::Dot(Expr::dot(Expr::name(&name), "set"), dot),
                        value,
                    ));
                }
                Member::Method(m) => {
                    let dot = self.names.safe_name(&m.dot_name);
                    let label = format!("{name}::{}", m.dot_name);
                    let value = self.method_value(m, &label)?;
                    out.push(Stmt::set(
                        SetTarget::Dot(Expr::dot(Expr::name(&name), "methods"), dot),
                        value,
                    ));
                }
                Member::StaticMethod(m) => {
                    let dot = self.names.safe_name(&m.dot_name);
                    let label = format!("{name}::{}", m.dot_name);
                    let value = self.method_value(m, &label)?;
                    out.push(Stmt::set(SetTarget::Dot(Expr::name(&name), dot), value));
                }
                // Instances carry their fields; the type table has no slot for them.
                Member::InstanceProperty(_) => {}
                Member::StaticProperty(p) => {
                    let dot = self.names.safe_name(&p.dot_name);
                    let init = self.expr(&p.init)?;
                    statics.push(Stmt::set(SetTarget::Dot(Expr::name(&name), dot), init));
                }
            }
        }
        out.extend(statics);
        Ok(name)
    }

    fn method_value(&mut self, m: &MethodLike, label: &str) -> Result<Expr> {
        let empty = Block::default();
        let body = m.body.as_ref().unwrap_or(&empty);
        let func = self.function(&m.params, body)?;
        Ok(self.function_value(func, m.may_yield, label))
    }

    fn function_value(&self, func: Function, may_yield: bool, label: &str) -> Expr {
        let mut value = Expr::Function(func);
        if may_yield {
            value = temper_call("adapt_generator_fn", vec![value]);
        }
        if self.options.wrap_funcs {
            value = temper_call("wrap_func", vec![Expr::str(label), value]);
        }
        value
    }
}
