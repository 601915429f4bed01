//! TmpL to C++ translation.
//!
//! Only straight-line code and structured `if`/`while` are rendered. Other
//! statements turn into comments and other expressions into `exit(0)`
//! stand-ins, so a module always yields a header.

use crate::ast::{Decl, Expr, FunctionDecl, Param, Stmt, StructDecl, TranslationUnit, TypeExpr};
use crate::names::{CppNames, safe_name};
use crate::types::{cpp_type, return_type, type_name};
use tmpl_common::Pos;
use tmpl_common::limits::MAX_TRANSLATION_DEPTH;
use tmpl_ir::{
    Block, BuiltinOperator, Call, Callable, DependencyCategory, Expression, Formal, GetProperty,
    InfixOp, Member, MethodLike, Module, Parameters, PrefixOp, PropertyId, RuntimeTypeOperation,
    SetProperty, Statement, Subject, SupportCode, TopLevel, TranslateError, Type, TypeDecl, Value,
};
use tracing::trace;

pub type Result<T> = std::result::Result<T, TranslateError>;

#[derive(Debug, Default)]
pub struct CppTranslator {
    names: CppNames,
    depth: u32,
}

impl CppTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Production top levels of `module`. Test code has no C++ rendering.
    pub fn translate_module(&mut self, module: &Module) -> Result<TranslationUnit> {
        let mut decls = Vec::new();
        for top in &module.top_levels {
            if top.category() == DependencyCategory::Test {
                trace!(kind = top.kind_name(), "skipping test top level");
                continue;
            }
            decls.push(self.top_level(top)?);
        }
        Ok(TranslationUnit {
            namespace: safe_name(&module.library_name),
            decls,
        })
    }

    fn top_level(&mut self, top: &TopLevel) -> Result<Decl> {
        Ok(match top {
            TopLevel::ModuleFunction(func) => {
                let name = self.names.name(&func.name);
                let ret = return_type(func.return_type.as_ref(), &mut self.names);
                Decl::Function(self.function(name, ret, &func.params, Some(&func.body), None)?)
            }
            TopLevel::ModuleLevelDecl(decl) => Decl::Variable {
                ty: self.declared_type(decl.ty.as_ref()),
                name: self.names.name(&decl.name),
                init: decl.init.as_ref().map(|e| self.expr(e)).transpose()?,
            },
            TopLevel::TypeDecl(decl) => Decl::Struct(self.struct_decl(decl)?),
            TopLevel::TypeConnection(conn) => {
                Decl::Comment(format!("Type {} connected to {}", conn.name, conn.to))
            }
            TopLevel::Garbage(garbage) => {
                Decl::Comment(garbage.message.clone().unwrap_or_else(|| "garbage".to_string()))
            }
            other => Decl::Comment(format!("unsupported {}", other.kind_name())),
        })
    }

    /// Declared types default to `AnyValue` where C++ cannot deduce one.
    fn declared_type(&mut self, ty: Option<&Type>) -> TypeExpr {
        match ty {
            Some(ty) => cpp_type(ty, &mut self.names),
            None => TypeExpr::core("AnyValue"),
        }
    }

    fn param(&mut self, formal: &Formal) -> Param {
        Param {
            ty: self.declared_type(formal.ty.as_ref()),
            name: self.names.name(&formal.name),
        }
    }

    /// With `receiver`, the first formal names `this` and is bound to it at
    /// the top of the body instead of being a parameter.
    fn function(
        &mut self,
        name: String,
        ret: TypeExpr,
        params: &Parameters,
        body: Option<&Block>,
        receiver: Option<&str>,
    ) -> Result<FunctionDecl> {
        let mut formals = params.params.iter();
        let mut prologue = Vec::new();
        if let Some(owner) = receiver
            && let Some(this) = formals.next()
        {
            prologue.push(Stmt::Decl {
                ty: TypeExpr::Pointer(Box::new(TypeExpr::name(owner))),
                name: self.names.name(&this.name),
                init: Some(Expr::Raw("this".to_string())),
            });
        }
        let mut cpp_params: Vec<Param> = formals.map(|f| self.param(f)).collect();
        if let Some(rest) = &params.rest {
            let element = self.declared_type(rest.ty.as_ref());
            cpp_params.push(Param {
                ty: TypeExpr::core_template("List", vec![element]),
                name: self.names.name(&rest.name),
            });
        }
        let body = match body {
            Some(block) => {
                let mut stmts = prologue;
                stmts.extend(self.block(block)?);
                Some(stmts)
            }
            None => None,
        };
        Ok(FunctionDecl {
            ret,
            name,
            params: cpp_params,
            is_static: false,
            body,
        })
    }

    fn struct_decl(&mut self, decl: &TypeDecl) -> Result<StructDecl> {
        let name = self.names.name(&decl.name);
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut extras = Vec::new();
        for member in &decl.members {
            match member {
                Member::InstanceProperty(prop) => fields.push(Param {
                    ty: self.declared_type(prop.ty.as_ref()),
                    name: self.names.name(&prop.name),
                }),
                Member::Method(m) => {
                    methods.push(self.method(&name, safe_name(&m.dot_name), m, true)?);
                }
                Member::Getter(m) => {
                    let method_name = safe_name(&format!("get_{}", m.dot_name));
                    methods.push(self.method(&name, method_name, m, true)?);
                }
                Member::Setter(m) => {
                    let method_name = safe_name(&format!("set_{}", m.dot_name));
                    methods.push(self.method(&name, method_name, m, true)?);
                }
                Member::StaticMethod(m) => {
                    let mut method = self.method(&name, safe_name(&m.dot_name), m, false)?;
                    method.is_static = true;
                    methods.push(method);
                }
                Member::Constructor(_) => {
                    extras.push(Stmt::Comment("constructor body is not translated".to_string()));
                }
                Member::StaticProperty(prop) => {
                    extras.push(Stmt::Comment(format!("unsupported static {}", prop.dot_name)));
                }
            }
        }
        let object_type = TypeExpr::core_template("Object", vec![TypeExpr::name(name.clone())]);
        let make = FunctionDecl {
            ret: object_type,
            name: "make".to_string(),
            params: fields.clone(),
            is_static: true,
            body: Some(vec![Stmt::Return(Some(Expr::TemplateCall {
                callee: "temper::core::object".to_string(),
                ty: TypeExpr::name(name.clone()),
                args: fields.iter().map(|f| Expr::name(f.name.clone())).collect(),
            }))]),
        };
        methods.insert(0, make);
        Ok(StructDecl {
            name,
            fields,
            methods,
            extras,
        })
    }

    fn method(
        &mut self,
        owner: &str,
        name: String,
        method: &MethodLike,
        instance: bool,
    ) -> Result<FunctionDecl> {
        let ret = return_type(method.return_type.as_ref(), &mut self.names);
        let receiver = instance.then_some(owner);
        self.function(name, ret, &method.params, method.body.as_ref(), receiver)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self, block: &Block) -> Result<Vec<Stmt>> {
        block.statements.iter().map(|s| self.stmt(s)).collect()
    }

    /// The statements of a branch; a block's braces are the branch's own.
    fn branch(&mut self, stmt: &Statement) -> Result<Vec<Stmt>> {
        match stmt {
            Statement::Block(block) => self.block(block),
            other => Ok(vec![self.stmt(other)?]),
        }
    }

    fn stmt(&mut self, stmt: &Statement) -> Result<Stmt> {
        self.nested(stmt.pos(), |tr| tr.stmt_inner(stmt))
    }

    fn stmt_inner(&mut self, stmt: &Statement) -> Result<Stmt> {
        Ok(match stmt {
            Statement::Assignment(assign) => Stmt::Assign {
                target: Expr::name(self.names.name(&assign.left)),
                value: self.expr(&assign.right)?,
            },
            Statement::Block(block) => Stmt::Block(self.block(block)?),
            Statement::Comment(comment) => Stmt::Comment(comment.text.clone()),
            Statement::ExprStmt(stmt) => Stmt::Expr(self.expr(&stmt.expr)?),
            Statement::If(stmt) => Stmt::If {
                test: self.expr(&stmt.test)?,
                then: self.branch(&stmt.consequent)?,
                otherwise: stmt.alternate.as_deref().map(|s| self.branch(s)).transpose()?,
            },
            Statement::While(stmt) => Stmt::While {
                test: self.expr(&stmt.test)?,
                body: self.branch(&stmt.body)?,
            },
            Statement::Return(ret) => Stmt::Return(ret.expr.as_ref().map(|e| self.expr(e)).transpose()?),
            Statement::LocalDecl(decl) => {
                let ty = match (&decl.ty, &decl.init) {
                    (Some(ty), _) => cpp_type(ty, &mut self.names),
                    (None, Some(_)) => TypeExpr::Auto,
                    (None, None) => TypeExpr::core("AnyValue"),
                };
                Stmt::Decl {
                    ty,
                    name: self.names.name(&decl.name),
                    init: decl.init.as_ref().map(|e| self.expr(e)).transpose()?,
                }
            }
            Statement::SetBackedProperty(set) => Stmt::Assign {
                target: self.backed_target(set)?,
                value: self.expr(&set.right)?,
            },
            Statement::SetAbstractProperty(set) => {
                let accessor = self.accessor(&set.subject, &set.property, "set_")?;
                Stmt::Expr(Expr::call(accessor, vec![self.expr(&set.right)?]))
            }
            other => Stmt::Comment(format!("unsupported {}", other.kind_name())),
        })
    }

    fn backed_target(&mut self, set: &SetProperty) -> Result<Expr> {
        let field = self.field_name(&set.property);
        self.member(&set.subject, field)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub(crate) fn expr(&mut self, expr: &Expression) -> Result<Expr> {
        self.nested(expr.pos(), |tr| tr.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &Expression) -> Result<Expr> {
        Ok(match expr {
            Expression::Reference(r) | Expression::This(r) => Expr::name(self.names.name(&r.id)),
            Expression::Value(v) => self.value(&v.value),
            Expression::Call(call) => self.call(call)?,
            Expression::Infix(infix) => {
                let op = match infix.op {
                    InfixOp::AmpAmp => "&&",
                    InfixOp::BarBar => "||",
                    InfixOp::EqEqInt => "==",
                    InfixOp::GeInt => ">=",
                    InfixOp::GtInt => ">",
                    InfixOp::LeInt => "<=",
                    InfixOp::LtInt => "<",
                    InfixOp::PlusInt => "+",
                };
                Expr::binary(op, self.expr(&infix.left)?, self.expr(&infix.right)?)
            }
            Expression::Prefix(prefix) => match prefix.op {
                PrefixOp::Bang => Expr::Unary("!", Box::new(self.expr(&prefix.operand)?)),
            },
            Expression::UncheckedNotNull(wrapped) => self.expr(&wrapped.expr)?,
            Expression::Cast(test) | Expression::InstanceOf(test) => {
                let callee = if matches!(expr, Expression::Cast(_)) {
                    "temper::core::cast"
                } else {
                    "temper::core::instance_of"
                };
                Expr::TemplateCall {
                    callee: callee.to_string(),
                    ty: cpp_type(&test.checked_type, &mut self.names),
                    args: vec![self.expr(&test.expr)?],
                }
            }
            Expression::GetBackedProperty(get) => self.get_backed(get)?,
            Expression::GetAbstractProperty(get) => {
                let accessor = self.accessor(&get.subject, &get.property, "get_")?;
                Expr::call(accessor, Vec::new())
            }
            other => Expr::Unsupported(other.kind_name().to_string()),
        })
    }

    fn get_backed(&mut self, get: &GetProperty) -> Result<Expr> {
        let field = self.field_name(&get.property);
        self.member(&get.subject, field)
    }

    fn field_name(&mut self, property: &PropertyId) -> String {
        match property {
            PropertyId::External { name } => safe_name(name),
            PropertyId::Internal { id } => self.names.name(id),
        }
    }

    fn accessor(&mut self, subject: &Subject, property: &PropertyId, prefix: &str) -> Result<Expr> {
        let name = match property {
            PropertyId::External { name } => safe_name(&format!("{prefix}{name}")),
            PropertyId::Internal { id } => format!("{prefix}{}", self.names.name(id)),
        };
        self.member(subject, name)
    }

    /// `obj->name` for values, `T::name` for types.
    fn member(&mut self, subject: &Subject, name: String) -> Result<Expr> {
        Ok(match subject {
            Subject::Expr { expr } => Expr::Arrow(Box::new(self.expr(expr)?), name),
            Subject::Type { name: ty } => Expr::Scoped(type_name(ty, &mut self.names), name),
        })
    }

    fn call(&mut self, call: &Call) -> Result<Expr> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            if let Expression::Value(v) = arg
                && matches!(v.value, Value::Symbol { .. })
            {
                continue;
            }
            args.push(self.expr(arg)?);
        }
        Ok(match &call.callee {
            Callable::FnReference(r) => Expr::call(Expr::name(self.names.name(&r.id)), args),
            Callable::Constructor(ty) => {
                Expr::call(Expr::Scoped(type_name(&ty.name, &mut self.names), "make".into()), args)
            }
            Callable::Method(m) => {
                let callee = self.member(&m.subject, safe_name(&m.method))?;
                Expr::call(callee, args)
            }
            Callable::Support(support) => translate_support(&support.code, args),
            Callable::Garbage(_) => Expr::Unsupported("GarbageCallable".to_string()),
        })
    }

    fn value(&mut self, value: &Value) -> Expr {
        match value {
            Value::Boolean { value } => Expr::Bool(*value),
            Value::Float64 { value } => Expr::Float(*value),
            Value::Int { value } => Expr::Int(i64::from(*value)),
            Value::Int64 { value } => Expr::call(Expr::Raw("INT64_C".into()), vec![Expr::Int(*value)]),
            Value::String { value } => Expr::call(Expr::core("string"), vec![Expr::Str(value.clone())]),
            Value::Null => Expr::Null,
            Value::Void => Expr::Raw("TEMPER_VOID".to_string()),
            Value::Type { name } => Expr::call(
                Expr::Raw("TEMPER_TYPE".to_string()),
                vec![Expr::Raw(type_name(name, &mut self.names))],
            ),
            other => Expr::Unsupported(other.kind_name().to_string()),
        }
    }

    fn nested<T>(&mut self, pos: &Pos, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_TRANSLATION_DEPTH {
            return Err(TranslateError::invariant(pos, "nesting too deep to translate"));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

fn translate_support(code: &SupportCode, mut args: Vec<Expr>) -> Expr {
    match code {
        SupportCode::Operator { op } => translate_operator(*op, args),
        SupportCode::Connected { key } => Expr::call(Expr::core(&connected_name(key)), args),
        SupportCode::GetStatic if args.len() == 1 => args.remove(0),
        SupportCode::RuntimeTypeOp { op, target } => Expr::TemplateCall {
            callee: match op {
                RuntimeTypeOperation::Is => "temper::core::is",
                RuntimeTypeOperation::As => "temper::core::as",
                RuntimeTypeOperation::AssertAs => "temper::core::assert_as",
            }
            .to_string(),
            ty: TypeExpr::core(target.name()),
            args,
        },
        other => Expr::Unsupported(other.describe()),
    }
}

fn translate_operator(op: BuiltinOperator, args: Vec<Expr>) -> Expr {
    use BuiltinOperator::*;
    let symbol = match op {
        BitwiseAnd => Some("&"),
        BitwiseOr => Some("|"),
        PlusIntInt | PlusFltFlt => Some("+"),
        MinusIntInt | MinusFltFlt => Some("-"),
        TimesIntInt | TimesFltFlt => Some("*"),
        DivFltFlt => Some("/"),
        LtIntInt | LtFltFlt => Some("<"),
        LeIntInt | LeFltFlt => Some("<="),
        GtIntInt | GtFltFlt => Some(">"),
        GeIntInt | GeFltFlt => Some(">="),
        EqIntInt | EqFltFlt => Some("=="),
        NeIntInt | NeFltFlt => Some("!="),
        _ => None,
    };
    let runtime = || Expr::call(Expr::core(&snake_case(&format!("{op:?}"))), args.clone());
    match (symbol, args.as_slice()) {
        (Some(symbol), [a, b]) => Expr::binary(symbol, a.clone(), b.clone()),
        (None, [a]) if op == BooleanNegation => Expr::Unary("!", Box::new(a.clone())),
        (None, [a]) if matches!(op, MinusInt | MinusFlt) => Expr::Unary("-", Box::new(a.clone())),
        (None, [a]) if matches!(op, IsNull | NotNull) => {
            let symbol = if op == IsNull { "==" } else { "!=" };
            Expr::binary(symbol, a.clone(), Expr::Null)
        }
        _ => runtime(),
    }
}

/// `Console::log` becomes `console_log`.
fn connected_name(key: &str) -> String {
    key.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(snake_case)
        .collect::<Vec<_>>()
        .join("_")
}

fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    for (i, ch) in text.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::CppPrinter;
    use tmpl_ir::build;

    fn spell(expr: &Expression) -> String {
        let mut tr = CppTranslator::new();
        CppPrinter::print_expr(&tr.expr(expr).unwrap())
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("DivIntIntSafe"), "div_int_int_safe");
        assert_eq!(connected_name("Console::log"), "console_log");
        assert_eq!(connected_name("String::begin"), "string_begin");
    }

    #[test]
    fn test_operators() {
        let sum = build::op(BuiltinOperator::PlusIntInt, vec![build::int(1), build::int(2)]);
        assert_eq!(spell(&sum), "1 + 2");
        let div = build::op(BuiltinOperator::DivIntInt, vec![build::int(1), build::int(2)]);
        assert_eq!(spell(&div), "temper::core::div_int_int(1, 2)");
        let is_null = build::op(BuiltinOperator::IsNull, vec![build::null()]);
        assert_eq!(spell(&is_null), "nullptr == nullptr");
    }

    #[test]
    fn test_literals() {
        assert_eq!(spell(&build::string("hi")), "temper::core::string(\"hi\")");
        assert_eq!(spell(&build::value(Value::Void)), "TEMPER_VOID");
        assert_eq!(spell(&build::value(Value::Int64 { value: 5 })), "INT64_C(5)");
        assert_eq!(
            spell(&build::value(Value::Opaque {
                type_tag: "Closure".into()
            })),
            "exit(0) /* unsupported Closure */"
        );
    }

    #[test]
    fn test_constructor_and_method_calls() {
        let apple = build::defined(build::exported("Apple"));
        assert_eq!(
            spell(&build::construct(apple, vec![build::int(3)])),
            "Apple::make(3)"
        );
        let call = build::call_method(build::reference(build::source("a", 1)), "size", vec![]);
        assert_eq!(spell(&call), "a__0->size()");
    }

    #[test]
    fn test_property_access() {
        let get = build::get_backed(
            build::this(build::source("this", 1)),
            build::internal(build::source("count", 2)),
        );
        assert_eq!(spell(&get), "this__0->count__0");
    }
}
