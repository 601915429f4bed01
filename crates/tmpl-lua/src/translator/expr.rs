use super::{LuaTranslator, Result};
use crate::ast::{BinOp, Expr, UnOp};
use crate::support::{temper, temper_call, translate_support};
use tmpl_common::Pos;
use tmpl_ir::{
    Call, Callable, Expression, ImplicitTypeTag, InfixOp, PrefixOp, PropertyId, Subject,
    TranslateError, TypeName, TypeTest, Value, ValueExpr,
};

impl LuaTranslator {
    pub(crate) fn expr(&mut self, expr: &Expression) -> Result<Expr> {
        self.nested(expr.pos(), |this| this.expr_inner(expr))
    }

    fn expr_inner(&mut self, expr: &Expression) -> Result<Expr> {
        Ok(match expr {
            Expression::Await(e) => Expr::MethodCall(Box::new(self.expr(&e.expr)?), "await".into(), Vec::new()),
            Expression::Call(call) => self.call(call)?,
            Expression::Cast(test) => self.cast(test)?,
            Expression::InstanceOf(test) => self.instance_of(test)?,
            Expression::UncheckedNotNull(e) => self.expr(&e.expr)?,
            Expression::GetAbstractProperty(get) | Expression::GetBackedProperty(get) => {
                let subject = prefix(self.subject(&get.subject)?);
                Expr::dot(subject, self.property_name(&get.property))
            }
            Expression::Infix(infix) => {
                let op = match infix.op {
                    InfixOp::AmpAmp => BinOp::And,
                    InfixOp::BarBar => BinOp::Or,
                    InfixOp::EqEqInt => BinOp::Eq,
                    InfixOp::GeInt => BinOp::Ge,
                    InfixOp::GtInt => BinOp::Gt,
                    InfixOp::LeInt => BinOp::Le,
                    InfixOp::LtInt => BinOp::Lt,
                    InfixOp::PlusInt => BinOp::Add,
                };
                let left = self.expr(&infix.left)?;
                let right = self.expr(&infix.right)?;
                Expr::binop(op, left, right)
            }
            Expression::Prefix(p) => match p.op {
                PrefixOp::Bang => Expr::UnOp(UnOp::Not, Box::new(self.expr(&p.operand)?)),
            },
            Expression::Reference(r) | Expression::This(r) => Expr::name(self.names.name(&r.id)),
            Expression::RestCount(_) => {
                Expr::call(Expr::name("select"), vec![Expr::str("#"), Expr::Vararg])
            }
            Expression::Rest(_) => temper_call("listof", vec![Expr::Vararg]),
            Expression::RestSpread(_) => Expr::Vararg,
            Expression::Value(v) => self.value(v)?,
            Expression::Garbage(g) => garbage(g.diagnostic.as_deref()),
            Expression::BubbleSentinel(m) => {
                return Err(TranslateError::unsupported(&m.pos, expr.kind_name(), ""));
            }
        })
    }

    pub(super) fn subject(&mut self, subject: &Subject) -> Result<Expr> {
        match subject {
            Subject::Expr { expr } => self.expr(expr),
            Subject::Type { name } => Ok(self.type_name_expr(name)),
        }
    }

    pub(super) fn property_name(&mut self, property: &PropertyId) -> String {
        match property {
            PropertyId::External { name } => self.names.safe_name(name),
            PropertyId::Internal { id } => self.names.name(id),
        }
    }

    /// The runtime value standing for a nominal type.
    pub(super) fn type_name_expr(&mut self, name: &TypeName) -> Expr {
        match name {
            TypeName::Defined { id } => Expr::name(self.names.name(id)),
            TypeName::WellKnown { name } => temper(name.name()),
        }
    }

    fn call(&mut self, call: &Call) -> Result<Expr> {
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            // Symbols name arguments for the frontend only.
            if let Expression::Value(ValueExpr {
                value: Value::Symbol { .. },
                ..
            }) = arg
            {
                continue;
            }
            args.push(self.expr(arg)?);
        }
        Ok(match &call.callee {
            Callable::FnReference(r) => Expr::call(Expr::name(self.names.name(&r.id)), args),
            Callable::Constructor(t) => Expr::call(self.type_name_expr(&t.name), args),
            Callable::Method(m) => {
                let method = self.names.safe_name(&m.method);
                match &m.subject {
                    Subject::Expr { expr } => {
                        Expr::MethodCall(Box::new(self.expr(expr)?), method, args)
                    }
                    Subject::Type { name } => {
                        Expr::call(Expr::dot(self.type_name_expr(name), method), args)
                    }
                }
            }
            Callable::Support(s) => translate_support(&s.code, args, &call.pos)?,
            Callable::Garbage(g) => garbage(g.diagnostic.as_deref()),
        })
    }

    fn cast(&mut self, test: &TypeTest) -> Result<Expr> {
        let subject = self.expr(&test.expr)?;
        match test.checked_type.implicit_type_tag() {
            ImplicitTypeTag::Void => Err(TranslateError::unsupported(
                &test.pos,
                "Cast",
                "cast to Void",
            )),
            ImplicitTypeTag::Other => {
                let name = nominal(test)?;
                let ty = self.type_name_expr(name);
                Ok(temper_call("cast_to", vec![subject, ty]))
            }
            tag => Ok(temper_call(&format!("cast_to_{}", tag.helper_suffix()), vec![subject])),
        }
    }

    fn instance_of(&mut self, test: &TypeTest) -> Result<Expr> {
        let subject = self.expr(&test.expr)?;
        let lua_type = |subject: Expr, name: &str| {
            Expr::binop(
                BinOp::Eq,
                Expr::call(Expr::name("type"), vec![subject]),
                Expr::str(name),
            )
        };
        let runtime = |subject: Expr, ty: Expr| temper_call("instance_of", vec![subject, ty]);
        Ok(match test.checked_type.implicit_type_tag() {
            ImplicitTypeTag::Boolean => lua_type(subject, "boolean"),
            ImplicitTypeTag::Int | ImplicitTypeTag::Float64 => lua_type(subject, "number"),
            ImplicitTypeTag::String => lua_type(subject, "string"),
            ImplicitTypeTag::Function => lua_type(subject, "function"),
            ImplicitTypeTag::List => runtime(subject, temper("List")),
            ImplicitTypeTag::ListBuilder => runtime(subject, temper("ListBuilder")),
            ImplicitTypeTag::Map => runtime(subject, temper("Map")),
            ImplicitTypeTag::MapBuilder => runtime(subject, temper("MapBuilder")),
            ImplicitTypeTag::Other => {
                let name = nominal(test)?;
                let ty = self.type_name_expr(name);
                runtime(subject, ty)
            }
            tag @ (ImplicitTypeTag::Null | ImplicitTypeTag::Void) => {
                return Err(TranslateError::unsupported(
                    &test.pos,
                    "InstanceOf",
                    format!("no runtime check for {}", tag.helper_suffix()),
                ));
            }
        })
    }

    fn value(&mut self, v: &ValueExpr) -> Result<Expr> {
        Ok(match &v.value {
            Value::Boolean { value } => Expr::name(if *value { "true" } else { "false" }),
            Value::Float64 { value } => float(*value),
            Value::Int { value } => Expr::Int(i64::from(*value)),
            Value::Int64 { value } => int64(*value),
            Value::String { value } => Expr::str(value.clone()),
            Value::Symbol { text } => Expr::str(text.clone()),
            Value::Null => temper("null"),
            Value::Type { .. } | Value::Void => Expr::nil(),
            Value::Opaque { type_tag } => return Err(opaque(&v.pos, type_tag)),
        })
    }
}

fn nominal(test: &TypeTest) -> Result<&TypeName> {
    test.checked_type.nominal_name().ok_or_else(|| {
        TranslateError::unsupported(
            &test.pos,
            "TypeTest",
            "type has no runtime name",
        )
    })
}

fn opaque(pos: &Pos, type_tag: &str) -> TranslateError {
    TranslateError::unsupported(pos, "Value", format!("opaque {type_tag} constant"))
}

fn float(value: f64) -> Expr {
    if value.is_nan() {
        temper("nan")
    } else if value == f64::INFINITY {
        temper("pos_inf")
    } else if value == f64::NEG_INFINITY {
        temper("neg_inf")
    } else {
        Expr::Float(value)
    }
}

/// Lua numbers are doubles, so the runtime builds 64-bit integers from
/// 32-bit halves.
fn int64(value: i64) -> Expr {
    if i32::try_from(value).is_ok() {
        temper_call("int64_constructor", vec![Expr::Int(value)])
    } else {
        temper_call(
            "int64_constructor",
            vec![Expr::Int(value >> 32), Expr::Int(value & 0xffff_ffff)],
        )
    }
}

fn garbage(diagnostic: Option<&str>) -> Expr {
    temper_call("bubble", vec![Expr::str(diagnostic.unwrap_or("garbage"))])
}

/// Wraps expressions Lua won't accept before `.name`.
fn prefix(expr: Expr) -> Expr {
    match expr {
        Expr::Name(_) | Expr::Dot(..) | Expr::Index(..) | Expr::Paren(_) => expr,
        other => Expr::Paren(Box::new(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int64_splits_wide_values() {
        assert_eq!(
            int64(-5),
            temper_call("int64_constructor", vec![Expr::Int(-5)])
        );
        assert_eq!(
            int64(1 << 40),
            temper_call("int64_constructor", vec![Expr::Int(256), Expr::Int(0)])
        );
    }

    #[test]
    fn test_non_finite_floats_use_runtime_constants() {
        assert_eq!(float(f64::NAN), temper("nan"));
        assert_eq!(float(f64::NEG_INFINITY), temper("neg_inf"));
        assert_eq!(float(1.5), Expr::Float(1.5));
    }

    #[test]
    fn test_prefix_wraps_calls() {
        let call = Expr::call(Expr::name("Hi"), vec![]);
        assert_eq!(prefix(call.clone()), Expr::Paren(Box::new(call)));
        assert_eq!(prefix(Expr::name("x")), Expr::name("x"));
    }
}
