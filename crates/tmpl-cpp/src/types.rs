//! TmpL static types as `temper::core` C++ types.

use crate::ast::TypeExpr;
use crate::names::CppNames;
use tmpl_ir::{Type, TypeName, WellKnownType};

pub fn cpp_type(ty: &Type, names: &mut CppNames) -> TypeExpr {
    match ty {
        Type::Nominal { name, params } => nominal(name, params, names),
        Type::Function { params, rest, ret } => {
            let mut args = vec![cpp_type(ret, names)];
            args.extend(params.iter().map(|p| cpp_type(p, names)));
            if let Some(rest) = rest {
                args.push(TypeExpr::core_template("List", vec![cpp_type(rest, names)]));
            }
            TypeExpr::core_template("Function", args)
        }
        Type::Union { members } => union(members, names),
        Type::Intersection { .. } => TypeExpr::core("AnyValue"),
        Type::Bubble | Type::Never => TypeExpr::name("void"),
        Type::Top => TypeExpr::Pointer(Box::new(TypeExpr::name("void"))),
    }
}

/// The type of a declaration that may have no static type.
pub fn cpp_type_or_auto(ty: Option<&Type>, names: &mut CppNames) -> TypeExpr {
    ty.map_or(TypeExpr::Auto, |ty| cpp_type(ty, names))
}

/// Return types default to `void`.
pub fn return_type(ty: Option<&Type>, names: &mut CppNames) -> TypeExpr {
    ty.map_or_else(|| TypeExpr::name("void"), |ty| cpp_type(ty, names))
}

pub fn type_name(name: &TypeName, names: &mut CppNames) -> String {
    match name {
        TypeName::WellKnown { name } => format!("temper::core::{}", name.name()),
        TypeName::Defined { id } => names.name(id),
    }
}

fn nominal(name: &TypeName, params: &[Type], names: &mut CppNames) -> TypeExpr {
    match name {
        TypeName::WellKnown {
            name: WellKnownType::Void,
        } => TypeExpr::name("void"),
        TypeName::WellKnown { name } if params.is_empty() => TypeExpr::core(name.name()),
        TypeName::WellKnown { name } => TypeExpr::core_template(
            name.name(),
            params.iter().map(|p| cpp_type(p, names)).collect(),
        ),
        TypeName::Defined { id } => {
            let mut inner = TypeExpr::Name(names.name(id));
            if !params.is_empty() {
                inner = TypeExpr::Template {
                    name: names.name(id),
                    args: params.iter().map(|p| cpp_type(p, names)).collect(),
                };
            }
            TypeExpr::core_template("Object", vec![inner])
        }
    }
}

fn union(members: &[Type], names: &mut CppNames) -> TypeExpr {
    let nullable = members.iter().any(Type::is_null);
    let fallible = members.iter().any(|m| matches!(m, Type::Bubble));
    let rest: Vec<&Type> = members
        .iter()
        .filter(|m| !m.is_null() && !matches!(m, Type::Bubble))
        .collect();
    let mut ty = match rest.as_slice() {
        [] if nullable => return TypeExpr::core("Null"),
        [] => TypeExpr::name("void"),
        [only] => cpp_type(only, names),
        _ => TypeExpr::core("AnyValue"),
    };
    if nullable {
        ty = TypeExpr::core_template("Nullable", vec![ty]);
    }
    if fallible {
        ty = TypeExpr::core_template("Bubble", vec![ty]);
    }
    ty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::CppPrinter;
    use tmpl_ir::build;

    fn spell(ty: &Type) -> String {
        CppPrinter::print_type(&cpp_type(ty, &mut CppNames::new()))
    }

    #[test]
    fn test_well_known() {
        assert_eq!(spell(&Type::nominal(WellKnownType::Int)), "temper::core::Int");
        assert_eq!(spell(&Type::nominal(WellKnownType::Void)), "void");
        assert_eq!(
            spell(&Type::Nominal {
                name: TypeName::WellKnown {
                    name: WellKnownType::List
                },
                params: vec![Type::nominal(WellKnownType::String)],
            }),
            "temper::core::List<temper::core::String>"
        );
    }

    #[test]
    fn test_nullable_and_bubble() {
        let ty = Type::Union {
            members: vec![
                Type::nominal(WellKnownType::Int),
                Type::nominal(WellKnownType::Null),
                Type::Bubble,
            ],
        };
        assert_eq!(
            spell(&ty),
            "temper::core::Bubble<temper::core::Nullable<temper::core::Int>>"
        );
    }

    #[test]
    fn test_defined_and_function() {
        let apple = Type::defined(build::exported("Apple"));
        assert_eq!(spell(&apple), "temper::core::Object<Apple>");
        let f = Type::Function {
            params: vec![Type::nominal(WellKnownType::Boolean)],
            rest: None,
            ret: Box::new(Type::nominal(WellKnownType::Void)),
        };
        assert_eq!(spell(&f), "temper::core::Function<void, temper::core::Boolean>");
    }

    #[test]
    fn test_top_and_never() {
        assert_eq!(spell(&Type::Top), "void*");
        assert_eq!(spell(&Type::Never), "void");
    }
}
