//! Lowering of support code onto the `temper-core` Lua runtime.
//!
//! Integer comparisons and 64-bit arithmetic map onto native Lua operators;
//! everything else is a call into the `temper` table.

use crate::ast::{BinOp, Expr, UnOp};
use tmpl_common::Pos;
use tmpl_ir::{BuiltinOperator, RuntimeTypeOperation, SupportCode, TranslateError, WellKnownType};

/// `temper.<name>`
pub fn temper(name: &str) -> Expr {
    Expr::dot(Expr::name("temper"), name)
}

/// `temper.<name>(args)`
pub fn temper_call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::call(temper(name), args)
}

pub fn translate_support(
    code: &SupportCode,
    args: Vec<Expr>,
    pos: &Pos,
) -> Result<Expr, TranslateError> {
    match code {
        SupportCode::Operator { op } => translate_operator(*op, args, pos),
        SupportCode::Connected { key } => Ok(translate_connected(key, args)),
        SupportCode::GetStatic => args
            .into_iter()
            .next()
            .ok_or_else(|| TranslateError::invariant(pos, "static read without a member")),
        SupportCode::PureVirtual => Ok(temper_call("virtual", args)),
        SupportCode::RuntimeTypeOp { op, target } => {
            let target = match target {
                WellKnownType::StringIndex => "string_index",
                WellKnownType::NoStringIndex => "no_string_index",
                other => {
                    return Err(TranslateError::unsupported(
                        pos,
                        "RuntimeTypeOp",
                        format!("no runtime check for {}", other.name()),
                    ));
                }
            };
            let verb = match op {
                RuntimeTypeOperation::Is => "is",
                RuntimeTypeOperation::As | RuntimeTypeOperation::AssertAs => "require",
            };
            Ok(temper_call(&format!("{verb}_{target}"), args))
        }
    }
}

fn binary(op: BinOp, args: Vec<Expr>, pos: &Pos) -> Result<Expr, TranslateError> {
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(left), Some(right), None) => Ok(Expr::binop(op, left, right)),
        _ => Err(TranslateError::invariant(
            pos,
            format!("operator {} takes two operands", op.as_str()),
        )),
    }
}

fn unary(op: UnOp, args: Vec<Expr>, pos: &Pos) -> Result<Expr, TranslateError> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(operand), None) => Ok(Expr::UnOp(op, Box::new(operand))),
        _ => Err(TranslateError::invariant(pos, "unary operator takes one operand")),
    }
}

fn translate_operator(
    op: BuiltinOperator,
    args: Vec<Expr>,
    pos: &Pos,
) -> Result<Expr, TranslateError> {
    use BuiltinOperator::*;
    let runtime = match op {
        EqIntInt => return binary(BinOp::Eq, args, pos),
        NeIntInt => return binary(BinOp::Ne, args, pos),
        LtIntInt => return binary(BinOp::Lt, args, pos),
        LeIntInt => return binary(BinOp::Le, args, pos),
        GtIntInt => return binary(BinOp::Gt, args, pos),
        GeIntInt => return binary(BinOp::Ge, args, pos),
        PlusIntInt64 => return binary(BinOp::Add, args, pos),
        MinusIntInt64 => return binary(BinOp::Sub, args, pos),
        TimesIntInt64 => return binary(BinOp::Mul, args, pos),
        BooleanNegation => return unary(UnOp::Not, args, pos),
        NotNull => {
            return args
                .into_iter()
                .next()
                .ok_or_else(|| TranslateError::invariant(pos, "NotNull without operand"));
        }
        Async => return Err(TranslateError::unsupported(pos, "BuiltinOperator", "Async")),
        BitwiseAnd => "band",
        BitwiseOr => "bor",
        IsNull => "is_null",
        DivFltFlt => "fdiv",
        DivIntInt | DivIntIntSafe => "int32_div",
        DivIntInt64 | DivIntInt64Safe => "int64_div",
        ModFltFlt => "fmod",
        ModIntInt | ModIntIntSafe => "int32_mod",
        ModIntInt64 | ModIntInt64Safe => "int64_mod",
        MinusFlt => "unm",
        MinusFltFlt => "sub",
        MinusInt => "int32_unm",
        MinusInt64 => "int64_unm",
        MinusIntInt => "int32_sub",
        PlusFltFlt => "add",
        PlusIntInt => "int32_add",
        PowFltFlt => "pow",
        TimesIntInt => "int32_mul",
        TimesFltFlt => "mul",
        LtFltFlt => "float_lt",
        LeFltFlt => "float_le",
        GtFltFlt => "float_gt",
        GeFltFlt => "float_ge",
        EqFltFlt => "float_eq",
        NeFltFlt => "float_ne",
        LtStrStr => "str_lt",
        LeStrStr => "str_le",
        GtStrStr => "str_gt",
        GeStrStr => "str_ge",
        EqStrStr => "str_eq",
        NeStrStr => "str_ne",
        LtGeneric => "generic_lt",
        LeGeneric => "generic_le",
        GtGeneric => "generic_gt",
        GeGeneric => "generic_ge",
        EqGeneric => "generic_eq",
        NeGeneric => "generic_ne",
        CmpFltFlt => "float_cmp",
        CmpIntInt => "int_cmp",
        CmpStrStr => "str_cmp",
        CmpGeneric => "generic_cmp",
        Bubble | Panic => "bubble",
        Print => "print",
        StrCat => "concat",
        Listify => "listof",
    };
    Ok(temper_call(runtime, args))
}

fn translate_connected(key: &str, mut args: Vec<Expr>) -> Expr {
    match key {
        "::getConsole" => Expr::Float(0.0),
        "Console::log" => temper_call("log", args.pop().into_iter().collect()),
        "String::begin" => Expr::Int(1),
        "StringIndex::none" => Expr::Int(-1),
        "Generator::next" | "SafeGenerator::next" => temper_call("generator_next", args),
        other => temper_call(&connected_name(other), args),
    }
}

/// `Map::get` becomes `map_get`.
fn connected_name(key: &str) -> String {
    let name: String = key
        .replace("::", "_")
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    name.trim_start_matches('_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(op: BuiltinOperator, args: Vec<Expr>) -> Expr {
        translate_support(&SupportCode::Operator { op }, args, &Pos::default()).unwrap()
    }

    fn a() -> Expr {
        Expr::name("a")
    }

    fn b() -> Expr {
        Expr::name("b")
    }

    #[test]
    fn test_native_int_comparison() {
        assert_eq!(
            op(BuiltinOperator::LtIntInt, vec![a(), b()]),
            Expr::binop(BinOp::Lt, a(), b())
        );
        assert_eq!(
            op(BuiltinOperator::BooleanNegation, vec![a()]),
            Expr::not(a())
        );
    }

    #[test]
    fn test_runtime_operators() {
        assert_eq!(
            op(BuiltinOperator::DivIntInt, vec![a(), b()]),
            temper_call("int32_div", vec![a(), b()])
        );
        assert_eq!(
            op(BuiltinOperator::StrCat, vec![a(), b()]),
            temper_call("concat", vec![a(), b()])
        );
        assert_eq!(op(BuiltinOperator::Panic, vec![]), temper_call("bubble", vec![]));
    }

    #[test]
    fn test_binary_arity_is_checked() {
        let err = translate_support(
            &SupportCode::Operator {
                op: BuiltinOperator::EqIntInt,
            },
            vec![a()],
            &Pos::default(),
        );
        assert!(matches!(err, Err(TranslateError::Invariant { .. })));
    }

    #[test]
    fn test_connected_keys() {
        let connected = |key: &str, args| {
            translate_support(&SupportCode::Connected { key: key.into() }, args, &Pos::default())
                .unwrap()
        };
        assert_eq!(connected("String::begin", vec![]), Expr::Int(1));
        assert_eq!(connected("StringIndex::none", vec![]), Expr::Int(-1));
        assert_eq!(
            connected("Console::log", vec![Expr::Float(0.0), a()]),
            temper_call("log", vec![a()])
        );
        assert_eq!(
            connected("Map::getOr", vec![a()]),
            temper_call("map_getor", vec![a()])
        );
    }

    #[test]
    fn test_runtime_type_checks() {
        let code = SupportCode::RuntimeTypeOp {
            op: RuntimeTypeOperation::AssertAs,
            target: WellKnownType::NoStringIndex,
        };
        assert_eq!(
            translate_support(&code, vec![a()], &Pos::default()).unwrap(),
            temper_call("require_no_string_index", vec![a()])
        );
        let code = SupportCode::RuntimeTypeOp {
            op: RuntimeTypeOperation::Is,
            target: WellKnownType::Int,
        };
        assert!(translate_support(&code, vec![a()], &Pos::default()).is_err());
    }

    #[test]
    fn test_async_is_unsupported() {
        let err = translate_support(
            &SupportCode::Operator {
                op: BuiltinOperator::Async,
            },
            vec![],
            &Pos::default(),
        );
        assert!(matches!(err, Err(TranslateError::Unsupported { .. })));
    }
}
