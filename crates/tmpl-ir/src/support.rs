//! Support code: operations the frontend leaves to each backend's runtime.

use crate::types::WellKnownType;
use serde::{Deserialize, Serialize};

/// Builtin operators. Operand kinds are spelled into the name, e.g.
/// `LtIntInt` compares two ints.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltinOperator {
    BooleanNegation,
    BitwiseAnd,
    BitwiseOr,
    IsNull,
    NotNull,
    DivFltFlt,
    DivIntInt,
    DivIntIntSafe,
    DivIntInt64,
    DivIntInt64Safe,
    ModFltFlt,
    ModIntInt,
    ModIntIntSafe,
    ModIntInt64,
    ModIntInt64Safe,
    MinusFlt,
    MinusFltFlt,
    MinusInt,
    MinusIntInt,
    MinusInt64,
    MinusIntInt64,
    PlusFltFlt,
    PlusIntInt,
    PlusIntInt64,
    PowFltFlt,
    TimesFltFlt,
    TimesIntInt,
    TimesIntInt64,
    LtFltFlt,
    LtIntInt,
    LtStrStr,
    LtGeneric,
    LeFltFlt,
    LeIntInt,
    LeStrStr,
    LeGeneric,
    GtFltFlt,
    GtIntInt,
    GtStrStr,
    GtGeneric,
    GeFltFlt,
    GeIntInt,
    GeStrStr,
    GeGeneric,
    EqFltFlt,
    EqIntInt,
    EqStrStr,
    EqGeneric,
    NeFltFlt,
    NeIntInt,
    NeStrStr,
    NeGeneric,
    CmpFltFlt,
    CmpIntInt,
    CmpStrStr,
    CmpGeneric,
    Bubble,
    Panic,
    Print,
    StrCat,
    Listify,
    Async,
}

/// Runtime type checks the frontend could not discharge statically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeTypeOperation {
    Is,
    As,
    AssertAs,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SupportCode {
    Operator {
        op: BuiltinOperator,
    },
    /// A library function connected to the runtime by key, like
    /// `Console::log` or `String::begin`.
    Connected {
        key: String,
    },
    /// Reads a static member; the single argument is already the member.
    GetStatic,
    /// Body of an abstract method.
    PureVirtual,
    RuntimeTypeOp {
        op: RuntimeTypeOperation,
        target: WellKnownType,
    },
}

impl SupportCode {
    pub fn describe(&self) -> String {
        match self {
            SupportCode::Operator { op } => format!("{op:?}"),
            SupportCode::Connected { key } => key.clone(),
            SupportCode::GetStatic => "GetStatic".to_string(),
            SupportCode::PureVirtual => "PureVirtual".to_string(),
            SupportCode::RuntimeTypeOp { op, target } => format!("{op:?}{}", target.name()),
        }
    }
}
