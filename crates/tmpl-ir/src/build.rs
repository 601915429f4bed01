//! Short constructors for hand-built trees.
//!
//! Tests across the workspace use these instead of spelling out every
//! payload struct.

use crate::names::{Id, ResolvedName};
use crate::support::{BuiltinOperator, SupportCode};
use crate::tree::*;
use crate::types::{Type, TypeName, WellKnownType};
use crate::value::Value;
use tmpl_common::Pos;

// =============================================================================
// Names
// =============================================================================

pub fn exported(text: &str) -> Id {
    Id::new(ResolvedName::exported(text))
}

pub fn source(base: &str, uid: u32) -> Id {
    Id::new(ResolvedName::source(base, uid))
}

pub fn temporary(base: &str, uid: u32) -> Id {
    Id::new(ResolvedName::temporary(base, uid))
}

pub fn defined(id: Id) -> TypeName {
    TypeName::Defined { id }
}

pub fn well_known(name: WellKnownType) -> TypeName {
    TypeName::WellKnown { name }
}

// =============================================================================
// Expressions
// =============================================================================

pub fn reference(id: Id) -> Expression {
    Expression::Reference(Reference {
        pos: Pos::synthetic(),
        id,
    })
}

pub fn this(id: Id) -> Expression {
    Expression::This(Reference {
        pos: Pos::synthetic(),
        id,
    })
}

pub fn value(value: Value) -> Expression {
    Expression::Value(ValueExpr {
        pos: Pos::synthetic(),
        value,
    })
}

pub fn int(value: i32) -> Expression {
    self::value(Value::Int { value })
}

pub fn float(value: f64) -> Expression {
    self::value(Value::Float64 { value })
}

pub fn string(value: &str) -> Expression {
    self::value(Value::String {
        value: value.to_string(),
    })
}

pub fn boolean(value: bool) -> Expression {
    self::value(Value::Boolean { value })
}

pub fn null() -> Expression {
    value(Value::Null)
}

pub fn call(callee: Callable, args: Vec<Expression>) -> Expression {
    Expression::Call(Call {
        pos: Pos::synthetic(),
        callee,
        args,
    })
}

pub fn call_fn(id: Id, args: Vec<Expression>) -> Expression {
    call(
        Callable::FnReference(Reference {
            pos: Pos::synthetic(),
            id,
        }),
        args,
    )
}

pub fn construct(name: TypeName, args: Vec<Expression>) -> Expression {
    call(
        Callable::Constructor(TypeRef {
            pos: Pos::synthetic(),
            name,
        }),
        args,
    )
}

pub fn call_method(subject: Expression, method: &str, args: Vec<Expression>) -> Expression {
    call(
        Callable::Method(MethodRef {
            pos: Pos::synthetic(),
            subject: Subject::expr(subject),
            method: method.to_string(),
        }),
        args,
    )
}

pub fn support(code: SupportCode, args: Vec<Expression>) -> Expression {
    call(
        Callable::Support(SupportRef {
            pos: Pos::synthetic(),
            code,
        }),
        args,
    )
}

pub fn op(op: BuiltinOperator, args: Vec<Expression>) -> Expression {
    support(SupportCode::Operator { op }, args)
}

pub fn connected(key: &str, args: Vec<Expression>) -> Expression {
    support(
        SupportCode::Connected {
            key: key.to_string(),
        },
        args,
    )
}

pub fn infix(op: InfixOp, left: Expression, right: Expression) -> Expression {
    Expression::Infix(Infix {
        pos: Pos::synthetic(),
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

pub fn not(operand: Expression) -> Expression {
    Expression::Prefix(Prefix {
        pos: Pos::synthetic(),
        op: PrefixOp::Bang,
        operand: Box::new(operand),
    })
}

pub fn get_backed(subject: Expression, property: PropertyId) -> Expression {
    Expression::GetBackedProperty(GetProperty {
        pos: Pos::synthetic(),
        subject: Subject::expr(subject),
        property,
    })
}

pub fn external(name: &str) -> PropertyId {
    PropertyId::External {
        name: name.to_string(),
    }
}

pub fn internal(id: Id) -> PropertyId {
    PropertyId::Internal { id }
}

// =============================================================================
// Statements
// =============================================================================

pub fn block(statements: Vec<Statement>) -> Block {
    Block {
        pos: Pos::synthetic(),
        statements,
    }
}

pub fn block_stmt(statements: Vec<Statement>) -> Statement {
    Statement::Block(block(statements))
}

pub fn assign(left: Id, right: Expression) -> Statement {
    Statement::Assignment(Assignment {
        pos: Pos::synthetic(),
        left,
        right,
    })
}

pub fn expr_stmt(expr: Expression) -> Statement {
    Statement::ExprStmt(ExprStmt {
        pos: Pos::synthetic(),
        expr,
    })
}

pub fn local(name: Id, init: Option<Expression>) -> Statement {
    Statement::LocalDecl(LocalDecl {
        pos: Pos::synthetic(),
        name,
        ty: None,
        init,
    })
}

pub fn local_fn(name: Id, params: Parameters, body: Vec<Statement>) -> Statement {
    Statement::LocalFunction(LocalFunction {
        pos: Pos::synthetic(),
        name,
        params,
        return_type: None,
        body: block(body),
        may_yield: false,
    })
}

pub fn ret(expr: Option<Expression>) -> Statement {
    Statement::Return(ReturnStmt {
        pos: Pos::synthetic(),
        expr,
    })
}

pub fn brk(label: Option<&str>) -> Statement {
    Statement::Break(Jump {
        pos: Pos::synthetic(),
        label: label.map(str::to_string),
    })
}

pub fn cont(label: Option<&str>) -> Statement {
    Statement::Continue(Jump {
        pos: Pos::synthetic(),
        label: label.map(str::to_string),
    })
}

pub fn if_(test: Expression, consequent: Statement, alternate: Option<Statement>) -> Statement {
    Statement::If(IfStmt {
        pos: Pos::synthetic(),
        test,
        consequent: Box::new(consequent),
        alternate: alternate.map(Box::new),
    })
}

pub fn while_(test: Expression, body: Statement) -> Statement {
    Statement::While(WhileStmt {
        pos: Pos::synthetic(),
        test,
        body: Box::new(body),
    })
}

pub fn labeled(label: &str, body: Statement) -> Statement {
    Statement::Labeled(Labeled {
        pos: Pos::synthetic(),
        label: label.to_string(),
        body: Box::new(body),
    })
}

pub fn try_(tried: Statement, recover: Statement) -> Statement {
    Statement::Try(TryStmt {
        pos: Pos::synthetic(),
        tried: Box::new(tried),
        recover: Box::new(recover),
    })
}

pub fn set_backed(subject: Expression, property: PropertyId, right: Expression) -> Statement {
    Statement::SetBackedProperty(SetProperty {
        pos: Pos::synthetic(),
        subject: Subject::expr(subject),
        property,
        right,
    })
}

// =============================================================================
// Declarations
// =============================================================================

pub fn formal(name: Id) -> Formal {
    Formal {
        pos: Pos::synthetic(),
        name,
        ty: None,
        optional: TriState::Unknown,
    }
}

pub fn typed_formal(name: Id, ty: Type, optional: TriState) -> Formal {
    Formal {
        pos: Pos::synthetic(),
        name,
        ty: Some(ty),
        optional,
    }
}

pub fn params(formals: Vec<Formal>) -> Parameters {
    Parameters {
        params: formals,
        rest: None,
    }
}

pub fn module_fn(name: Id, params: Parameters, body: Vec<Statement>) -> TopLevel {
    TopLevel::ModuleFunction(ModuleFunction {
        pos: Pos::synthetic(),
        name,
        params,
        return_type: None,
        body: block(body),
        may_yield: false,
        category: DependencyCategory::Production,
    })
}

pub fn module_var(name: Id, init: Option<Expression>) -> TopLevel {
    TopLevel::ModuleLevelDecl(ModuleLevelDecl {
        pos: Pos::synthetic(),
        name,
        ty: None,
        init,
        category: DependencyCategory::Production,
    })
}

pub fn init_block(body: Vec<Statement>) -> TopLevel {
    TopLevel::ModuleInitBlock(ModuleInitBlock {
        pos: Pos::synthetic(),
        body: block(body),
        category: DependencyCategory::Production,
    })
}

pub fn test_decl(name: Id, raw_name: &str, body: Vec<Statement>) -> TopLevel {
    TopLevel::Test(TestDecl {
        pos: Pos::synthetic(),
        name,
        raw_name: raw_name.to_string(),
        params: Parameters::default(),
        body: block(body),
    })
}

pub fn type_decl(name: Id, members: Vec<Member>) -> TopLevel {
    TopLevel::TypeDecl(TypeDecl {
        pos: Pos::synthetic(),
        name,
        type_params: Vec::new(),
        supers: Vec::new(),
        members,
        category: DependencyCategory::Production,
    })
}

pub fn method(dot_name: &str, name: Id, params: Parameters, body: Option<Vec<Statement>>) -> MethodLike {
    MethodLike {
        pos: Pos::synthetic(),
        dot_name: dot_name.to_string(),
        name,
        params,
        return_type: None,
        body: body.map(block),
        may_yield: false,
    }
}

pub fn module(name: &[&str], library_name: &str, top_levels: Vec<TopLevel>) -> Module {
    Module {
        name: name.iter().map(|s| s.to_string()).collect(),
        library_name: library_name.to_string(),
        pos: Pos::synthetic(),
        imports: Vec::new(),
        top_levels,
    }
}
