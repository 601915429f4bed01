//! Modules, declarations, statements and expressions.
//!
//! Every enum here is internally tagged by `"kind"` in snake_case, with the
//! variant's payload struct flattened beside the tag. Positions default to
//! synthetic when absent.

use crate::names::Id;
use crate::support::SupportCode;
use crate::types::{Type, TypeName};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use tmpl_common::Pos;

// =============================================================================
// Modules
// =============================================================================

/// One translation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// Path segments relative to the library root. The last one keeps its
    /// source extension, e.g. `["sub", "thing.temper"]`. Empty for the
    /// library's root module.
    #[serde(default)]
    pub name: Vec<String>,
    pub library_name: String,
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub imports: Vec<Import>,
    #[serde(default)]
    pub top_levels: Vec<TopLevel>,
}

impl Module {
    /// Module path with the source extension removed from the last segment.
    pub fn stem_segments(&self) -> Vec<String> {
        let mut segments = self.name.clone();
        if let Some(last) = segments.last_mut() {
            *last = strip_source_extension(last).to_string();
        }
        segments
    }
}

/// Removes a trailing `.temper` or `.temper.md`.
pub fn strip_source_extension(name: &str) -> &str {
    name.strip_suffix(".temper.md")
        .or_else(|| name.strip_suffix(".temper"))
        .unwrap_or(name)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePath {
    pub library_name: String,
    #[serde(default)]
    pub to: Vec<String>,
}

impl ModulePath {
    /// `library/segments` with the source extension dropped.
    pub fn require_path(&self) -> String {
        let mut text = self.library_name.clone();
        for segment in &self.to {
            text.push('/');
            text.push_str(strip_source_extension(segment));
        }
        text
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Import {
    #[serde(default)]
    pub pos: Pos,
    /// Name bound in this module; absent for imports resolved lazily.
    #[serde(default)]
    pub local_name: Option<Id>,
    pub external_name: Id,
    #[serde(default)]
    pub path: Option<ModulePath>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyCategory {
    #[default]
    Production,
    Test,
}

// =============================================================================
// Top levels
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopLevel {
    ModuleInitBlock(ModuleInitBlock),
    ModuleFunction(ModuleFunction),
    ModuleLevelDecl(ModuleLevelDecl),
    Test(TestDecl),
    TypeDecl(TypeDecl),
    TypeConnection(TypeConnection),
    Garbage(GarbageTopLevel),
    PooledValue(PooledValue),
}

impl TopLevel {
    pub fn pos(&self) -> &Pos {
        match self {
            TopLevel::ModuleInitBlock(t) => &t.pos,
            TopLevel::ModuleFunction(t) => &t.pos,
            TopLevel::ModuleLevelDecl(t) => &t.pos,
            TopLevel::Test(t) => &t.pos,
            TopLevel::TypeDecl(t) => &t.pos,
            TopLevel::TypeConnection(t) => &t.pos,
            TopLevel::Garbage(t) => &t.pos,
            TopLevel::PooledValue(t) => &t.pos,
        }
    }

    pub fn category(&self) -> DependencyCategory {
        match self {
            TopLevel::ModuleInitBlock(t) => t.category,
            TopLevel::ModuleFunction(t) => t.category,
            TopLevel::ModuleLevelDecl(t) => t.category,
            TopLevel::Test(_) => DependencyCategory::Test,
            TopLevel::TypeDecl(t) => t.category,
            TopLevel::TypeConnection(t) => t.category,
            TopLevel::Garbage(t) => t.category,
            TopLevel::PooledValue(t) => t.category,
        }
    }

    /// The module-scoped name this top level declares, if any.
    pub fn declared_name(&self) -> Option<&Id> {
        match self {
            TopLevel::ModuleFunction(t) => Some(&t.name),
            TopLevel::ModuleLevelDecl(t) => Some(&t.name),
            TopLevel::TypeDecl(t) => Some(&t.name),
            TopLevel::PooledValue(t) => Some(&t.name),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TopLevel::ModuleInitBlock(_) => "ModuleInitBlock",
            TopLevel::ModuleFunction(_) => "ModuleFunction",
            TopLevel::ModuleLevelDecl(_) => "ModuleLevelDecl",
            TopLevel::Test(_) => "Test",
            TopLevel::TypeDecl(_) => "TypeDecl",
            TopLevel::TypeConnection(_) => "TypeConnection",
            TopLevel::Garbage(_) => "GarbageTopLevel",
            TopLevel::PooledValue(_) => "PooledValue",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleInitBlock {
    #[serde(default)]
    pub pos: Pos,
    pub body: Block,
    #[serde(default)]
    pub category: DependencyCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleFunction {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default)]
    pub params: Parameters,
    #[serde(default)]
    pub return_type: Option<Type>,
    pub body: Block,
    #[serde(default)]
    pub may_yield: bool,
    #[serde(default)]
    pub category: DependencyCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModuleLevelDecl {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub init: Option<Expression>,
    #[serde(default)]
    pub category: DependencyCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestDecl {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    /// The test's human-readable name.
    pub raw_name: String,
    #[serde(default)]
    pub params: Parameters,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDecl {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default)]
    pub type_params: Vec<Id>,
    #[serde(default)]
    pub supers: Vec<TypeName>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub category: DependencyCategory,
}

/// Declares that a frontend type is provided by a runtime type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeConnection {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    pub to: String,
    #[serde(default)]
    pub category: DependencyCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GarbageTopLevel {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub category: DependencyCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PooledValue {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default)]
    pub category: DependencyCategory,
}

// =============================================================================
// Type members
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Constructor(Constructor),
    Getter(MethodLike),
    Setter(MethodLike),
    Method(MethodLike),
    StaticMethod(MethodLike),
    InstanceProperty(InstanceProperty),
    StaticProperty(StaticProperty),
}

impl Member {
    pub fn pos(&self) -> &Pos {
        match self {
            Member::Constructor(m) => &m.pos,
            Member::Getter(m) | Member::Setter(m) | Member::Method(m) | Member::StaticMethod(m) => {
                &m.pos
            }
            Member::InstanceProperty(m) => &m.pos,
            Member::StaticProperty(m) => &m.pos,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constructor {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub params: Parameters,
    pub body: Block,
}

/// Methods, getters, setters and static methods. The first formal of an
/// instance member is the receiver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodLike {
    #[serde(default)]
    pub pos: Pos,
    /// The member's name as written after a dot.
    pub dot_name: String,
    pub name: Id,
    #[serde(default)]
    pub params: Parameters,
    #[serde(default)]
    pub return_type: Option<Type>,
    /// Absent for abstract members.
    #[serde(default)]
    pub body: Option<Block>,
    #[serde(default)]
    pub may_yield: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceProperty {
    #[serde(default)]
    pub pos: Pos,
    pub dot_name: String,
    pub name: Id,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StaticProperty {
    #[serde(default)]
    pub pos: Pos,
    pub dot_name: String,
    pub init: Expression,
}

// =============================================================================
// Parameters
// =============================================================================

/// Three-valued knowledge, for facts the frontend may not have settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriState {
    True,
    False,
    #[default]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Formal {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub optional: TriState,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub params: Vec<Formal>,
    #[serde(default)]
    pub rest: Option<Formal>,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    Assignment(Assignment),
    Block(Block),
    Break(Jump),
    Continue(Jump),
    Comment(CommentStmt),
    CodeFoldStart(Marker),
    CodeFoldEnd(Marker),
    ExprStmt(ExprStmt),
    Garbage(Marker),
    /// Opens a failure-handling region the frontend already lowered.
    HandlerScope(Marker),
    If(IfStmt),
    Labeled(Labeled),
    LocalDecl(LocalDecl),
    LocalFunction(LocalFunction),
    ModuleInitFailed(Marker),
    Return(ReturnStmt),
    SetAbstractProperty(SetProperty),
    SetBackedProperty(SetProperty),
    Throw(Marker),
    Try(TryStmt),
    While(WhileStmt),
    Yield(Marker),
    ComputedJump(Marker),
}

impl Statement {
    pub fn pos(&self) -> &Pos {
        match self {
            Statement::Assignment(s) => &s.pos,
            Statement::Block(s) => &s.pos,
            Statement::Break(s) | Statement::Continue(s) => &s.pos,
            Statement::Comment(s) => &s.pos,
            Statement::CodeFoldStart(s)
            | Statement::CodeFoldEnd(s)
            | Statement::Garbage(s)
            | Statement::HandlerScope(s)
            | Statement::ModuleInitFailed(s)
            | Statement::Throw(s)
            | Statement::Yield(s)
            | Statement::ComputedJump(s) => &s.pos,
            Statement::ExprStmt(s) => &s.pos,
            Statement::If(s) => &s.pos,
            Statement::Labeled(s) => &s.pos,
            Statement::LocalDecl(s) => &s.pos,
            Statement::LocalFunction(s) => &s.pos,
            Statement::Return(s) => &s.pos,
            Statement::SetAbstractProperty(s) | Statement::SetBackedProperty(s) => &s.pos,
            Statement::Try(s) => &s.pos,
            Statement::While(s) => &s.pos,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Assignment(_) => "Assignment",
            Statement::Block(_) => "Block",
            Statement::Break(_) => "Break",
            Statement::Continue(_) => "Continue",
            Statement::Comment(_) => "Comment",
            Statement::CodeFoldStart(_) => "CodeFoldStart",
            Statement::CodeFoldEnd(_) => "CodeFoldEnd",
            Statement::ExprStmt(_) => "ExprStmt",
            Statement::Garbage(_) => "GarbageStatement",
            Statement::HandlerScope(_) => "HandlerScope",
            Statement::If(_) => "If",
            Statement::Labeled(_) => "Labeled",
            Statement::LocalDecl(_) => "LocalDecl",
            Statement::LocalFunction(_) => "LocalFunction",
            Statement::ModuleInitFailed(_) => "ModuleInitFailed",
            Statement::Return(_) => "Return",
            Statement::SetAbstractProperty(_) => "SetAbstractProperty",
            Statement::SetBackedProperty(_) => "SetBackedProperty",
            Statement::Throw(_) => "Throw",
            Statement::Try(_) => "Try",
            Statement::While(_) => "While",
            Statement::Yield(_) => "Yield",
            Statement::ComputedJump(_) => "ComputedJump",
        }
    }
}

/// A statement with nothing but a position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    #[serde(default)]
    pub pos: Pos,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(default)]
    pub pos: Pos,
    pub left: Id,
    pub right: Expression,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Jump {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommentStmt {
    #[serde(default)]
    pub pos: Pos,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExprStmt {
    #[serde(default)]
    pub pos: Pos,
    pub expr: Expression,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    #[serde(default)]
    pub pos: Pos,
    pub test: Expression,
    pub consequent: Box<Statement>,
    #[serde(default)]
    pub alternate: Option<Box<Statement>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Labeled {
    #[serde(default)]
    pub pos: Pos,
    pub label: String,
    pub body: Box<Statement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalDecl {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default, rename = "type")]
    pub ty: Option<Type>,
    #[serde(default)]
    pub init: Option<Expression>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalFunction {
    #[serde(default)]
    pub pos: Pos,
    pub name: Id,
    #[serde(default)]
    pub params: Parameters,
    #[serde(default)]
    pub return_type: Option<Type>,
    pub body: Block,
    #[serde(default)]
    pub may_yield: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnStmt {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub expr: Option<Expression>,
}

/// The receiver side of a property read or write.
///
/// Static members are reached through a type name instead of a value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    Expr { expr: Box<Expression> },
    Type { name: TypeName },
}

impl Subject {
    pub fn expr(expr: Expression) -> Self {
        Subject::Expr {
            expr: Box::new(expr),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyId {
    /// A public member, spelled by its dot name.
    External { name: String },
    /// A backing field, named like a local.
    Internal { id: Id },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetProperty {
    #[serde(default)]
    pub pos: Pos,
    pub subject: Subject,
    pub property: PropertyId,
    pub right: Expression,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TryStmt {
    #[serde(default)]
    pub pos: Pos,
    pub tried: Box<Statement>,
    pub recover: Box<Statement>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhileStmt {
    #[serde(default)]
    pub pos: Pos,
    pub test: Expression,
    pub body: Box<Statement>,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfixOp {
    AmpAmp,
    BarBar,
    EqEqInt,
    GeInt,
    GtInt,
    LeInt,
    LtInt,
    PlusInt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrefixOp {
    Bang,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    Await(Wrapped),
    Call(Call),
    Cast(TypeTest),
    InstanceOf(TypeTest),
    UncheckedNotNull(Wrapped),
    GetAbstractProperty(GetProperty),
    GetBackedProperty(GetProperty),
    Infix(Infix),
    Prefix(Prefix),
    Reference(Reference),
    /// Number of rest arguments.
    RestCount(Marker),
    /// The rest arguments as a list.
    Rest(Marker),
    /// The rest arguments spread into a call.
    RestSpread(Marker),
    This(Reference),
    Value(ValueExpr),
    Garbage(GarbageExpr),
    BubbleSentinel(Marker),
}

impl Expression {
    pub fn pos(&self) -> &Pos {
        match self {
            Expression::Await(e) | Expression::UncheckedNotNull(e) => &e.pos,
            Expression::Call(e) => &e.pos,
            Expression::Cast(e) | Expression::InstanceOf(e) => &e.pos,
            Expression::GetAbstractProperty(e) | Expression::GetBackedProperty(e) => &e.pos,
            Expression::Infix(e) => &e.pos,
            Expression::Prefix(e) => &e.pos,
            Expression::Reference(e) | Expression::This(e) => &e.pos,
            Expression::RestCount(e)
            | Expression::Rest(e)
            | Expression::RestSpread(e)
            | Expression::BubbleSentinel(e) => &e.pos,
            Expression::Value(e) => &e.pos,
            Expression::Garbage(e) => &e.pos,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Await(_) => "Await",
            Expression::Call(_) => "Call",
            Expression::Cast(_) => "Cast",
            Expression::InstanceOf(_) => "InstanceOf",
            Expression::UncheckedNotNull(_) => "UncheckedNotNull",
            Expression::GetAbstractProperty(_) => "GetAbstractProperty",
            Expression::GetBackedProperty(_) => "GetBackedProperty",
            Expression::Infix(_) => "Infix",
            Expression::Prefix(_) => "Prefix",
            Expression::Reference(_) => "Reference",
            Expression::RestCount(_) => "RestCount",
            Expression::Rest(_) => "Rest",
            Expression::RestSpread(_) => "RestSpread",
            Expression::This(_) => "This",
            Expression::Value(_) => "Value",
            Expression::Garbage(_) => "GarbageExpression",
            Expression::BubbleSentinel(_) => "BubbleSentinel",
        }
    }

    /// A call to the abstract-member placeholder.
    pub fn is_pure_virtual(&self) -> bool {
        matches!(
            self,
            Expression::Call(Call {
                callee: Callable::Support(SupportRef {
                    code: SupportCode::PureVirtual,
                    ..
                }),
                ..
            })
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wrapped {
    #[serde(default)]
    pub pos: Pos,
    pub expr: Box<Expression>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Call {
    #[serde(default)]
    pub pos: Pos,
    pub callee: Callable,
    #[serde(default)]
    pub args: Vec<Expression>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeTest {
    #[serde(default)]
    pub pos: Pos,
    pub expr: Box<Expression>,
    pub checked_type: Type,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GetProperty {
    #[serde(default)]
    pub pos: Pos,
    pub subject: Subject,
    pub property: PropertyId,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Infix {
    #[serde(default)]
    pub pos: Pos,
    pub op: InfixOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prefix {
    #[serde(default)]
    pub pos: Pos,
    pub op: PrefixOp,
    pub operand: Box<Expression>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub pos: Pos,
    pub id: Id,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueExpr {
    #[serde(default)]
    pub pos: Pos,
    pub value: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GarbageExpr {
    #[serde(default)]
    pub pos: Pos,
    #[serde(default)]
    pub diagnostic: Option<String>,
}

// =============================================================================
// Callees
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Callable {
    FnReference(Reference),
    Constructor(TypeRef),
    Method(MethodRef),
    Support(SupportRef),
    Garbage(GarbageExpr),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeRef {
    #[serde(default)]
    pub pos: Pos,
    pub name: TypeName,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodRef {
    #[serde(default)]
    pub pos: Pos,
    pub subject: Subject,
    /// Dot name of the method.
    pub method: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupportRef {
    #[serde(default)]
    pub pos: Pos,
    pub code: SupportCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_segments_drops_source_extension() {
        let module = Module {
            name: vec!["a".into(), "b.temper.md".into()],
            library_name: "lib".into(),
            pos: Pos::default(),
            imports: vec![],
            top_levels: vec![],
        };
        assert_eq!(module.stem_segments(), vec!["a", "b"]);
        assert_eq!(strip_source_extension("x.temper"), "x");
        assert_eq!(strip_source_extension("x.lua"), "x.lua");
    }

    #[test]
    fn test_require_path() {
        let path = ModulePath {
            library_name: "std".into(),
            to: vec!["regex".into(), "core.temper".into()],
        };
        assert_eq!(path.require_path(), "std/regex/core");
    }

    #[test]
    fn test_test_decl_is_always_test_category() {
        let top = TopLevel::Test(TestDecl {
            pos: Pos::default(),
            name: Id::new(crate::ResolvedName::source("t", 0)),
            raw_name: "t".into(),
            params: Parameters::default(),
            body: Block::default(),
        });
        assert_eq!(top.category(), DependencyCategory::Test);
        assert!(top.declared_name().is_none());
    }
}
