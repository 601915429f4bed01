//! Static types as the frontend reports them.

use crate::names::Id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Types every backend's runtime knows without a declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownType {
    AnyValue,
    Boolean,
    Float64,
    Function,
    Generator,
    Int,
    Int64,
    List,
    ListBuilder,
    Listed,
    Map,
    MapBuilder,
    Mapped,
    NoStringIndex,
    Null,
    Promise,
    String,
    StringIndex,
    Symbol,
    Type,
    Void,
}

impl WellKnownType {
    pub fn name(self) -> &'static str {
        match self {
            WellKnownType::AnyValue => "AnyValue",
            WellKnownType::Boolean => "Boolean",
            WellKnownType::Float64 => "Float64",
            WellKnownType::Function => "Function",
            WellKnownType::Generator => "Generator",
            WellKnownType::Int => "Int",
            WellKnownType::Int64 => "Int64",
            WellKnownType::List => "List",
            WellKnownType::ListBuilder => "ListBuilder",
            WellKnownType::Listed => "Listed",
            WellKnownType::Map => "Map",
            WellKnownType::MapBuilder => "MapBuilder",
            WellKnownType::Mapped => "Mapped",
            WellKnownType::NoStringIndex => "NoStringIndex",
            WellKnownType::Null => "Null",
            WellKnownType::Promise => "Promise",
            WellKnownType::String => "String",
            WellKnownType::StringIndex => "StringIndex",
            WellKnownType::Symbol => "Symbol",
            WellKnownType::Type => "Type",
            WellKnownType::Void => "Void",
        }
    }
}

/// Names a nominal type: either one the runtime provides or one declared in
/// some module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeName {
    WellKnown { name: WellKnownType },
    Defined { id: Id },
}

impl TypeName {
    pub fn well_known(&self) -> Option<WellKnownType> {
        match self {
            TypeName::WellKnown { name } => Some(*name),
            TypeName::Defined { .. } => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::WellKnown { name } => f.write_str(name.name()),
            TypeName::Defined { id } => id.fmt(f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Nominal {
        name: TypeName,
        #[serde(default)]
        params: Vec<Type>,
    },
    Function {
        #[serde(default)]
        params: Vec<Type>,
        #[serde(default)]
        rest: Option<Box<Type>>,
        ret: Box<Type>,
    },
    Union {
        members: Vec<Type>,
    },
    Intersection {
        members: Vec<Type>,
    },
    /// The failure branch of a fallible result.
    Bubble,
    Never,
    Top,
}

/// The coarse runtime classification used for casts and `instanceof`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImplicitTypeTag {
    Boolean,
    Float64,
    Function,
    Int,
    List,
    ListBuilder,
    Map,
    MapBuilder,
    Null,
    String,
    Void,
    /// Anything else; casts to it go through the type's own name.
    Other,
}

impl ImplicitTypeTag {
    /// Lower-case spelling used by runtime helper names.
    pub fn helper_suffix(self) -> &'static str {
        match self {
            ImplicitTypeTag::Boolean => "boolean",
            ImplicitTypeTag::Float64 => "float64",
            ImplicitTypeTag::Function => "function",
            ImplicitTypeTag::Int => "int",
            ImplicitTypeTag::List => "list",
            ImplicitTypeTag::ListBuilder => "listbuilder",
            ImplicitTypeTag::Map => "map",
            ImplicitTypeTag::MapBuilder => "mapbuilder",
            ImplicitTypeTag::Null => "null",
            ImplicitTypeTag::String => "string",
            ImplicitTypeTag::Void => "void",
            ImplicitTypeTag::Other => "other",
        }
    }
}

impl Type {
    pub fn nominal(name: WellKnownType) -> Type {
        Type::Nominal {
            name: TypeName::WellKnown { name },
            params: Vec::new(),
        }
    }

    pub fn defined(id: Id) -> Type {
        Type::Nominal {
            name: TypeName::Defined { id },
            params: Vec::new(),
        }
    }

    fn is_well_known(&self, which: WellKnownType) -> bool {
        matches!(self, Type::Nominal { name: TypeName::WellKnown { name }, .. } if *name == which)
    }

    pub fn is_null(&self) -> bool {
        self.is_well_known(WellKnownType::Null)
    }

    pub fn is_void(&self) -> bool {
        self.is_well_known(WellKnownType::Void)
    }

    /// Strips `Bubble` and `Null` alternatives from a union.
    ///
    /// A union that reduces to one member yields that member; anything else
    /// is returned unchanged.
    pub fn without_bubble_or_null(&self) -> &Type {
        let Type::Union { members } = self else {
            return self;
        };
        let mut rest = members
            .iter()
            .filter(|m| !m.is_null() && !matches!(m, Type::Bubble));
        match (rest.next(), rest.next()) {
            (Some(only), None) => only.without_bubble_or_null(),
            _ => self,
        }
    }

    pub fn implicit_type_tag(&self) -> ImplicitTypeTag {
        let stripped = self.without_bubble_or_null();
        match stripped {
            Type::Nominal {
                name: TypeName::WellKnown { name },
                ..
            } => match name {
                WellKnownType::Boolean => ImplicitTypeTag::Boolean,
                WellKnownType::Float64 => ImplicitTypeTag::Float64,
                WellKnownType::Function => ImplicitTypeTag::Function,
                WellKnownType::Int => ImplicitTypeTag::Int,
                WellKnownType::List | WellKnownType::Listed => ImplicitTypeTag::List,
                WellKnownType::ListBuilder => ImplicitTypeTag::ListBuilder,
                WellKnownType::Map | WellKnownType::Mapped => ImplicitTypeTag::Map,
                WellKnownType::MapBuilder => ImplicitTypeTag::MapBuilder,
                WellKnownType::Null => ImplicitTypeTag::Null,
                WellKnownType::String => ImplicitTypeTag::String,
                WellKnownType::Void => ImplicitTypeTag::Void,
                _ => ImplicitTypeTag::Other,
            },
            Type::Function { .. } => ImplicitTypeTag::Function,
            Type::Union { members } if members.iter().all(Type::is_null) => ImplicitTypeTag::Null,
            _ => ImplicitTypeTag::Other,
        }
    }

    /// The nominal type name, looking through a nullable or fallible union.
    pub fn nominal_name(&self) -> Option<&TypeName> {
        match self.without_bubble_or_null() {
            Type::Nominal { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether `null` is a member of this type.
    pub fn can_be_null(&self) -> bool {
        match self {
            Type::Nominal {
                name: TypeName::WellKnown { name },
                ..
            } => matches!(name, WellKnownType::Null | WellKnownType::AnyValue),
            Type::Union { members } => members.iter().any(Type::can_be_null),
            Type::Intersection { members } => members.iter().all(Type::can_be_null),
            Type::Top => true,
            _ => false,
        }
    }
}
