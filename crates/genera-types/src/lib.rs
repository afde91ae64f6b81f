//! Type model and generic type-argument resolution for Genera.
//!
//! Types live in a [`TypeStore`] (or anything else implementing [`TypeEnv`]). The store is
//! populated once at registration time and treated as immutable afterwards; every query in
//! this crate is a pure function over `&dyn TypeEnv`.
//!
//! The interesting entry point is [`resolve_actual_type_arguments`]: given a start type and a
//! generic ancestor class, it answers "which types were substituted for the ancestor's type
//! parameters along this hierarchy?".

#![forbid(unsafe_code)]

pub mod classify;
pub mod format;
pub mod hierarchy;
pub mod resolve;
mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::classify::{
    is_array_type, is_assignable, is_concrete_class, is_concrete_type, is_parameterized_type,
    is_subclass, is_type_variable, is_wildcard, raw_class_of, raw_type_of,
};
pub use crate::format::{format_type, TypeDisplay};
pub use crate::hierarchy::{
    all_hierarchical_types, find_first_ancestor, hierarchical_types, TypeFilter,
};
pub use crate::resolve::{
    resolve_actual_type_argument, resolve_actual_type_argument_classes,
    resolve_actual_type_arguments, ResolveError, TypeArgument,
};
pub use crate::store::TypeStore;

/// Index of a class definition inside a [`TypeEnv`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(u32);

impl ClassId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

/// A type variable, identified by the class that declares it and its position in that
/// class's type parameter list.
///
/// Two classes may both declare a `T`; they are distinct variables because their owners
/// differ. The variable's name is only available through the owner's [`TypeParamDef`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId {
    pub owner: ClassId,
    pub index: u32,
}

impl TypeVarId {
    pub fn new(owner: ClassId, index: u32) -> Self {
        Self { owner, index }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
}

/// A type handle.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    /// A class referenced without type arguments (non-generic, or used raw).
    Class(ClassId),
    /// A generic class applied to type arguments, e.g. `Box<String>`.
    Parameterized(ClassType),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Array(Box<Type>),
}

impl Type {
    pub fn class(def: ClassId) -> Self {
        Type::Class(def)
    }

    /// `def<args...>`; an empty argument list yields the plain class.
    pub fn parameterized(def: ClassId, args: Vec<Type>) -> Self {
        if args.is_empty() {
            Type::Class(def)
        } else {
            Type::Parameterized(ClassType { def, args })
        }
    }

    pub fn type_var(owner: ClassId, index: u32) -> Self {
        Type::TypeVar(TypeVarId::new(owner, index))
    }

    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    pub fn wildcard() -> Self {
        Type::Wildcard(WildcardBound::Unbounded)
    }

    pub fn wildcard_extends(bound: Type) -> Self {
        Type::Wildcard(WildcardBound::Extends(Box::new(bound)))
    }

    /// The class this type is written against, if it is a class or parameterized type.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(def) | Type::Parameterized(ClassType { def, .. }) => Some(*def),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    /// Declared upper bound; `None` means the root type.
    pub bound: Option<Type>,
}

impl TypeParamDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bound: None,
        }
    }

    pub fn bounded(name: impl Into<String>, bound: Type) -> Self {
        Self {
            name: name.into(),
            bound: Some(bound),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeParamDef>,
    /// Generic superclass. Always `None` for interfaces.
    pub super_class: Option<Type>,
    /// Generic interfaces, in declaration order.
    pub interfaces: Vec<Type>,
}

impl ClassDef {
    pub fn new(name: impl Into<String>, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            kind,
            type_params: Vec::new(),
            super_class: None,
            interfaces: Vec::new(),
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, ClassKind::Interface)
    }

    pub fn with_type_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_params = names.into_iter().map(TypeParamDef::new).collect();
        self
    }

    pub fn extends(mut self, super_class: Type) -> Self {
        self.super_class = Some(super_class);
        self
    }

    pub fn implements(mut self, iface: Type) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn is_interface(&self) -> bool {
        self.kind == ClassKind::Interface
    }

    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// Classes every [`TypeStore`] starts with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    /// Root of the class hierarchy (`java.lang.Object`).
    pub object: ClassId,
    pub string: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub double: ClassId,
    pub boolean: ClassId,
    pub number: ClassId,
}

/// Read-only access to class metadata.
///
/// This is the only thing the classifier, walker and resolver need from the host type system.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;

    fn lookup_class(&self, name: &str) -> Option<ClassId>;

    fn well_known(&self) -> &WellKnownTypes;

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.class(id.owner)?.type_params.get(id.index as usize)
    }
}
