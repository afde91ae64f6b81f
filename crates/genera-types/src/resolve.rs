//! Generic type-argument resolution.
//!
//! Given a start type and a generic ancestor class, work out which types were substituted for
//! the ancestor's type parameters along the start type's hierarchy:
//!
//! ```text
//! class A<T> {}
//! class B<U> extends A<U> {}
//! class C extends B<Integer> {}
//!
//! resolve_actual_type_arguments(C, A) == [Integer]
//! ```
//!
//! The walk collects every generic type between the start type and the ancestor (start first,
//! then [`all_hierarchical_types`] restricted to types assignable to the ancestor). Each
//! parameterized type on that path contributes one [`TypeArgument`] per argument, keyed by the
//! declaring class and the parameter position. A raw generic class contributes its own type
//! variables as placeholders. Resolution then starts from the ancestor's own variables and
//! follows variable-to-variable bindings (`A.T -> B.U -> Integer`) until it reaches a concrete
//! type.
//!
//! Bindings are consulted in discovery order, so the first binding in pre-order walk order
//! wins. A superclass subtree is walked before the start type's own interfaces, so that is not
//! always the most-derived binding. Later bindings for the same position are only used when
//! every earlier one fails to resolve.

use std::collections::HashSet;

use indexmap::IndexSet;
use thiserror::Error;

use crate::classify::{is_assignable, raw_class_of};
use crate::hierarchy::all_hierarchical_types;
use crate::{ClassId, ClassType, Type, TypeEnv, TypeVarId, WildcardBound};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("type argument index {index} is out of range: {len} argument(s) resolved")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// `ty` fills parameter position `index` of class `declaring`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeArgument {
    pub declaring: ClassId,
    pub index: u32,
    pub ty: Type,
}

impl TypeArgument {
    pub fn new(declaring: ClassId, index: u32, ty: Type) -> Self {
        Self {
            declaring,
            index,
            ty,
        }
    }

    fn binds(&self, var: TypeVarId) -> bool {
        self.declaring == var.owner && self.index == var.index
    }
}

/// Resolve the type arguments `start` supplies to `ancestor`'s type parameters.
///
/// Returns one type per resolved parameter position, in declaration order. Positions that do not
/// resolve to a concrete type (bound only by a wildcard, or left raw somewhere on the path) are
/// skipped, so the result can be shorter than `ancestor`'s parameter list.
///
/// An ancestor without type parameters, or one that `start` does not extend, yields an empty
/// result. A type-variable `start` is resolved through its declared bound.
pub fn resolve_actual_type_arguments(
    env: &dyn TypeEnv,
    start: &Type,
    ancestor: ClassId,
) -> Vec<Type> {
    let Some(start) = effective_start(env, start) else {
        return Vec::new();
    };
    let param_count = match env.class(ancestor) {
        Some(def) => def.type_params.len(),
        None => return Vec::new(),
    };
    if param_count == 0 || !is_assignable(env, ancestor, &start) {
        return Vec::new();
    }

    let on_path = |ty: &Type| is_assignable(env, ancestor, ty);
    let mut path = vec![start.clone()];
    path.extend(all_hierarchical_types(env, &start, &[&on_path]));

    let bindings = Bindings::collect(env, &path);
    tracing::trace!(
        ancestor = ?ancestor,
        path_len = path.len(),
        bindings = bindings.len(),
        "resolving type arguments"
    );

    let mut visiting = HashSet::new();
    (0..param_count as u32)
        .filter_map(|index| bindings.resolve_var(TypeVarId::new(ancestor, index), &mut visiting))
        .collect()
}

/// Like [`resolve_actual_type_arguments`], returning only the `index`th resolved argument.
///
/// `index` counts resolved arguments, not declared parameters: when a position was skipped the
/// later arguments shift down.
pub fn resolve_actual_type_argument(
    env: &dyn TypeEnv,
    start: &Type,
    ancestor: ClassId,
    index: usize,
) -> Result<Type, ResolveError> {
    check_known(env, start, ancestor)?;
    let resolved = resolve_actual_type_arguments(env, start, ancestor);
    let len = resolved.len();
    resolved
        .into_iter()
        .nth(index)
        .ok_or(ResolveError::IndexOutOfRange { index, len })
}

/// Raw classes of [`resolve_actual_type_arguments`]; nested type arguments are dropped and
/// results without a class (arrays) are skipped.
pub fn resolve_actual_type_argument_classes(
    env: &dyn TypeEnv,
    start: &Type,
    ancestor: ClassId,
) -> Vec<ClassId> {
    resolve_actual_type_arguments(env, start, ancestor)
        .iter()
        .filter_map(|ty| raw_class_of(env, ty))
        .collect()
}

fn effective_start(env: &dyn TypeEnv, start: &Type) -> Option<Type> {
    match start {
        Type::Class(_) | Type::Parameterized(_) => Some(start.clone()),
        Type::TypeVar(var) => match &env.type_param(*var)?.bound {
            Some(bound) => match bound {
                Type::Class(_) | Type::Parameterized(_) => Some(bound.clone()),
                _ => None,
            },
            None => Some(Type::class(env.well_known().object)),
        },
        Type::Wildcard(_) | Type::Array(_) => None,
    }
}

fn check_known(env: &dyn TypeEnv, start: &Type, ancestor: ClassId) -> Result<(), ResolveError> {
    if env.class(ancestor).is_none() {
        return Err(ResolveError::InvalidArgument(format!(
            "ancestor {ancestor:?} is not a known class"
        )));
    }
    let start_class = match start {
        Type::Class(def) | Type::Parameterized(ClassType { def, .. }) => Some(*def),
        Type::TypeVar(var) => Some(var.owner),
        Type::Wildcard(_) | Type::Array(_) => None,
    };
    match start_class {
        Some(def) if env.class(def).is_some() => Ok(()),
        Some(def) => Err(ResolveError::InvalidArgument(format!(
            "start type refers to unknown class {def:?}"
        ))),
        None => Err(ResolveError::InvalidArgument(
            "start type must be a class, parameterized type or type variable".to_string(),
        )),
    }
}

/// Insertion-ordered set of bindings discovered along a hierarchy path.
struct Bindings {
    entries: IndexSet<TypeArgument>,
}

impl Bindings {
    fn collect(env: &dyn TypeEnv, path: &[Type]) -> Self {
        let mut entries = IndexSet::new();
        for ty in path {
            match ty {
                Type::Parameterized(ClassType { def, args }) => {
                    let declared = env.class(*def).map_or(0, |d| d.type_params.len());
                    if declared != args.len() {
                        tracing::debug!(
                            class = ?def,
                            declared,
                            supplied = args.len(),
                            "ignoring parameterized type with mismatched argument count"
                        );
                        continue;
                    }
                    for (index, arg) in args.iter().enumerate() {
                        entries.insert(TypeArgument::new(*def, index as u32, arg.clone()));
                    }
                }
                Type::Class(def) => {
                    let declared = env.class(*def).map_or(0, |d| d.type_params.len());
                    for index in 0..declared as u32 {
                        entries.insert(TypeArgument::new(
                            *def,
                            index,
                            Type::type_var(*def, index),
                        ));
                    }
                }
                Type::TypeVar(_) | Type::Wildcard(_) | Type::Array(_) => {}
            }
        }
        Self { entries }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn candidates(&self, var: TypeVarId) -> impl Iterator<Item = &Type> + '_ {
        self.entries
            .iter()
            .filter(move |arg| arg.binds(var))
            .map(|arg| &arg.ty)
    }

    /// First candidate binding for `var` that resolves to a concrete type.
    fn resolve_var(&self, var: TypeVarId, visiting: &mut HashSet<TypeVarId>) -> Option<Type> {
        if !visiting.insert(var) {
            return None;
        }
        let resolved = self
            .candidates(var)
            .find_map(|candidate| self.resolve_type(candidate, visiting));
        visiting.remove(&var);
        resolved
    }

    fn resolve_type(&self, ty: &Type, visiting: &mut HashSet<TypeVarId>) -> Option<Type> {
        match ty {
            Type::TypeVar(var) => self.resolve_var(*var, visiting),
            Type::Class(_) => Some(ty.clone()),
            Type::Parameterized(ClassType { def, args }) => Some(Type::Parameterized(ClassType {
                def: *def,
                args: args.iter().map(|arg| self.substitute(arg, visiting)).collect(),
            })),
            Type::Array(component) => self.resolve_type(component, visiting).map(Type::array),
            Type::Wildcard(_) => None,
        }
    }

    /// Best-effort substitution inside an already-concrete type. Variables that do not resolve
    /// stay as they are.
    fn substitute(&self, ty: &Type, visiting: &mut HashSet<TypeVarId>) -> Type {
        match ty {
            Type::TypeVar(var) => self
                .resolve_var(*var, visiting)
                .unwrap_or_else(|| ty.clone()),
            Type::Class(_) | Type::Wildcard(WildcardBound::Unbounded) => ty.clone(),
            Type::Parameterized(ClassType { def, args }) => Type::Parameterized(ClassType {
                def: *def,
                args: args.iter().map(|arg| self.substitute(arg, visiting)).collect(),
            }),
            Type::Array(component) => Type::array(self.substitute(component, visiting)),
            Type::Wildcard(WildcardBound::Extends(bound)) => {
                Type::wildcard_extends(self.substitute(bound, visiting))
            }
        }
    }
}
