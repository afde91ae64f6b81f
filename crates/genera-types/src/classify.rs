//! Predicates and raw conversions over [`Type`] handles.
//!
//! The tag tests accept either `&Type` or `Option<&Type>`; an absent type is never anything.

use std::collections::{HashSet, VecDeque};

use crate::{ClassId, ClassType, Type, TypeEnv};

pub fn is_concrete_class<'a>(ty: impl Into<Option<&'a Type>>) -> bool {
    matches!(ty.into(), Some(Type::Class(_)))
}

pub fn is_parameterized_type<'a>(ty: impl Into<Option<&'a Type>>) -> bool {
    matches!(ty.into(), Some(Type::Parameterized(_)))
}

pub fn is_type_variable<'a>(ty: impl Into<Option<&'a Type>>) -> bool {
    matches!(ty.into(), Some(Type::TypeVar(_)))
}

pub fn is_wildcard<'a>(ty: impl Into<Option<&'a Type>>) -> bool {
    matches!(ty.into(), Some(Type::Wildcard(_)))
}

pub fn is_array_type<'a>(ty: impl Into<Option<&'a Type>>) -> bool {
    matches!(ty.into(), Some(Type::Array(_)))
}

/// True only for classes and parameterized types.
pub fn is_concrete_type<'a>(ty: impl Into<Option<&'a Type>>) -> bool {
    matches!(ty.into(), Some(Type::Class(_) | Type::Parameterized(_)))
}

/// The raw type behind `ty`: a parameterized type becomes its class, anything else is returned
/// unchanged.
pub fn raw_type_of(ty: &Type) -> Type {
    match ty {
        Type::Parameterized(ClassType { def, .. }) => Type::Class(*def),
        other => other.clone(),
    }
}

/// The class behind `ty`, if there is one.
///
/// Type variables follow their declared bound one level; an unbounded variable is bounded by the
/// root type. Wildcards and arrays have no class.
pub fn raw_class_of<'a>(env: &dyn TypeEnv, ty: impl Into<Option<&'a Type>>) -> Option<ClassId> {
    match ty.into()? {
        Type::Class(def) | Type::Parameterized(ClassType { def, .. }) => Some(*def),
        Type::TypeVar(var) => match env.type_param(*var).map(|tp| tp.bound.as_ref()) {
            Some(Some(bound)) => bound.class_id(),
            Some(None) => Some(env.well_known().object),
            None => None,
        },
        Type::Wildcard(_) | Type::Array(_) => None,
    }
}

/// Raw-class subtype check: is `sub` the same class as `sup`, or does it extend/implement it
/// (transitively)?
///
/// Every class is a subclass of the root type. Missing class metadata ends that branch of the
/// search instead of failing.
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup || sup == env.well_known().object {
        return true;
    }

    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([sub]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        if current == sup {
            return true;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        let supers = def.super_class.iter().chain(def.interfaces.iter());
        queue.extend(supers.filter_map(Type::class_id));
    }

    false
}

/// Can a value of `target` be assigned to `super_class`?
///
/// Only raw classes are compared; type arguments are ignored. Arrays are assignable to the root
/// type only. Targets without a class (wildcards, absent types) are never assignable.
pub fn is_assignable<'a>(
    env: &dyn TypeEnv,
    super_class: ClassId,
    target: impl Into<Option<&'a Type>>,
) -> bool {
    let Some(target) = target.into() else {
        return false;
    };
    if let Type::Array(_) = target {
        return super_class == env.well_known().object;
    }
    match raw_class_of(env, target) {
        Some(sub) => is_subclass(env, sub, super_class),
        None => false,
    }
}
