//! Enumeration of generic ancestors.
//!
//! Ancestors are reported exactly as the declaring class wrote them: `class StringBox extends
//! Box<String>` yields `Box<String>`, and `class B<U> extends A<U>` yields `A<U>` with `U` still
//! owned by `B`. Nothing is substituted here; that is the resolver's job.

use crate::{ClassId, Type, TypeEnv};

/// A predicate over candidate ancestors. Filter slices are AND-combined; an empty slice
/// accepts everything.
pub type TypeFilter<'a> = &'a dyn Fn(&Type) -> bool;

fn accepts(filters: &[TypeFilter<'_>], ty: &Type) -> bool {
    filters.iter().all(|filter| filter(ty))
}

/// Immediate generic ancestors of `ty`: the generic superclass (classes only, never the root
/// type), then the generic interfaces in declaration order.
///
/// Anything that is not a class or parameterized type has no ancestors.
pub fn hierarchical_types(env: &dyn TypeEnv, ty: &Type, filters: &[TypeFilter<'_>]) -> Vec<Type> {
    let Some(id) = ty.class_id() else {
        return Vec::new();
    };
    let Some(def) = env.class(id) else {
        return Vec::new();
    };
    let root = env.well_known().object;

    let mut out = Vec::with_capacity(def.interfaces.len() + 1);
    if !def.is_interface() {
        if let Some(super_class) = &def.super_class {
            if super_class.class_id() != Some(root) && accepts(filters, super_class) {
                out.push(super_class.clone());
            }
        }
    }
    out.extend(
        def.interfaces
            .iter()
            .filter(|iface| iface.class_id() != Some(root) && accepts(filters, iface))
            .cloned(),
    );
    out
}

/// Every generic ancestor of `ty`, pre-order: each immediate ancestor is followed by its own
/// ancestors before the next sibling.
///
/// Diamonds are not collapsed; an interface reachable along two paths appears twice. An edge
/// that would re-enter a class already on the current path (a malformed cyclic hierarchy) is
/// dropped.
pub fn all_hierarchical_types(
    env: &dyn TypeEnv,
    ty: &Type,
    filters: &[TypeFilter<'_>],
) -> Vec<Type> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    walk(env, ty, filters, &mut path, &mut |ancestor| {
        out.push(ancestor.clone());
        false
    });
    out
}

/// First ancestor of `ty` (in [`all_hierarchical_types`] order) satisfying `predicate`.
pub fn find_first_ancestor(
    env: &dyn TypeEnv,
    ty: &Type,
    predicate: impl Fn(&Type) -> bool,
) -> Option<Type> {
    let mut found = None;
    let mut path = Vec::new();
    walk(env, ty, &[], &mut path, &mut |ancestor| {
        if predicate(ancestor) {
            found = Some(ancestor.clone());
            true
        } else {
            false
        }
    });
    found
}

/// Pre-order DFS. `visit` returns `true` to stop the walk; the return value reports whether it
/// was stopped.
fn walk(
    env: &dyn TypeEnv,
    ty: &Type,
    filters: &[TypeFilter<'_>],
    path: &mut Vec<ClassId>,
    visit: &mut dyn FnMut(&Type) -> bool,
) -> bool {
    let Some(id) = ty.class_id() else {
        return false;
    };
    path.push(id);

    let mut stopped = false;
    for ancestor in hierarchical_types(env, ty, filters) {
        if ancestor.class_id().is_some_and(|next| path.contains(&next)) {
            tracing::debug!(
                class = ?id,
                ancestor = ?ancestor,
                "skipping cyclic supertype edge"
            );
            continue;
        }
        if visit(&ancestor) || walk(env, &ancestor, filters, path, visit) {
            stopped = true;
            break;
        }
    }

    path.pop();
    stopped
}
