//! Java-like rendering of [`Type`]s for diagnostics and CLI output.

use std::fmt;

use crate::{ClassId, ClassType, Type, TypeEnv, WildcardBound};

/// Render `ty` with fully qualified class names, e.g. `com.example.Box<java.lang.String>[]`.
///
/// Classes missing from `env` render as `<unknown#N>`; type variables render under their declared
/// name, or `<T#owner:index>` when the owner is unknown.
pub fn format_type(env: &dyn TypeEnv, ty: &Type) -> String {
    TypeDisplay { env, ty }.to_string()
}

/// [`fmt::Display`] adapter over a type and the environment that names it.
pub struct TypeDisplay<'a> {
    pub env: &'a dyn TypeEnv,
    pub ty: &'a Type,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(self.env, self.ty, f)
    }
}

fn write_type(env: &dyn TypeEnv, ty: &Type, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match ty {
        Type::Class(def) => write_class_name(env, *def, f),
        Type::Parameterized(ClassType { def, args }) => {
            write_class_name(env, *def, f)?;
            f.write_str("<")?;
            for (idx, arg) in args.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write_type(env, arg, f)?;
            }
            f.write_str(">")
        }
        Type::TypeVar(var) => match env.type_param(*var) {
            Some(tp) => f.write_str(&tp.name),
            None => write!(f, "<T#{}:{}>", var.owner.to_raw(), var.index),
        },
        Type::Wildcard(WildcardBound::Unbounded) => f.write_str("?"),
        Type::Wildcard(WildcardBound::Extends(bound)) => {
            f.write_str("? extends ")?;
            write_type(env, bound, f)
        }
        Type::Array(component) => {
            write_type(env, component, f)?;
            f.write_str("[]")
        }
    }
}

fn write_class_name(env: &dyn TypeEnv, id: ClassId, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match env.class(id) {
        Some(def) => f.write_str(&def.name),
        None => write!(f, "<unknown#{}>", id.to_raw()),
    }
}
