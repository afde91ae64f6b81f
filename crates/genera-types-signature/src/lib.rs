//! Parsing of source-like type expressions into [`genera_types::Type`].
//!
//! ```text
//! Type     := '?' ( ('extends' | 'super') Type )?        (type arguments only)
//!           | Name ( '<' Type ( ',' Type )* '>' )? ( '[' ']' )*
//! TypeParam:= Ident ( 'extends' Type )?
//! ```
//!
//! Names are looked up in the [`TypeVarScope`] first, then as fully qualified class names, then
//! as simple names when exactly one registered class has that simple name.

#![forbid(unsafe_code)]

mod parser;

use genera_types::{ClassId, TypeEnv, TypeParamDef, TypeStore, TypeVarId};
use thiserror::Error;

use crate::parser::Parser;

pub use genera_types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("unexpected end of type expression `{0}`")]
    UnexpectedEnd(String),
    #[error("unexpected `{found}` at offset {offset} in `{input}`")]
    Unexpected {
        input: String,
        offset: usize,
        found: String,
    },
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("ambiguous type name `{name}` (candidates: {})", .candidates.join(", "))]
    AmbiguousName {
        name: String,
        candidates: Vec<String>,
    },
    #[error("type variable `{0}` cannot take type arguments")]
    ArgumentsOnTypeVariable(String),
    #[error("wildcards are only allowed as type arguments: `{0}`")]
    WildcardOutsideArguments(String),
    #[error("`{class}` expects {expected} type argument(s), found {found}")]
    ArityMismatch {
        class: String,
        expected: usize,
        found: usize,
    },
    #[error("invalid type parameter name `{0}`")]
    InvalidTypeParameter(String),
}

/// Type variables visible while parsing, innermost declarations last.
#[derive(Debug, Clone, Default)]
pub struct TypeVarScope {
    vars: Vec<(String, TypeVarId)>,
}

impl TypeVarScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope holding the type parameters `class` declares.
    pub fn for_class(env: &dyn TypeEnv, class: ClassId) -> Self {
        let mut scope = Self::new();
        if let Some(def) = env.class(class) {
            for (index, tp) in def.type_params.iter().enumerate() {
                scope.insert(tp.name.clone(), TypeVarId::new(class, index as u32));
            }
        }
        scope
    }

    /// Bring `name` into scope, shadowing any outer variable with the same name.
    pub fn insert(&mut self, name: impl Into<String>, var: TypeVarId) {
        self.vars.push((name.into(), var));
    }

    pub fn get(&self, name: &str) -> Option<TypeVarId> {
        self.vars
            .iter()
            .rev()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, var)| *var)
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Parse a complete type expression such as `java.util.Map<String, List<T>>[]`.
pub fn parse_type(
    store: &TypeStore,
    scope: &TypeVarScope,
    text: &str,
) -> Result<Type, SignatureError> {
    let mut parser = Parser::new(store, scope, text)?;
    let ty = parser.ty()?;
    parser.finish()?;
    Ok(ty)
}

/// Parse a type parameter declaration such as `T` or `T extends Comparable<T>`.
///
/// The bound is parsed in `scope`, so a self-referential bound needs the declaring class's
/// variables to be in scope already.
pub fn parse_type_param(
    store: &TypeStore,
    scope: &TypeVarScope,
    text: &str,
) -> Result<TypeParamDef, SignatureError> {
    let mut parser = Parser::new(store, scope, text)?;
    let param = parser.type_param()?;
    parser.finish()?;
    Ok(param)
}

/// The name declared by a type parameter declaration, without parsing its bound.
pub fn type_param_name(text: &str) -> Result<&str, SignatureError> {
    let name = text
        .split_whitespace()
        .next()
        .ok_or_else(|| SignatureError::UnexpectedEnd(text.to_string()))?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$') {
        return Err(SignatureError::InvalidTypeParameter(name.to_string()));
    }
    Ok(name)
}
