#![forbid(unsafe_code)]

//! Declarative type tables.
//!
//! A type table is a TOML document listing classes and interfaces:
//!
//! ```toml
//! [[class]]
//! name = "com.example.Box"
//! type-params = ["T"]
//!
//! [[class]]
//! name = "com.example.StringBox"
//! extends = "com.example.Box<String>"
//! ```
//!
//! [`TableLoader`] registers a table into a [`TypeStore`]. Entries may reference each other in
//! any order.

use std::collections::HashSet;
use std::path::Path;

use genera_types::{ClassDef, ClassId, ClassKind, Type, TypeEnv, TypeParamDef, TypeStore};
use genera_types_signature::{
    parse_type, parse_type_param, type_param_name, SignatureError, TypeVarScope,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read type table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse type table: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("class `{0}` is declared more than once")]
    DuplicateClass(String),
    #[error("class `{0}` is already defined")]
    AlreadyDefined(String),
    #[error("interface `{0}` cannot use `extends`; list super-interfaces under `implements`")]
    InterfaceExtends(String),
    #[error("`{class}`: {source}")]
    Signature {
        class: String,
        #[source]
        source: SignatureError,
    },
    #[error("`{class}` cannot inherit from `{supertype}`: {reason}")]
    InvalidSupertype {
        class: String,
        supertype: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeTable {
    #[serde(default, rename = "class")]
    pub classes: Vec<ClassEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ClassEntry {
    /// Fully qualified name.
    pub name: String,
    #[serde(default)]
    pub kind: ClassKind,
    /// Type parameter declarations, e.g. `"T"` or `"T extends Comparable<T>"`.
    #[serde(default)]
    pub type_params: Vec<String>,
    /// Superclass. Classes without one extend the root type; interfaces must leave it unset.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
}

impl TypeTable {
    pub fn from_toml_str(text: &str) -> Result<Self, TableError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Registers [`TypeTable`]s into a [`TypeStore`].
///
/// Loading is all-or-nothing: on error the store is left as it was.
pub struct TableLoader<'a> {
    store: &'a mut TypeStore,
}

impl<'a> TableLoader<'a> {
    pub fn new(store: &'a mut TypeStore) -> Self {
        Self { store }
    }

    /// Register every class in `table`; returns their ids in table order.
    pub fn load(&mut self, table: &TypeTable) -> Result<Vec<ClassId>, TableError> {
        let mut staged = self.store.clone();
        let ids = declare_classes(&mut staged, table)?;
        for (entry, id) in table.classes.iter().zip(&ids) {
            let def = build_class_def(&staged, entry, *id)?;
            staged.define_class(*id, def);
        }

        tracing::debug!(classes = ids.len(), "loaded type table");
        *self.store = staged;
        Ok(ids)
    }

    /// Read, parse and register a table file.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<Vec<ClassId>, TableError> {
        let path = path.as_ref();
        let table = TypeTable::load_from_path(path)?;
        tracing::debug!(path = %path.display(), "loading type table");
        self.load(&table)
    }
}

/// First pass: intern every name and install a skeleton definition carrying only the kind and
/// the type parameter names, so that later passes can check arities and resolve variables.
fn declare_classes(store: &mut TypeStore, table: &TypeTable) -> Result<Vec<ClassId>, TableError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(table.classes.len());

    for entry in &table.classes {
        if !seen.insert(entry.name.as_str()) {
            return Err(TableError::DuplicateClass(entry.name.clone()));
        }
        if store.class_id(&entry.name).is_some_and(|id| store.is_defined(id)) {
            return Err(TableError::AlreadyDefined(entry.name.clone()));
        }
        if entry.kind == ClassKind::Interface && entry.extends.is_some() {
            return Err(TableError::InterfaceExtends(entry.name.clone()));
        }

        let type_params = entry
            .type_params
            .iter()
            .map(|decl| type_param_name(decl).map(TypeParamDef::new))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TableError::Signature {
                class: entry.name.clone(),
                source,
            })?;

        let id = store.intern_class_id(&entry.name);
        store.define_class(
            id,
            ClassDef {
                type_params,
                ..ClassDef::new(entry.name.clone(), entry.kind)
            },
        );
        ids.push(id);
    }

    Ok(ids)
}

fn build_class_def(
    store: &TypeStore,
    entry: &ClassEntry,
    id: ClassId,
) -> Result<ClassDef, TableError> {
    let signature_error = |source| TableError::Signature {
        class: entry.name.clone(),
        source,
    };
    let scope = TypeVarScope::for_class(store, id);

    let type_params = entry
        .type_params
        .iter()
        .map(|decl| parse_type_param(store, &scope, decl))
        .collect::<Result<Vec<_>, _>>()
        .map_err(signature_error)?;

    let super_class = match (&entry.extends, entry.kind) {
        (Some(text), _) => {
            let ty = parse_type(store, &scope, text).map_err(signature_error)?;
            check_supertype(store, entry, text, &ty, ClassKind::Class)?;
            Some(ty)
        }
        (None, ClassKind::Class) if id != store.well_known().object => {
            Some(Type::class(store.well_known().object))
        }
        (None, _) => None,
    };

    let interfaces = entry
        .implements
        .iter()
        .map(|text| {
            let ty = parse_type(store, &scope, text).map_err(signature_error)?;
            check_supertype(store, entry, text, &ty, ClassKind::Interface)?;
            Ok(ty)
        })
        .collect::<Result<Vec<_>, TableError>>()?;

    Ok(ClassDef {
        name: entry.name.clone(),
        kind: entry.kind,
        type_params,
        super_class,
        interfaces,
    })
}

fn check_supertype(
    store: &TypeStore,
    entry: &ClassEntry,
    text: &str,
    ty: &Type,
    expected: ClassKind,
) -> Result<(), TableError> {
    let invalid = |reason| TableError::InvalidSupertype {
        class: entry.name.clone(),
        supertype: text.to_string(),
        reason,
    };

    let Some(def) = ty.class_id().and_then(|id| store.class(id)) else {
        return Err(invalid("only classes and parameterized types can be inherited"));
    };
    match (expected, def.kind) {
        (ClassKind::Class, ClassKind::Interface) => {
            Err(invalid("it is an interface; use `implements`"))
        }
        (ClassKind::Interface, ClassKind::Class) => Err(invalid("it is not an interface")),
        _ => Ok(()),
    }
}
