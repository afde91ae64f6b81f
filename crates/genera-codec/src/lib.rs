#![forbid(unsafe_code)]

//! Serializer and deserializer registries keyed by resolved type arguments.
//!
//! An implementation class declares what it handles by implementing a role interface:
//!
//! ```text
//! class PointDeserializer implements genera.codec.Deserializer<com.example.Point>
//! ```
//!
//! Registering `PointDeserializer` resolves the role's `T` (here `Point`) and files the
//! implementation under it. The argument may be bound anywhere in the hierarchy, e.g. through
//! an abstract `JsonDeserializer<T> implements Deserializer<T>` base class.

use std::fmt;
use std::marker::PhantomData;

use genera_types::{
    format_type, is_assignable, raw_type_of, resolve_actual_type_argument, ClassDef, ClassId,
    Type, TypeEnv, TypeStore,
};
use indexmap::IndexMap;
use thiserror::Error;

/// A role interface: a single-parameter generic interface whose argument keys a registry.
pub trait CodecRole {
    /// Human-readable role name used in errors and logs.
    const KIND: &'static str;
    /// Fully qualified name of the role interface.
    const INTERFACE: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializerRole {}

impl CodecRole for SerializerRole {
    const KIND: &'static str = "serializer";
    const INTERFACE: &'static str = "genera.codec.Serializer";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeserializerRole {}

impl CodecRole for DeserializerRole {
    const KIND: &'static str = "deserializer";
    const INTERFACE: &'static str = "genera.codec.Deserializer";
}

pub type SerializerRegistry = CodecRegistry<SerializerRole>;
pub type DeserializerRegistry = CodecRegistry<DeserializerRole>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("role interface `{0}` is not registered")]
    MissingRole(&'static str),
    #[error("unknown class {0:?}")]
    UnknownClass(ClassId),
    #[error("`{class}` does not implement `{interface}`")]
    NotARole {
        class: String,
        interface: &'static str,
    },
    #[error("cannot determine which type {kind} `{class}` handles")]
    Unresolved { kind: &'static str, class: String },
    #[error("duplicate {kind} for `{key}`: `{existing}` is already registered, `{rejected}` ignored")]
    Duplicate {
        kind: &'static str,
        key: String,
        existing: String,
        rejected: String,
    },
}

/// Define `genera.codec.Serializer<T>` and `genera.codec.Deserializer<T>` in `store` unless
/// they already exist.
pub fn install_role_interfaces(store: &mut TypeStore) {
    for name in [SerializerRole::INTERFACE, DeserializerRole::INTERFACE] {
        let defined = store.class_id(name).is_some_and(|id| store.is_defined(id));
        if !defined {
            store.add_class(ClassDef::interface(name).with_type_params(["T"]));
        }
    }
}

/// Implementation classes keyed by the type they handle, in registration order.
pub struct CodecRegistry<R> {
    role: ClassId,
    handlers: IndexMap<Type, ClassId>,
    _role: PhantomData<R>,
}

impl<R> fmt::Debug for CodecRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("role", &self.role)
            .field("handlers", &self.handlers)
            .finish()
    }
}

impl<R: CodecRole> CodecRegistry<R> {
    pub fn new(env: &dyn TypeEnv) -> Result<Self, CodecError> {
        let role = env
            .lookup_class(R::INTERFACE)
            .filter(|id| env.class(*id).is_some())
            .ok_or(CodecError::MissingRole(R::INTERFACE))?;
        Ok(Self {
            role,
            handlers: IndexMap::new(),
            _role: PhantomData,
        })
    }

    /// The role interface this registry resolves against.
    pub fn role(&self) -> ClassId {
        self.role
    }

    /// Register `implementation` under the type it handles and return that type.
    ///
    /// The first registration for a type wins; later ones are rejected with
    /// [`CodecError::Duplicate`] and leave the registry unchanged.
    pub fn register(
        &mut self,
        env: &dyn TypeEnv,
        implementation: ClassId,
    ) -> Result<Type, CodecError> {
        let def = env
            .class(implementation)
            .ok_or(CodecError::UnknownClass(implementation))?;
        let start = Type::class(implementation);
        if !is_assignable(env, self.role, &start) {
            return Err(CodecError::NotARole {
                class: def.name.clone(),
                interface: R::INTERFACE,
            });
        }

        let key = resolve_actual_type_argument(env, &start, self.role, 0).map_err(|_| {
            CodecError::Unresolved {
                kind: R::KIND,
                class: def.name.clone(),
            }
        })?;

        if let Some(existing) = self.handlers.get(&key) {
            return Err(CodecError::Duplicate {
                kind: R::KIND,
                key: format_type(env, &key),
                existing: class_name(env, *existing),
                rejected: def.name.clone(),
            });
        }

        tracing::debug!(
            kind = R::KIND,
            implementation = %def.name,
            handles = %format_type(env, &key),
            "registered codec"
        );
        self.handlers.insert(key.clone(), implementation);
        Ok(key)
    }

    /// Handler registered for exactly `target`, else for its raw class.
    pub fn find(&self, target: &Type) -> Option<ClassId> {
        self.handlers
            .get(target)
            .or_else(|| self.handlers.get(&raw_type_of(target)))
            .copied()
    }

    /// [`Self::find`], falling back to the first registered handler whose key class `target`
    /// is assignable to.
    pub fn find_assignable(&self, env: &dyn TypeEnv, target: &Type) -> Option<ClassId> {
        self.find(target).or_else(|| {
            self.handlers
                .iter()
                .find(|(key, _)| key.class_id().is_some_and(|id| is_assignable(env, id, target)))
                .map(|(_, implementation)| *implementation)
        })
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// `(handled type, implementation)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Type, ClassId)> + '_ {
        self.handlers.iter().map(|(key, id)| (key, *id))
    }
}

fn class_name(env: &dyn TypeEnv, id: ClassId) -> String {
    env.class(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| format!("{id:?}"))
}
