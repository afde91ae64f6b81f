use std::collections::HashMap;

use crate::{ClassDef, ClassId, Type, TypeEnv, TypeParamDef, WellKnownTypes};

/// In-memory [`TypeEnv`].
///
/// Class ids are allocated in registration order. A name can be interned before its definition
/// is known (see [`TypeStore::intern_class_id`]) so that mutually-referencing classes can be
/// registered in two passes.
#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<Option<ClassDef>>,
    names: Vec<String>,
    by_name: HashMap<String, ClassId>,
    well_known: WellKnownTypes,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeStore {
    /// A store holding the root type and a few boxed scalar types:
    ///
    /// ```text
    /// java.lang.Object
    /// java.lang.Comparable<T>                  (interface)
    /// java.lang.CharSequence                   (interface)
    /// java.lang.Number
    /// java.lang.String  implements CharSequence, Comparable<String>
    /// java.lang.Integer extends Number implements Comparable<Integer>
    /// java.lang.Long    extends Number implements Comparable<Long>
    /// java.lang.Double  extends Number implements Comparable<Double>
    /// java.lang.Boolean implements Comparable<Boolean>
    /// ```
    pub fn with_builtins() -> Self {
        let mut classes = Vec::new();
        let mut names = Vec::new();
        let mut by_name = HashMap::new();

        let mut reserve = |name: &str| {
            let id = ClassId(classes.len() as u32);
            classes.push(None);
            names.push(name.to_string());
            by_name.insert(name.to_string(), id);
            id
        };

        let object = reserve("java.lang.Object");
        let comparable = reserve("java.lang.Comparable");
        let char_sequence = reserve("java.lang.CharSequence");
        let number = reserve("java.lang.Number");
        let string = reserve("java.lang.String");
        let integer = reserve("java.lang.Integer");
        let long = reserve("java.lang.Long");
        let double = reserve("java.lang.Double");
        let boolean = reserve("java.lang.Boolean");

        let mut store = Self {
            classes,
            names,
            by_name,
            well_known: WellKnownTypes {
                object,
                string,
                integer,
                long,
                double,
                boolean,
                number,
            },
        };

        let object_ty = Type::class(object);
        let comparable_of = |id| Type::parameterized(comparable, vec![Type::class(id)]);

        store.define_class(object, ClassDef::class("java.lang.Object"));
        store.define_class(
            comparable,
            ClassDef::interface("java.lang.Comparable").with_type_params(["T"]),
        );
        store.define_class(char_sequence, ClassDef::interface("java.lang.CharSequence"));
        store.define_class(
            number,
            ClassDef::class("java.lang.Number").extends(object_ty.clone()),
        );
        store.define_class(
            string,
            ClassDef::class("java.lang.String")
                .extends(object_ty.clone())
                .implements(Type::class(char_sequence))
                .implements(comparable_of(string)),
        );
        for id in [integer, long, double] {
            let name = store.names[id.index()].clone();
            store.define_class(
                id,
                ClassDef::class(name)
                    .extends(Type::class(number))
                    .implements(comparable_of(id)),
            );
        }
        store.define_class(
            boolean,
            ClassDef::class("java.lang.Boolean")
                .extends(object_ty)
                .implements(comparable_of(boolean)),
        );

        store
    }

    /// Return the id for `name`, allocating an (undefined) slot if the name is new.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(None);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Install (or replace) the definition for an interned id.
    ///
    /// The definition's `name` wins over the interned one if they differ; the old name keeps
    /// resolving to `id`. Ids this store never allocated are ignored.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let idx = id.index();
        if idx >= self.classes.len() {
            tracing::debug!(
                class = ?id,
                name = %def.name,
                "ignoring definition for unknown class id"
            );
            return;
        }
        if self.names[idx] != def.name {
            self.by_name.insert(def.name.clone(), id);
            self.names[idx] = def.name.clone();
        }
        self.classes[idx] = Some(def);
    }

    /// Intern and define in one step.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn is_defined(&self, id: ClassId) -> bool {
        matches!(self.classes.get(id.index()), Some(Some(_)))
    }

    /// Name recorded for `id`, whether or not it has been defined yet.
    pub fn class_name(&self, id: ClassId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Defined classes in registration order.
    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .filter_map(|(idx, def)| def.as_ref().map(|def| (ClassId(idx as u32), def)))
    }

    /// Ids of every interned class whose simple name (the segment after the last `.`) is
    /// `simple`, in registration order.
    pub fn classes_with_simple_name(&self, simple: &str) -> Vec<ClassId> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| name.rsplit('.').next() == Some(simple))
            .map(|(idx, _)| ClassId(idx as u32))
            .collect()
    }

    /// The type variable `owner` declares under `name`.
    pub fn type_var(&self, owner: ClassId, name: &str) -> Option<Type> {
        let def = self.class(owner)?;
        let index = def.type_params.iter().position(|tp| tp.name == name)?;
        Some(Type::type_var(owner, index as u32))
    }

    /// Replace the type parameter list of an already-defined class.
    ///
    /// Used by loaders that need the variables to exist before their bounds can be built.
    /// Unknown or undefined ids are ignored.
    pub fn set_type_params(&mut self, id: ClassId, params: Vec<TypeParamDef>) {
        if let Some(Some(def)) = self.classes.get_mut(id.index()) {
            def.type_params = params;
        }
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.index())?.as_ref()
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        self.class_id(name)
    }

    fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }
}
