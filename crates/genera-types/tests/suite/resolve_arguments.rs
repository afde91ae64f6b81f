use genera_types::{
    resolve_actual_type_argument, resolve_actual_type_argument_classes,
    resolve_actual_type_arguments, ClassDef, ClassId, ClassType, ResolveError, Type, TypeEnv,
    TypeParamDef, TypeStore,
};

use pretty_assertions::assert_eq;

fn class(id: ClassId) -> Type {
    Type::class(id)
}

#[test]
fn non_generic_ancestor_resolves_to_nothing() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let base = env.add_class(ClassDef::class("com.example.Base"));
    let derived = env.add_class(ClassDef::class("com.example.Derived").extends(class(base)));

    assert!(resolve_actual_type_arguments(&env, &class(derived), base).is_empty());
    assert!(resolve_actual_type_arguments(&env, &class(wk.integer), wk.number).is_empty());
    assert!(resolve_actual_type_arguments(&env, &class(wk.string), wk.object).is_empty());
}

#[test]
fn unrelated_types_resolve_to_nothing() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));
    let comparable = env.class_id("java.lang.Comparable").unwrap();

    assert!(resolve_actual_type_arguments(&env, &class(wk.string), boxed).is_empty());
    // `Box` does not implement `Comparable`.
    assert!(resolve_actual_type_arguments(&env, &class(boxed), comparable).is_empty());
}

#[test]
fn direct_parameterization() {
    let mut env = TypeStore::with_builtins();
    let string = env.well_known().string;
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));
    let string_box = env.add_class(
        ClassDef::class("com.example.StringBox")
            .extends(Type::parameterized(boxed, vec![class(string)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(string_box), boxed),
        vec![class(string)]
    );
    assert_eq!(
        resolve_actual_type_argument_classes(&env, &class(string_box), boxed),
        vec![string]
    );
}

#[test]
fn multi_level_inheritance_traces_redeclared_variables() {
    let mut env = TypeStore::with_builtins();
    let integer = env.well_known().integer;

    // class A<T> {}
    let a = env.add_class(ClassDef::class("com.example.A").with_type_params(["T"]));
    // class B<U> extends A<U> {}
    let b = env.intern_class_id("com.example.B");
    env.define_class(
        b,
        ClassDef::class("com.example.B")
            .with_type_params(["U"])
            .extends(Type::parameterized(a, vec![Type::type_var(b, 0)])),
    );
    // class C extends B<Integer> {}
    let c = env.add_class(
        ClassDef::class("com.example.C").extends(Type::parameterized(b, vec![class(integer)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(c), a),
        vec![class(integer)]
    );
    assert_eq!(
        resolve_actual_type_arguments(&env, &class(c), b),
        vec![class(integer)]
    );

    // `B` itself leaves `A.T` bound to its own unresolved `U`.
    assert!(resolve_actual_type_arguments(&env, &class(b), a).is_empty());

    // A parameterized start type supplies the binding directly.
    let long = env.well_known().long;
    let b_long = Type::parameterized(b, vec![class(long)]);
    assert_eq!(resolve_actual_type_arguments(&env, &b_long, a), vec![class(long)]);
}

#[test]
fn multiple_type_parameters_keep_their_positions() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let pair = env.add_class(ClassDef::class("com.example.Pair").with_type_params(["K", "V"]));
    let str_int_pair = env.add_class(ClassDef::class("com.example.StrIntPair").extends(
        Type::parameterized(pair, vec![class(wk.string), class(wk.integer)]),
    ));

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(str_int_pair), pair),
        vec![class(wk.string), class(wk.integer)]
    );

    // class Flipped<X, Y> extends Pair<Y, X> {}
    let flipped = env.intern_class_id("com.example.Flipped");
    env.define_class(
        flipped,
        ClassDef::class("com.example.Flipped")
            .with_type_params(["X", "Y"])
            .extends(Type::parameterized(
                pair,
                vec![Type::type_var(flipped, 1), Type::type_var(flipped, 0)],
            )),
    );
    // class Concrete extends Flipped<String, Integer> {}
    let concrete = env.add_class(ClassDef::class("com.example.Concrete").extends(
        Type::parameterized(flipped, vec![class(wk.string), class(wk.integer)]),
    ));

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(concrete), pair),
        vec![class(wk.integer), class(wk.string)]
    );
}

#[test]
fn resolves_through_generic_interfaces() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let supplier =
        env.add_class(ClassDef::interface("com.example.Supplier").with_type_params(["T"]));
    let string_supplier = env.add_class(
        ClassDef::class("com.example.StringSupplier")
            .implements(Type::parameterized(supplier, vec![class(wk.string)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(string_supplier), supplier),
        vec![class(wk.string)]
    );

    // interface Provider<P> extends Supplier<P> {}
    let provider = env.intern_class_id("com.example.Provider");
    env.define_class(
        provider,
        ClassDef::interface("com.example.Provider")
            .with_type_params(["P"])
            .implements(Type::parameterized(supplier, vec![Type::type_var(provider, 0)])),
    );
    let long_provider = env.add_class(
        ClassDef::class("com.example.LongProvider")
            .implements(Type::parameterized(provider, vec![class(wk.long)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(long_provider), supplier),
        vec![class(wk.long)]
    );
}

#[test]
fn builtin_comparable_bindings() {
    let env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let comparable = env.class_id("java.lang.Comparable").unwrap();

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(wk.integer), comparable),
        vec![class(wk.integer)]
    );
    assert_eq!(
        resolve_actual_type_argument_classes(&env, &class(wk.string), comparable),
        vec![wk.string]
    );
}

#[test]
fn resolution_is_idempotent() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let pair = env.add_class(ClassDef::class("com.example.Pair").with_type_params(["K", "V"]));
    let start = env.add_class(ClassDef::class("com.example.StrIntPair").extends(
        Type::parameterized(pair, vec![class(wk.string), class(wk.integer)]),
    ));

    let first = resolve_actual_type_arguments(&env, &class(start), pair);
    let second = resolve_actual_type_arguments(&env, &class(start), pair);
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn index_accessor_reports_out_of_range() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let pair = env.add_class(ClassDef::class("com.example.Pair").with_type_params(["K", "V"]));
    let start = env.add_class(ClassDef::class("com.example.StrIntPair").extends(
        Type::parameterized(pair, vec![class(wk.string), class(wk.integer)]),
    ));

    assert_eq!(
        resolve_actual_type_argument(&env, &class(start), pair, 0),
        Ok(class(wk.string))
    );
    assert_eq!(
        resolve_actual_type_argument(&env, &class(start), pair, 1),
        Ok(class(wk.integer))
    );
    for index in [2, 3, usize::MAX] {
        assert_eq!(
            resolve_actual_type_argument(&env, &class(start), pair, index),
            Err(ResolveError::IndexOutOfRange { index, len: 2 })
        );
    }

    // Nothing resolves against a non-generic ancestor, so every index is out of range.
    assert_eq!(
        resolve_actual_type_argument(&env, &class(wk.integer), wk.number, 0),
        Err(ResolveError::IndexOutOfRange { index: 0, len: 0 })
    );
}

#[test]
fn index_accessor_rejects_malformed_input() {
    let mut env = TypeStore::with_builtins();
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));
    let missing = ClassId::from_raw(10_000);

    assert!(matches!(
        resolve_actual_type_argument(&env, &class(missing), boxed, 0),
        Err(ResolveError::InvalidArgument(_))
    ));
    assert!(matches!(
        resolve_actual_type_argument(&env, &Type::wildcard(), boxed, 0),
        Err(ResolveError::InvalidArgument(_))
    ));
    assert!(matches!(
        resolve_actual_type_argument(&env, &class(boxed), missing, 0),
        Err(ResolveError::InvalidArgument(_))
    ));
    // The infallible entry point just finds nothing.
    assert!(resolve_actual_type_arguments(&env, &class(missing), boxed).is_empty());
}

#[test]
fn wildcards_leave_gaps() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let pair = env.add_class(ClassDef::class("com.example.Pair").with_type_params(["K", "V"]));
    let wild = env.add_class(ClassDef::class("com.example.WildPair").extends(
        Type::parameterized(
            pair,
            vec![Type::wildcard_extends(class(wk.number)), class(wk.string)],
        ),
    ));

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(wild), pair),
        vec![class(wk.string)]
    );
    // Indices count resolved arguments.
    assert_eq!(
        resolve_actual_type_argument(&env, &class(wild), pair, 0),
        Ok(class(wk.string))
    );
}

#[test]
fn raw_supertypes_leave_parameters_unresolved() {
    let mut env = TypeStore::with_builtins();
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));
    let raw_box = env.add_class(ClassDef::class("com.example.RawBox").extends(class(boxed)));

    assert!(resolve_actual_type_arguments(&env, &class(raw_box), boxed).is_empty());
    assert!(resolve_actual_type_arguments(&env, &class(boxed), boxed).is_empty());
}

#[test]
fn variables_are_identified_by_owner_not_name() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();

    // class First<T> {}
    let first = env.add_class(ClassDef::class("com.example.First").with_type_params(["T"]));
    // class Second<T> extends First<Integer> {}
    let second = env.add_class(
        ClassDef::class("com.example.Second")
            .with_type_params(["T"])
            .extends(Type::parameterized(first, vec![class(wk.integer)])),
    );
    // class Third extends Second<String> {}
    let third = env.add_class(
        ClassDef::class("com.example.Third")
            .extends(Type::parameterized(second, vec![class(wk.string)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(third), first),
        vec![class(wk.integer)]
    );
    assert_eq!(
        resolve_actual_type_arguments(&env, &class(third), second),
        vec![class(wk.string)]
    );
}

#[test]
fn nested_arguments_are_substituted() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let list = env.add_class(ClassDef::interface("java.util.List").with_type_params(["E"]));
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));

    // class ListBox<E> extends Box<List<E>> {}
    let list_box = env.intern_class_id("com.example.ListBox");
    env.define_class(
        list_box,
        ClassDef::class("com.example.ListBox")
            .with_type_params(["E"])
            .extends(Type::parameterized(
                boxed,
                vec![Type::parameterized(list, vec![Type::type_var(list_box, 0)])],
            )),
    );
    // class StringListBox extends ListBox<String> {}
    let string_list_box = env.add_class(
        ClassDef::class("com.example.StringListBox")
            .extends(Type::parameterized(list_box, vec![class(wk.string)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(string_list_box), boxed),
        vec![Type::parameterized(list, vec![class(wk.string)])]
    );
    assert_eq!(
        resolve_actual_type_argument_classes(&env, &class(string_list_box), boxed),
        vec![list]
    );

    // Seen from the raw `ListBox`, the nested variable stays in place.
    assert_eq!(
        resolve_actual_type_arguments(&env, &class(list_box), boxed),
        vec![Type::parameterized(list, vec![Type::type_var(list_box, 0)])]
    );
}

#[test]
fn first_discovered_binding_wins() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let supplier =
        env.add_class(ClassDef::interface("com.example.Supplier").with_type_params(["T"]));

    // class Base implements Supplier<String> {}
    let base = env.add_class(
        ClassDef::class("com.example.Base")
            .implements(Type::parameterized(supplier, vec![class(wk.string)])),
    );
    // class Derived extends Base implements Supplier<Integer> {}
    let derived = env.add_class(
        ClassDef::class("com.example.Derived")
            .extends(class(base))
            .implements(Type::parameterized(supplier, vec![class(wk.integer)])),
    );

    // Pre-order walk: Base, Supplier<String>, Supplier<Integer>.
    assert_eq!(
        resolve_actual_type_arguments(&env, &class(derived), supplier),
        vec![class(wk.string)]
    );
}

#[test]
fn unresolvable_candidates_fall_through_to_later_bindings() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let supplier =
        env.add_class(ClassDef::interface("com.example.Supplier").with_type_params(["T"]));

    // class Base<Q> implements Supplier<Q> {}
    let base = env.intern_class_id("com.example.Base");
    env.define_class(
        base,
        ClassDef::class("com.example.Base")
            .with_type_params(["Q"])
            .implements(Type::parameterized(supplier, vec![Type::type_var(base, 0)])),
    );
    // class Derived extends Base /* raw */ implements Supplier<Integer> {}
    let derived = env.add_class(
        ClassDef::class("com.example.Derived")
            .extends(class(base))
            .implements(Type::parameterized(supplier, vec![class(wk.integer)])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(derived), supplier),
        vec![class(wk.integer)]
    );
}

#[test]
fn type_variable_start_uses_its_bound() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));
    let string_box = env.add_class(
        ClassDef::class("com.example.StringBox")
            .extends(Type::parameterized(boxed, vec![class(wk.string)])),
    );

    // class Holder<H extends StringBox, F> {}
    let holder = env.add_class(ClassDef {
        type_params: vec![
            TypeParamDef::bounded("H", class(string_box)),
            TypeParamDef::new("F"),
        ],
        ..ClassDef::class("com.example.Holder")
    });

    assert_eq!(
        resolve_actual_type_arguments(&env, &Type::type_var(holder, 0), boxed),
        vec![class(wk.string)]
    );
    assert!(resolve_actual_type_arguments(&env, &Type::type_var(holder, 1), boxed).is_empty());
}

#[test]
fn array_arguments() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let boxed = env.add_class(ClassDef::class("com.example.Box").with_type_params(["T"]));
    let array_box = env.add_class(
        ClassDef::class("com.example.ArrayBox")
            .extends(Type::parameterized(boxed, vec![Type::array(class(wk.string))])),
    );

    assert_eq!(
        resolve_actual_type_arguments(&env, &class(array_box), boxed),
        vec![Type::array(class(wk.string))]
    );
    assert!(resolve_actual_type_argument_classes(&env, &class(array_box), boxed).is_empty());
}

#[test]
fn mismatched_argument_counts_do_not_match() {
    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let pair = env.add_class(ClassDef::class("com.example.Pair").with_type_params(["K", "V"]));
    let broken = env.add_class(ClassDef::class("com.example.Broken").extends(
        Type::Parameterized(ClassType {
            def: pair,
            args: vec![class(wk.string)],
        }),
    ));

    assert!(resolve_actual_type_arguments(&env, &class(broken), pair).is_empty());
}

#[test]
fn shared_store_resolves_concurrently() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TypeStore>();

    let mut env = TypeStore::with_builtins();
    let wk = *env.well_known();
    let pair = env.add_class(ClassDef::class("com.example.Pair").with_type_params(["K", "V"]));
    // class Flipped<X, Y> extends Pair<Y, X> {}
    let flipped = env.intern_class_id("com.example.Flipped");
    env.define_class(
        flipped,
        ClassDef::class("com.example.Flipped")
            .with_type_params(["X", "Y"])
            .extends(Type::parameterized(
                pair,
                vec![Type::type_var(flipped, 1), Type::type_var(flipped, 0)],
            )),
    );
    let entry = env.add_class(
        ClassDef::class("com.example.Entry").extends(Type::parameterized(
            flipped,
            vec![class(wk.string), Type::array(class(wk.integer))],
        )),
    );

    let expected = vec![Type::array(class(wk.integer)), class(wk.string)];
    let env = &env;
    let results: Vec<Vec<Type>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(move || resolve_actual_type_arguments(env, &class(entry), pair)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("resolver thread panicked"))
            .collect()
    });

    assert_eq!(results.len(), 8);
    for result in results {
        assert_eq!(result, expected);
    }
}
