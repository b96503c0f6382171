use crate::bridge::{maybe_normalize, maybe_translate, maybe_untranslate};
use crate::test_utils::{Failing, Fixture, Tagging};
use crate::{CanonicalMode, Env, Error, Options, Pattern, ScopeTable, Stage, TranslateError};

#[test]
fn translate_off_ignores_ssa() {
    let mut f = Fixture::new();
    let tagging = Tagging::new(&mut f);
    let tree = f.read("(f x)");
    let scope = ScopeTable::new();
    let env = Env::evaluating(&scope);
    let options = Options::new().to_ssa(true);

    let out = maybe_translate(&tagging, &tree, &env, &options).unwrap();

    assert_eq!(out, tree);
}

#[test]
fn translate_on_and_force_behave_alike() {
    let mut f = Fixture::new();
    let tagging = Tagging::new(&mut f);
    let tree = f.read("(f x)");
    let scope = ScopeTable::new();
    let env = Env::evaluating(&scope);

    for mode in [CanonicalMode::On, CanonicalMode::Force] {
        let options = Options::new().to_canonical(mode);
        let out = maybe_translate(&tagging, &tree, &env, &options).unwrap();
        assert_eq!(f.node(&out), "(canon (f x))");

        let out = maybe_translate(&tagging, &tree, &env, &options.to_ssa(true)).unwrap();
        assert_eq!(f.node(&out), "(ssa (canon (f x)))");
    }
}

#[test]
fn only_force_normalizes_pattern_input() {
    let mut f = Fixture::new();
    let tagging = Tagging::new(&mut f);
    let tree = f.read("(f x)");
    let scope = ScopeTable::new();
    let env = Env::matching(&scope);

    let on = Options::new().to_canonical(CanonicalMode::On);
    assert_eq!(maybe_normalize(&tagging, &tree, &env, &on).unwrap(), tree);

    let force = Options::new().to_canonical(CanonicalMode::Force);
    let out = maybe_normalize(&tagging, &tree, &env, &force).unwrap();
    assert_eq!(f.node(&out), "(canon (f x))");
}

#[test]
fn untranslate_runs_for_on_and_force() {
    let scope = ScopeTable::new();
    let env = Env::matching(&scope);
    let pattern = Pattern::Wildcard;

    let off = Options::new();
    assert_eq!(
        maybe_untranslate(&Failing, pattern.clone(), &env, &off).unwrap(),
        pattern
    );

    for mode in [CanonicalMode::On, CanonicalMode::Force] {
        let options = Options::new().to_canonical(mode);
        let err = maybe_untranslate(&Failing, pattern.clone(), &env, &options).unwrap_err();
        assert_eq!(
            err,
            Error::Translate(TranslateError::new(Stage::FromCanonical, "not canonical"))
        );
    }
}

#[test]
fn translation_errors_propagate_verbatim() {
    let mut f = Fixture::new();
    let tree = f.read("(f x)");
    let scope = ScopeTable::new();
    let env = Env::evaluating(&scope);
    let options = Options::new().to_canonical(CanonicalMode::On);

    let err = maybe_translate(&Failing, &tree, &env, &options).unwrap_err();

    insta::assert_snapshot!(err.to_string(), @"canonical translation failed: no canonical form");
}
