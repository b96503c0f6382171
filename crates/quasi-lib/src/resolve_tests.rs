use quasi_core::{Ident, Metadata, VarRef};

use crate::test_utils::Fixture;
use crate::{EscapeOptions, Escaped, ScopeTable, escape, maybe_unescape, resolve};

fn escaped_var(f: &mut Fixture, text: &str) -> Escaped {
    let ident = f.ident(text);
    let var = VarRef::new(ident.name, ident.context);
    Escaped::raw_var(&var, Metadata::new())
}

#[test]
fn pattern_rule_always_revives() {
    let mut f = Fixture::new();
    let raw = escaped_var(&mut f, "x@Mod");
    let x = f.ident("x@Mod");

    let resolved = maybe_unescape(raw, None);

    assert_eq!(resolved, Escaped::Var(VarRef::new(x.name, x.context)));
}

#[test]
fn template_rule_revives_exact_match() {
    let mut f = Fixture::new();
    let raw = escaped_var(&mut f, "x@Mod");
    let x = f.ident("x@Mod");
    let scope = ScopeTable::new().with(x, 1);

    let resolved = maybe_unescape(raw, Some(&scope));

    assert_eq!(resolved, Escaped::Var(VarRef::new(x.name, x.context)));
}

// The `(name, nil)` fallback drops the reference's context. Whether that
// generalization is intended is unresolved; this pins the current rule.
#[test]
fn template_rule_falls_back_to_plain_name_and_drops_context() {
    let mut f = Fixture::new();
    let raw = escaped_var(&mut f, "x@Mod");
    let x = f.ident("x");
    let scope = ScopeTable::new().with(x, 1);

    let resolved = maybe_unescape(raw, Some(&scope));

    assert_eq!(resolved, Escaped::Var(VarRef::new(x.name, None)));
}

#[test]
fn template_rule_does_not_match_other_contexts() {
    let mut f = Fixture::new();
    let raw = escaped_var(&mut f, "x");
    let other = f.ident("x@Other");
    let scope = ScopeTable::new().with(other, 1);

    let resolved = maybe_unescape(raw.clone(), Some(&scope));

    assert_eq!(resolved, raw);
}

#[test]
fn template_rule_leaves_unbound_inert() {
    let mut f = Fixture::new();
    let raw = escaped_var(&mut f, "y");
    let x = f.ident("x");
    let scope = ScopeTable::new().with(x, 3);

    let resolved = maybe_unescape(raw.clone(), Some(&scope));

    assert_eq!(resolved, raw);
}

#[test]
fn non_variables_pass_through() {
    let mut f = Fixture::new();
    let tree = f.read("(f 1 [2])");
    let escaped = escape(&tree, EscapeOptions::new());

    assert_eq!(maybe_unescape(escaped.clone(), None), escaped);
}

#[test]
fn resolve_rewrites_depth_first() {
    let mut f = Fixture::new();
    let tree = f.read("(f x [y {z x}] (g w))");
    let scope: ScopeTable = [(f.ident("x"), 1), (f.ident("z"), 2)].into_iter().collect();

    let escaped = escape(&tree, EscapeOptions::new());
    let resolved = resolve(escaped, Some(&scope));

    insta::assert_snapshot!(
        f.render(&resolved),
        @"(f x [(__raw__ :y nil) {z x}] (g (__raw__ :w nil)))"
    );
}

#[test]
fn resolve_without_scope_revives_everything() {
    let mut f = Fixture::new();
    let tree = f.read("[a {b c@K} | d]");

    let resolved = resolve(escape(&tree, EscapeOptions::new()), None);

    insta::assert_snapshot!(f.render(&resolved), @"[a {b c@K} | d]");
}

#[test]
fn scope_table_versions() {
    let mut f = Fixture::new();
    let x = f.ident("x");
    let mut scope = ScopeTable::new();

    assert!(scope.is_empty());
    assert_eq!(scope.insert(x, 1), None);
    assert_eq!(scope.insert(x, 2), Some(1));
    assert_eq!(scope.version(&x), Some(2));
    assert_eq!(scope.version(&Ident::new(x.name, Some(x.name))), None);
    assert_eq!(scope.len(), 1);
    assert_eq!(scope.iter().collect::<Vec<_>>(), vec![(&x, 2)]);
}
