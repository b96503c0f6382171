use quasi_core::{Metadata, Node, Scalar};

use crate::test_utils::Fixture;
use crate::{Binding, MetaPattern, Pattern};

#[test]
fn code_pattern_binds_variables() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("(+ x y)"));
    let subject = f.read("(+ #line=7 1 (* 2 3))");

    let bindings = pattern.matches(&subject).unwrap();

    let x = f.ident("x");
    let y = f.ident("y");
    assert_eq!(bindings.tree(&x), Some(&Node::int(1)));
    assert_eq!(bindings.tree(&y).map(|n| f.node(n)), Some("(* 2 3)".to_owned()));
}

#[test]
fn operator_and_arity_must_agree() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("(+ x y)"));

    assert!(pattern.matches(&f.read("(- 1 2)")).is_none());
    assert!(pattern.matches(&f.read("(+ 1)")).is_none());
    assert!(pattern.matches(&f.read("(+ 1 2 3)")).is_none());
}

#[test]
fn metadata_never_matters() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("(f #line=1 1 :a)"));

    assert!(pattern.matches(&f.read("(f #line=99 #hint=true 1 :a)")).is_some());
}

#[test]
fn wildcard_binds_nothing() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("[_ _]"));

    let bindings = pattern.matches(&f.read("[1 2]")).unwrap();

    assert!(bindings.is_empty());
}

#[test]
fn repeated_binder_needs_same_shape() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("(= x x)"));

    assert!(pattern.matches(&f.read("(= (g #line=1 a) (g #line=2 a))")).is_some());
    assert!(pattern.matches(&f.read("(= (g a) (g b))")).is_none());
}

#[test]
fn identifier_pattern_matches_exact_reference() {
    let mut f = Fixture::new();
    let ident = f.ident("x@Mod");
    let pattern = Pattern::Ident(ident);

    assert!(pattern.matches(&f.read("x@Mod #line=3")).is_some());
    assert!(pattern.matches(&f.read("x")).is_none());
    assert!(pattern.matches(&f.read("y@Mod")).is_none());
}

#[test]
fn sequence_tail_captures_remainder() {
    let mut f = Fixture::new();
    let a = f.ident("a");
    let rest = f.ident("rest");
    let pattern = Pattern::List {
        items: vec![Pattern::Bind(a)],
        tail: Some(Box::new(Pattern::Bind(rest))),
    };

    let bindings = pattern.matches(&f.read("[1 2 3]")).unwrap();
    assert_eq!(bindings.tree(&a), Some(&Node::int(1)));
    assert_eq!(
        bindings.tree(&rest),
        Some(&Node::list(vec![Node::int(2), Node::int(3)]))
    );

    let bindings = pattern.matches(&f.read("[1]")).unwrap();
    assert_eq!(bindings.tree(&rest), Some(&Node::list(vec![])));

    assert!(pattern.matches(&f.read("[]")).is_none());
}

#[test]
fn sequence_tail_sees_improper_tail() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("[a | t]"));
    let t = f.ident("t");

    let bindings = pattern.matches(&f.read("[1 | 2]")).unwrap();
    assert_eq!(bindings.tree(&t), Some(&Node::int(2)));

    let bindings = pattern.matches(&f.read("[1 2 | 3]")).unwrap();
    assert_eq!(bindings.tree(&t).map(|n| f.node(n)), Some("[2 | 3]".to_owned()));
}

#[test]
fn proper_pattern_rejects_improper_subject() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("[a b]"));

    assert!(pattern.matches(&f.read("[1 2 | 3]")).is_none());
}

#[test]
fn operator_and_metadata_binders() {
    let mut f = Fixture::new();
    let op = f.ident("op");
    let meta = f.ident("m");
    let args = f.ident("args");
    let pattern = Pattern::Op {
        operator: Box::new(Pattern::Bind(op)),
        meta: MetaPattern::Bind(meta),
        args: Box::new(Pattern::Bind(args)),
    };

    let bindings = pattern.matches(&f.read("(call #line=5 f 1)")).unwrap();

    let call = f.sym("call");
    assert_eq!(bindings.tree(&op), Some(&Node::atom(call)));
    assert_eq!(bindings.get(&meta), Some(&Binding::Meta(Metadata::at_line(5))));
    assert_eq!(bindings.tree(&args).map(|n| f.node(n)), Some("[f 1]".to_owned()));
    assert_eq!(bindings.tree(&meta), None);
}

#[test]
fn pairs_and_scalars() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read(r#"{:ok "done"}"#));

    assert!(pattern.matches(&f.read(r#"{:ok "done"}"#)).is_some());
    assert!(pattern.matches(&f.read(r#"{:error "done"}"#)).is_none());
    assert!(
        Pattern::Lit(Scalar::Int(1))
            .matches(&Node::scalar(Scalar::Float(1.0)))
            .is_none()
    );
}

#[test]
fn binders_in_first_occurrence_order() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("(f b [a b | c] _)"));

    let names: Vec<_> = pattern
        .binders()
        .into_iter()
        .map(|ident| f.interner.resolve(ident.name).to_owned())
        .collect();

    assert_eq!(names, ["b", "a", "c"]);
}

#[test]
fn plain_name_lookup() {
    let mut f = Fixture::new();
    let pattern = Pattern::from_code(&f.read("[x]"));
    let x = f.sym("x");

    let bindings = pattern.matches(&f.read("[:v]")).unwrap();

    let v = f.sym("v");
    assert_eq!(bindings.tree_named(x), Some(&Node::atom(v)));
}
