use indoc::indoc;
use quasi_core::{Metadata, Symbol};

use crate::test_utils::Fixture;
use crate::{
    Error, EscapeOptions, Escaped, Marker, NoExpand, Pattern, Result, ScopeTable, SpecialForm,
    escape, resolve, to_pattern, to_template,
};

fn pattern(f: &mut Fixture, source: &str) -> Result<Pattern> {
    let tree = f.read(source);
    let escaped = resolve(escape(&tree, EscapeOptions::new()), None);
    to_pattern(&escaped, &NoExpand)
}

fn rendered_pattern(f: &mut Fixture, source: &str) -> String {
    let pattern = pattern(f, source).unwrap();
    f.render(&pattern)
}

fn isolated_pattern(f: &mut Fixture, source: &str) -> String {
    let tree = f.read(source);
    let escaped = escape(&tree, EscapeOptions::new());
    let pattern = to_pattern(&escaped, &NoExpand).unwrap();
    f.render(&pattern)
}

#[test]
fn classify_recognizes_marker_forms() {
    let mut f = Fixture::new();
    let quote1 = escape(&f.read("(unquote x)"), EscapeOptions::new());
    let quote3 = escape(&f.read("(unquote o m [a])"), EscapeOptions::new());
    let splice = escape(&f.read("(unquote_splicing [a b])"), EscapeOptions::new());
    let generic = escape(&f.read("(f x)"), EscapeOptions::new());

    assert!(matches!(
        SpecialForm::classify(&quote1),
        Ok(SpecialForm::InlineQuote(_))
    ));
    assert!(matches!(
        SpecialForm::classify(&quote3),
        Ok(SpecialForm::InlineQuoteOp { .. })
    ));
    assert!(matches!(
        SpecialForm::classify(&splice),
        Ok(SpecialForm::Splice { items, tail: None }) if items.len() == 2
    ));
    assert_eq!(SpecialForm::classify(&generic), Ok(SpecialForm::Generic));
}

#[test]
fn generic_operation_wildcards_metadata() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(rendered_pattern(&mut f, "(+ #line=2 x 1)"), @"(+ ?x 1)");
}

#[test]
fn metadata_differences_do_not_change_pattern() {
    let mut f = Fixture::new();
    let a = pattern(&mut f, "(f #line=1 x #line=1 [y #col=2])").unwrap();
    let b = pattern(&mut f, "(f #line=8 x [y])").unwrap();

    assert_eq!(a, b);
}

#[test]
fn underscore_is_a_wildcard() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(rendered_pattern(&mut f, "{_ [x _]}"), @"{_ [?x _]}");
}

#[test]
fn inert_variables_match_literally() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(isolated_pattern(&mut f, "(f x y@Mod)"), @"(f 'x 'y@Mod)");
}

#[test]
fn inline_quote_reads_argument_as_code() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(
        isolated_pattern(&mut f, "(f x (unquote (g y)))"),
        @"(f 'x (g ?y))"
    );
}

#[test]
fn inline_quote_with_explicit_parts() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(
        rendered_pattern(&mut f, "(unquote op m [a b])"),
        @"(?op #?m ?a ?b)"
    );
    insta::assert_snapshot!(
        rendered_pattern(&mut f, "(unquote :call _ args)"),
        @"(call | ?args)"
    );
}

#[test]
fn inline_quote_rejects_bad_parts() {
    let mut f = Fixture::new();

    let err = pattern(&mut f, "(unquote #line=6 1 _ [])").unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape { line: Some(6), .. }));

    let err = pattern(&mut f, "(unquote o :m [])").unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape { .. }));

    let err = pattern(&mut f, "(unquote o _ 3)").unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape { .. }));
}

#[test]
fn inline_quote_arity_outside_one_or_three() {
    let mut f = Fixture::new();

    let err = pattern(&mut f, "(f (unquote #line=4 a b))").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"malformed `unquote` marker: expected 1 or 3 arguments, got 2 argument(s) (line 4)"
    );

    let err = pattern(&mut f, "(unquote)").unwrap_err();
    assert_eq!(
        err,
        Error::MalformedMarker {
            marker: Marker::Unquote,
            arity: 0,
            line: None
        }
    );
}

#[test]
fn splice_arity_is_checked() {
    let mut f = Fixture::new();

    for (source, arity) in [
        ("(unquote_splicing)", 0),
        ("(unquote_splicing [a] [b])", 2),
        ("(unquote_splicing a)", 1),
    ] {
        let err = pattern(&mut f, source).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedMarker {
                marker: Marker::UnquoteSplicing,
                arity,
                line: None
            },
            "{source}"
        );
    }

    let err = pattern(&mut f, "(f (unquote_splicing #line=2 a))").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"malformed `unquote_splicing` marker: expected exactly one list argument, got 1 argument(s) (line 2)"
    );
}

#[test]
fn splice_builds_open_sequence() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(
        rendered_pattern(&mut f, "(unquote_splicing [a b])"),
        @"[?a ?b | _]"
    );
}

#[test]
fn splice_improper_tail_captures_rest() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(
        rendered_pattern(&mut f, "[h (unquote_splicing [a | rest])]"),
        @"[?h ?a | ?rest]"
    );
}

#[test]
fn trailing_splice_extends_arguments() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(
        rendered_pattern(&mut f, "(f x (unquote_splicing [a b]))"),
        @"(f ?x ?a ?b | _)"
    );
}

#[test]
fn non_trailing_splice_nests() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(
        rendered_pattern(&mut f, "[(unquote_splicing [a]) b]"),
        @"[[?a | _] ?b]"
    );
}

#[test]
fn improper_list_tail_becomes_pattern_tail() {
    let mut f = Fixture::new();

    insta::assert_snapshot!(rendered_pattern(&mut f, "[a b | c]"), @"[?a ?b | ?c]");
}

#[test]
fn template_mirrors_resolved_tree() {
    let mut f = Fixture::new();
    let tree = f.read(indoc! {"
        (f #line=1
           x
           y
           (unquote (g z))
           [1 {:k x}])
    "});
    let scope = ScopeTable::new().with(f.ident("x"), 1);

    let escaped = escape(&tree, EscapeOptions::new().unquote(true));
    let template = to_template(&resolve(escaped, Some(&scope))).unwrap();

    insta::assert_snapshot!(f.render(&template), @"(f #line=1 x 'y ~(g z) [1 {:k x}])");
}

#[test]
fn template_rejects_malformed_raw_marker() {
    let escaped = Escaped::Op {
        operator: Symbol::RAW,
        meta: Metadata::new(),
        args: vec![],
    };

    assert!(matches!(
        to_template(&escaped),
        Err(Error::UnsupportedShape { .. })
    ));
}
