use sfc::block::AttrValue;
use sfc::parser::attributes::parse_attributes;
use sfc::position::LineIndex;

fn value(s: &str) -> AttrValue {
    AttrValue::from(s)
}

#[test]
fn quoted_and_bare_attributes() {
    let attrs = parse_attributes(r#" lang="ts" src='./a.ts' setup"#);
    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs["lang"], value("ts"));
    assert_eq!(attrs["src"], value("./a.ts"));
    assert!(attrs["setup"].is_flag());
}

#[test]
fn whitespace_is_insignificant() {
    let attrs = parse_attributes("\n\tlang = \"scss\"\n   scoped  ");
    assert_eq!(attrs["lang"], value("scss"));
    assert_eq!(attrs["scoped"], AttrValue::Flag(true));
}

#[test]
fn unquoted_values_are_strings() {
    let attrs = parse_attributes(" lang=ts scoped");
    assert_eq!(attrs["lang"], value("ts"));
    assert_eq!(attrs["scoped"], AttrValue::Flag(true));
}

#[test]
fn last_duplicate_wins() {
    let attrs = parse_attributes(r#" lang="a" lang="b""#);
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs["lang"], value("b"));
}

#[test]
fn empty_quoted_value_is_a_string() {
    let attrs = parse_attributes(r#" module="""#);
    assert_eq!(attrs["module"], value(""));
}

#[test]
fn unterminated_quote_runs_to_the_end() {
    let attrs = parse_attributes(r#" title="never closed scoped"#);
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs["title"], value("never closed scoped"));
}

#[test]
fn stray_syntax_is_skipped() {
    let attrs = parse_attributes(" = / scoped =");
    assert_eq!(attrs.len(), 1);
    assert!(attrs["scoped"].is_flag());
}

#[test]
fn quoted_value_may_contain_other_quotes() {
    let attrs = parse_attributes(r#" data-x='say "hi"' data-y="it's""#);
    assert_eq!(attrs["data-x"], value(r#"say "hi""#));
    assert_eq!(attrs["data-y"], value("it's"));
}

#[test]
fn empty_text_has_no_attributes() {
    assert!(parse_attributes("").is_empty());
    assert!(parse_attributes("   ").is_empty());
}

#[test]
fn line_index_positions() {
    let source = "ab\ncd\n\né!";
    let index = LineIndex::new(source);

    assert_eq!(index.line_count(), 4);
    let pos = index.position(0);
    assert_eq!((pos.line, pos.column), (1, 1));
    let pos = index.position(4);
    assert_eq!((pos.line, pos.column), (2, 2));
    let pos = index.position(6);
    assert_eq!((pos.line, pos.column), (3, 1));
    // `!` follows a two-byte character.
    let pos = index.position(9);
    assert_eq!((pos.line, pos.column), (4, 2));
    assert_eq!(index.line_start(3), Some(7));
}

#[test]
fn line_index_clamps_out_of_range_offsets() {
    let source = "é";
    let index = LineIndex::new(source);

    assert_eq!(index.position(1).offset, 0);
    assert_eq!(index.position(100).offset, 2);
    assert_eq!(index.position(100).column, 2);
}
