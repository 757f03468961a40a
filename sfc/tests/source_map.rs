use sfc::pad::PadMode;
use sfc::position::Position;
use sfc::{MapOptions, ParseOptions, ParseResult};

const SOURCE: &str = "<script>\n  export default {}\n</script>\n<style>\n  h1 { color: red }\n</style>";

fn split_with_map(source: &str, pad: PadMode) -> ParseResult {
    sfc::parse(
        source,
        &ParseOptions {
            pad,
            map: Some(MapOptions::new("test.vue")),
        },
    )
}

#[test]
fn map_without_padding_points_at_document_lines() {
    let res = split_with_map(SOURCE, PadMode::None);

    let script_map = res.script.as_ref().unwrap().map.as_ref().unwrap();
    let pos = script_map.original_position_for(2, 1).unwrap();
    assert_eq!(pos.line, 2);
    assert_eq!(pos.source, "test.vue");

    let style_map = res.styles[0].map.as_ref().unwrap();
    assert_eq!(style_map.original_position_for(2, 1).unwrap().line, 5);
}

#[test]
fn map_with_padding_is_line_identity() {
    let res = split_with_map(SOURCE, PadMode::Line);

    let script_map = res.script.as_ref().unwrap().map.as_ref().unwrap();
    assert_eq!(script_map.original_position_for(2, 1).unwrap().line, 2);

    let style = &res.styles[0];
    let style_map = style.map.as_ref().unwrap();
    assert_eq!(style_map.original_position_for(5, 1).unwrap().line, 5);

    // Filler lines map nowhere.
    assert_eq!(style_map.original_position_for(1, 1), None);
    assert_eq!(style.content.lines().nth(4), Some("  h1 { color: red }"));
}

#[test]
fn columns_are_mapped() {
    let res = split_with_map(SOURCE, PadMode::None);
    let map = res.script.unwrap().map.unwrap();

    let pos = map.original_position_for(2, 3).unwrap();
    assert_eq!((pos.line, pos.column), (2, 3));

    // Between segments the closest one before wins.
    let pos = map.original_position_for(2, 10).unwrap();
    assert_eq!((pos.line, pos.column), (2, 10));
    let pos = map.original_position_for(2, 9).unwrap();
    assert_eq!((pos.line, pos.column), (2, 8));
}

#[test]
fn first_content_line_keeps_its_tag_offset() {
    let res = split_with_map("\n\n<style>a{}\n  b{}</style>", PadMode::None);
    let map = res.styles[0].map.as_ref().unwrap();

    let first = map.original_position(Position { offset: 0, line: 1, column: 1 }).unwrap();
    assert_eq!((first.line, first.column), (3, 8));

    let second = map.original_position_for(2, 3).unwrap();
    assert_eq!((second.line, second.column), (4, 3));
}

#[test]
fn space_padding_maps_to_identical_positions() {
    let source = "<template>\n  <p/>\n</template>\n<script>let x = 1\n  x++</script>";
    let res = split_with_map(source, PadMode::Space);
    let map = res.script.unwrap().map.unwrap();

    let pos = map.original_position_for(4, 13).unwrap();
    assert_eq!((pos.line, pos.column), (4, 13));
    let pos = map.original_position_for(5, 3).unwrap();
    assert_eq!((pos.line, pos.column), (5, 3));
}

#[test]
fn map_metadata() {
    let res = sfc::parse(
        SOURCE,
        &ParseOptions {
            pad: PadMode::None,
            map: Some(MapOptions {
                filename: "src\\App.vue".to_string(),
                source_root: Some("C:\\project".to_string()),
            }),
        },
    );
    let map = res.script.unwrap().map.unwrap();

    assert_eq!(map.version, 3);
    assert_eq!(map.file.as_deref(), Some("src/App.vue"));
    assert_eq!(map.source_root.as_deref(), Some("C:/project"));
    assert_eq!(map.sources, ["src\\App.vue"]);
    assert_eq!(map.sources_content, [Some(SOURCE.to_string())]);
    assert!(map.names.is_empty());
}

#[test]
fn only_script_and_style_get_maps() {
    let res = split_with_map("<template>x</template><docs>y</docs><script>z</script>", PadMode::None);
    assert!(res.template.unwrap().map.is_none());
    assert!(res.custom_blocks[0].map.is_none());
    assert!(res.script.unwrap().map.is_some());
}

#[test]
fn no_map_unless_requested() {
    let res = sfc::parse(SOURCE, &ParseOptions::default());
    assert!(res.script.unwrap().map.is_none());
}

#[test]
fn serialized_map_uses_standard_field_names() {
    let res = split_with_map(SOURCE, PadMode::None);
    let json = serde_json::to_value(res.script.unwrap().map.unwrap()).unwrap();

    assert_eq!(json["version"], 3);
    assert_eq!(json["sources"][0], "test.vue");
    assert!(json["sourcesContent"][0].is_string());
    assert!(json["mappings"].as_str().unwrap().starts_with(';'));
}

#[test]
fn malformed_mappings_do_not_panic() {
    let res = split_with_map(SOURCE, PadMode::None);
    let mut map = res.script.unwrap().map.unwrap();
    map.mappings = "!!!".to_string();
    assert_eq!(map.original_position_for(1, 1), None);
}

#[test]
fn emitted_map_is_readable_by_other_consumers() {
    let res = split_with_map(SOURCE, PadMode::Line);
    let json = serde_json::to_vec(res.styles[0].map.as_ref().unwrap()).unwrap();
    let decoded = sourcemap::SourceMap::from_slice(&json).unwrap();

    let token = decoded.lookup_token(4, 2).unwrap();
    assert_eq!((token.get_src_line(), token.get_src_col()), (4, 2));
    assert_eq!(token.get_source(), Some("test.vue"));
    assert_eq!(decoded.get_source_contents(0), Some(SOURCE));
}
