use std::collections::BTreeMap;

use dotenv_lines::parse_str;

#[test]
fn parses_basic_fixture() {
    let fixture = include_str!("fixtures/basic.env");
    let map = to_map(parse_str(fixture).expect("fixture should parse"));

    assert_eq!(map.len(), 10);
    assert_eq!(map.get("BASIC").expect("BASIC"), "basic");
    assert_eq!(map.get("EMPTY").expect("EMPTY"), "");
    assert_eq!(map.get("EMPTY_DOUBLE").expect("EMPTY_DOUBLE"), "");
    assert_eq!(map.get("EMPTY_SINGLE").expect("EMPTY_SINGLE"), "");
    assert_eq!(map.get("INLINE_COMMENT").expect("INLINE_COMMENT"), "value");
    assert_eq!(map.get("QUOTED").expect("QUOTED"), "hello world");
    assert_eq!(
        map.get("SINGLE_QUOTED").expect("SINGLE_QUOTED"),
        "raw ${NOT_EXPANDED} \\n text"
    );
    assert_eq!(
        map.get("ESCAPED").expect("ESCAPED"),
        "a \"quote\" and a \\ backslash"
    );
    assert_eq!(map.get("EXPORTED").expect("EXPORTED"), "1");
    assert_eq!(map.get("SPACED_ASSIGNMENT").expect("SPACED_ASSIGNMENT"), "spaced");
}

#[test]
fn parses_multiline_fixture() {
    let fixture = include_str!("fixtures/multiline.env");
    let map = to_map(parse_str(fixture).expect("fixture should parse"));

    assert_eq!(
        map.get("MULTI_DOUBLE_QUOTED").expect("MULTI_DOUBLE_QUOTED"),
        "THIS\nIS\nA\nMULTILINE\nSTRING"
    );
    assert_eq!(
        map.get("MULTI_PEM_DOUBLE_QUOTED")
            .expect("MULTI_PEM_DOUBLE_QUOTED"),
        "-----BEGIN PUBLIC KEY-----\nLINE1\nLINE2\n-----END PUBLIC KEY-----"
    );
    assert_eq!(
        map.get("MULTI_WITH_BLANK").expect("MULTI_WITH_BLANK"),
        "first\n\nthird"
    );
    assert_eq!(
        map.get("MULTI_TRAILING_QUOTE").expect("MULTI_TRAILING_QUOTE"),
        "line\n"
    );
    assert_eq!(map.get("AFTER").expect("AFTER"), "after_line");
}

#[test]
fn entries_keep_file_order() {
    let fixture = include_str!("fixtures/multiline.env");
    let names: Vec<String> = parse_str(fixture)
        .expect("fixture should parse")
        .into_iter()
        .map(|entry| entry.name)
        .collect();

    assert_eq!(
        names,
        vec![
            "MULTI_DOUBLE_QUOTED",
            "MULTI_PEM_DOUBLE_QUOTED",
            "MULTI_WITH_BLANK",
            "MULTI_TRAILING_QUOTE",
            "AFTER",
        ]
    );
}

fn to_map(entries: Vec<dotenv_lines::Entry>) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .map(|entry| (entry.name, entry.value))
        .collect()
}
