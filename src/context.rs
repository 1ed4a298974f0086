use crate::data_models::SearchResult;

/// Renders one result as an xml-ish `<source>` fragment. The leading and
/// trailing newlines are part of the fragment.
pub fn format_source(result: &SearchResult) -> String {
    let highlights = serde_json::to_string(&result.highlights)
        .expect("a list of strings always serializes");
    format!(
        "\n<source>\n    <url>{}</url>\n    <highlights>{}</highlights>\n</source>\n",
        result.url, highlights
    )
}

/// Joins the rendered sources with single newlines, in result order.
/// No results gives an empty string.
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(format_source)
        .collect::<Vec<String>>()
        .join("\n")
}

#[test]
fn test_format_source() {
    let result = SearchResult::new(
        "https://doc.rust-lang.org/book/",
        vec!["The Rust Programming Language".into(), "ownership".into()],
    );
    let expected = "\n<source>\n    <url>https://doc.rust-lang.org/book/</url>\n    <highlights>[\"The Rust Programming Language\",\"ownership\"]</highlights>\n</source>\n";
    assert_eq!(format_source(&result), expected);
}

#[test]
fn test_format_source_no_highlights() {
    let result = SearchResult::new("https://example.com", vec![]);
    assert_eq!(
        format_source(&result),
        "\n<source>\n    <url>https://example.com</url>\n    <highlights>[]</highlights>\n</source>\n"
    );
}

#[test]
fn test_format_context_empty() {
    assert_eq!(format_context(&[]), "");
}

#[test]
fn test_format_source_escapes_quotes_in_highlights() {
    let result = SearchResult::new(
        "https://example.com/q",
        vec!["he said \"hi\"".into(), "back\\slash".into()],
    );
    assert!(
        format_source(&result)
            .contains("<highlights>[\"he said \\\"hi\\\"\",\"back\\\\slash\"]</highlights>")
    );
}
