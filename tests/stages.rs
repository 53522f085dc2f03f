use std::sync::Arc;

use stylewatch::pipeline::stages::{BannerStage, FormatStage, MinifyStage, PrefixStage};
use stylewatch::pipeline::{process_blocking, ProcessOptions, StageRef};

fn run(stages: Vec<StageRef>, input: &str) -> String {
    process_blocking(&stages, input, ProcessOptions::default())
        .unwrap()
        .css
}

#[test]
fn prefix_inserts_webkit_copy_before_declaration() {
    let css = run(vec![Arc::new(PrefixStage)], "a{user-select:none;color:red}");

    assert!(
        css.contains("  -webkit-user-select: none;\n  user-select: none;\n  color: red;"),
        "{css}"
    );
}

#[test]
fn prefix_leaves_existing_prefixed_declaration_alone() {
    let css = run(
        vec![Arc::new(PrefixStage)],
        "a{-webkit-user-select:auto;user-select:none}",
    );

    assert_eq!(css.matches("-webkit-user-select").count(), 1, "{css}");
    assert!(css.contains("-webkit-user-select: auto;"));
}

#[test]
fn prefix_reaches_into_at_rule_blocks() {
    let css = run(vec![Arc::new(PrefixStage)], "@media print{a{appearance:none}}");

    assert!(css.contains("-webkit-appearance: none;"), "{css}");
}

#[test]
fn minify_keeps_preserved_comments_only() {
    let css = run(
        vec![Arc::new(MinifyStage)],
        "/*! license */\n/* scratch note */\na {\n  margin: 0   auto;\n}\n",
    );

    assert_eq!(css, "/*! license */a{margin:0 auto}");
}

#[test]
fn format_collapses_whitespace() {
    let css = run(vec![Arc::new(FormatStage)], "a   >  b{margin:0    auto}");

    assert_eq!(css, "a > b {\n  margin: 0 auto;\n}\n");
}

#[test]
fn banner_goes_first_and_survives_minify() {
    let css = run(
        vec![Arc::new(BannerStage::new("build 7")), Arc::new(MinifyStage)],
        "/* gone */a{color:red}",
    );

    assert_eq!(css, "/*! build 7 */a{color:red}");
}

#[test]
fn minify_separates_declarations_from_nested_statements() {
    let css = run(
        vec![Arc::new(MinifyStage)],
        "a { color: red; @apply x; margin: 0; b { top: 0; } left: 0; /* note */ }",
    );

    assert_eq!(css, "a{color:red;@apply x;margin:0;b{top:0}left:0}");
}
