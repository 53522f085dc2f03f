use std::sync::Arc;

use proptest::prelude::*;
use stylewatch::fs::mock::MockFileSystem;
use stylewatch::fs::FileSystem;
use stylewatch::pipeline::declaration::StageDeclaration;
use stylewatch::pipeline::{
    assemble, process_blocking, split_at_generation, AssembleFlags, PipelineBuilder,
    PipelineDeclaration, PipelineMode, ProcessOptions, StageRef,
};
use stylewatch_test_utils::builders::{stage_names, MarkerStage};

fn declaration(toml: &str) -> PipelineDeclaration {
    toml::from_str(toml).expect("valid declaration")
}

fn builder(mode: PipelineMode) -> PipelineBuilder {
    let fs: Arc<dyn FileSystem> = Arc::new(MockFileSystem::new());
    PipelineBuilder::new(mode, fs, "/project")
}

#[test]
fn split_returns_stages_around_generation() {
    let stages = vec![
        MarkerStage::new("A"),
        MarkerStage::generation("gen"),
        MarkerStage::new("B"),
    ];

    let (before, after) = split_at_generation(stages);

    assert_eq!(stage_names(&before), vec!["A"]);
    assert_eq!(stage_names(&after), vec!["B"]);
}

#[test]
fn split_recognises_generation_by_capability_not_name() {
    // A transform that merely shares the generation stage's name is not it.
    let stages = vec![
        MarkerStage::new("stylewatch"),
        MarkerStage::generation("renamed"),
        MarkerStage::new("after"),
    ];

    let (before, after) = split_at_generation(stages);

    assert_eq!(stage_names(&before), vec!["stylewatch"]);
    assert_eq!(stage_names(&after), vec!["after"]);
}

#[test]
fn split_without_generation_runs_everything_after() {
    let stages = vec![MarkerStage::new("A"), MarkerStage::new("B")];

    let (before, after) = split_at_generation(stages);

    assert!(before.is_empty());
    assert_eq!(stage_names(&after), vec!["A", "B"]);
}

#[test]
fn assemble_orders_optional_stages() {
    let generation = MarkerStage::generation("gen");
    let parts = stylewatch::pipeline::PipelineParts {
        before: vec![MarkerStage::new("A")],
        after: vec![MarkerStage::new("B")],
        options: Default::default(),
    };

    let default = assemble(&parts, &generation, AssembleFlags::default());
    assert_eq!(stage_names(&default), vec!["A", "gen", "format", "B", "prefix"]);

    let minified = assemble(
        &parts,
        &generation,
        AssembleFlags {
            minify: true,
            autoprefixer: true,
        },
    );
    assert_eq!(stage_names(&minified), vec!["A", "gen", "B", "prefix", "minify"]);

    let bare = assemble(
        &parts,
        &generation,
        AssembleFlags {
            minify: false,
            autoprefixer: false,
        },
    );
    assert_eq!(stage_names(&bare), vec!["A", "gen", "format", "B"]);
}

#[test]
fn assembled_stages_run_in_order() {
    let generation = MarkerStage::generation("gen");
    let parts = stylewatch::pipeline::PipelineParts {
        before: vec![MarkerStage::new("A")],
        after: vec![MarkerStage::new("B")],
        options: Default::default(),
    };
    let stages = assemble(
        &parts,
        &generation,
        AssembleFlags {
            minify: false,
            autoprefixer: false,
        },
    );

    let result = process_blocking(&stages, "", ProcessOptions::default()).unwrap();

    let a = result.css.find("/* A */").unwrap();
    let g = result.css.find("/* gen */").unwrap();
    let b = result.css.find("/* B */").unwrap();
    assert!(a < g && g < b, "unexpected order in {}", result.css);
}

#[test]
fn built_in_mode_guards_tool_imports() {
    let generation = MarkerStage::generation("gen");
    let parts = builder(PipelineMode::BuiltIn).build(&generation).unwrap();

    assert_eq!(
        stage_names(&parts.before),
        vec!["preserve-tool-imports", "import", "restore-tool-imports"]
    );
    assert!(parts.after.is_empty());
    assert!(!parts.options.map);
}

#[test]
fn sourced_mode_splits_declared_stages() {
    let decl = declaration(
        r#"
        map = true

        [[stage]]
        name = "banner"
        text = "hello"

        [[stage]]
        name = "stylewatch"

        [[stage]]
        name = "prefix"
        "#,
    );
    let generation = MarkerStage::generation("gen");

    let parts = builder(PipelineMode::Sourced(decl)).build(&generation).unwrap();

    assert_eq!(stage_names(&parts.before), vec!["banner"]);
    assert_eq!(stage_names(&parts.after), vec!["prefix"]);
    assert!(parts.options.map);
}

#[test]
fn sourced_mode_without_generation_entry_puts_generation_first() {
    let decl = declaration(
        r#"
        [[stage]]
        name = "import"

        [[stage]]
        name = "format"
        "#,
    );
    let generation = MarkerStage::generation("gen");

    let parts = builder(PipelineMode::Sourced(decl)).build(&generation).unwrap();
    let all = assemble(&parts, &generation, AssembleFlags::default());

    assert!(parts.before.is_empty());
    assert_eq!(stage_names(&all)[0], "gen");
}

#[test]
fn unknown_declared_stage_is_an_error() {
    let decl = declaration(
        r#"
        [[stage]]
        name = "nope"
        "#,
    );
    let generation = MarkerStage::generation("gen");

    let err = builder(PipelineMode::Sourced(decl)).build(&generation).unwrap_err();
    assert!(err.to_string().contains("unknown stage 'nope'"));
}

#[test]
fn banner_requires_text_option() {
    let decl = PipelineDeclaration {
        map: false,
        stages: vec![StageDeclaration {
            name: "banner".to_string(),
            options: toml::Table::new(),
        }],
    };
    let generation = MarkerStage::generation("gen");

    let err = builder(PipelineMode::Sourced(decl)).build(&generation).unwrap_err();
    assert!(err.to_string().contains("missing required option 'text'"));
}

fn stage_list() -> impl Strategy<Value = (Vec<String>, Option<usize>)> {
    proptest::collection::vec("[a-z]{1,6}", 0..8).prop_flat_map(|names| {
        let len = names.len();
        let position = if len == 0 {
            Just(None).boxed()
        } else {
            proptest::option::of(0..len).boxed()
        };
        (Just(names), position)
    })
}

proptest! {
    #[test]
    fn split_preserves_declared_order((names, generation_at) in stage_list()) {
        let stages: Vec<StageRef> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if Some(i) == generation_at {
                    MarkerStage::generation(name)
                } else {
                    MarkerStage::new(name)
                }
            })
            .collect();

        let (before, after) = split_at_generation(stages);

        let mut expected = names.clone();
        if let Some(idx) = generation_at {
            expected.remove(idx);
            prop_assert_eq!(before.len(), idx);
        } else {
            prop_assert!(before.is_empty());
        }
        let mut rejoined = stage_names(&before);
        rejoined.extend(stage_names(&after));
        prop_assert_eq!(rejoined, expected);
    }
}
