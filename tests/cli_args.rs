use std::path::PathBuf;

use clap::Parser;
use proptest::prelude::*;

use stylewatch::build_options;
use stylewatch::cli::{split_content_arg, CliArgs, Command, PipelineSource};
use stylewatch::engine::InputSource;
use stylewatch::fs::mock::MockFileSystem;
use stylewatch::pipeline::PipelineMode;

fn parse(args: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("stylewatch").chain(args.iter().copied())).unwrap()
}

#[test]
fn postcss_flag_with_and_without_value() {
    assert_eq!(parse(&[]).build.pipeline_source(), None);
    assert_eq!(
        parse(&["--postcss"]).build.pipeline_source(),
        Some(PipelineSource::Discover)
    );
    assert_eq!(
        parse(&["--postcss", "-m"]).build.pipeline_source(),
        Some(PipelineSource::Discover)
    );
    assert_eq!(
        parse(&["--postcss", "custom.toml"]).build.pipeline_source(),
        Some(PipelineSource::File(PathBuf::from("custom.toml")))
    );
}

#[test]
fn content_flag_splits_outside_braces() {
    let args = parse(&["--content", "src/**/*.{html,js}, lib/*.html"]);

    assert_eq!(
        args.build.content_patterns(),
        Some(vec!["src/**/*.{html,js}".to_string(), "lib/*.html".to_string()])
    );
}

#[test]
fn purge_is_an_alias_only_when_content_is_absent() {
    let purge = parse(&["--purge", "a/*.html"]);
    assert_eq!(purge.build.content_patterns(), Some(vec!["a/*.html".to_string()]));

    let both = parse(&["--purge", "a/*.html", "--content", "b/*.html"]);
    assert_eq!(both.build.content_patterns(), Some(vec!["b/*.html".to_string()]));
}

#[test]
fn init_subcommand_parses() {
    let args = parse(&["init", "-p"]);

    assert!(matches!(
        args.command,
        Some(Command::Init {
            pipeline: true,
            full: false
        })
    ));
}

#[test]
fn build_options_map_flags() {
    let fs = MockFileSystem::new();
    let args = parse(&["-i", "-", "-o", "dist/out.css", "--minify", "--no-autoprefixer"]);

    let options = build_options(&args.build, &fs, PathBuf::from("/project").as_path()).unwrap();

    assert_eq!(options.input, InputSource::Stdin);
    assert_eq!(options.output, Some(PathBuf::from("dist/out.css")));
    assert!(options.minify);
    assert!(!options.autoprefixer);
    assert!(matches!(options.pipeline, PipelineMode::BuiltIn));
}

#[test]
fn build_options_load_and_check_declaration() {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/project/stylewatch.pipeline.toml",
        "[[stage]]\nname = \"import\"\n\n[[stage]]\nname = \"stylewatch\"\n",
    );
    fs.add_file("/project/bad.toml", "[[stage]]\nname = \"sass\"\n");
    let root = PathBuf::from("/project");

    let options = build_options(&parse(&["--postcss"]).build, &fs, &root).unwrap();
    let PipelineMode::Sourced(declaration) = options.pipeline else {
        panic!("expected a sourced pipeline");
    };
    assert_eq!(declaration.stage_names().collect::<Vec<_>>(), vec!["import", "stylewatch"]);

    let err = build_options(&parse(&["--postcss", "bad.toml"]).build, &fs, &root).unwrap_err();
    assert!(format!("{err:#}").contains("unknown stage 'sass'"), "{err:#}");
}

proptest! {
    #[test]
    fn split_content_arg_round_trips_brace_free_lists(
        parts in prop::collection::vec("[a-z*/.]{1,12}", 1..6)
    ) {
        let joined = parts.join(",");
        prop_assert_eq!(split_content_arg(&joined), parts);
    }

    #[test]
    fn split_content_arg_never_splits_inside_braces(
        exts in prop::collection::vec("[a-z]{1,4}", 2..5)
    ) {
        let pattern = format!("src/*.{{{}}}", exts.join(","));
        prop_assert_eq!(split_content_arg(&pattern), vec![pattern.clone()]);
    }
}
