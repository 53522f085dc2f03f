use std::path::{Path, PathBuf};

use stylewatch::config::{
    default_config, load_config_graph, locate_config, ConfigResolver, LayeredResolver, LoadedConfig,
    ModuleCache, RawContent, ResolvedConfig,
};
use stylewatch::fs::mock::MockFileSystem;

const ROOT_CONFIG: &str = "/project/stylewatch.config.toml";

fn resolve(fs: &MockFileSystem) -> stylewatch::errors::Result<ResolvedConfig> {
    let mut cache = ModuleCache::new();
    let loaded = load_config_graph(&mut cache, fs, Path::new(ROOT_CONFIG))?;
    LayeredResolver.resolve(&loaded, &default_config()?)
}

fn screen_names(config: &ResolvedConfig) -> Vec<&str> {
    config.screens.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn locate_config_walks_upward_and_explicit_wins() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "");

    assert_eq!(
        locate_config(&fs, None, Path::new("/project/src/deep")),
        Some(PathBuf::from(ROOT_CONFIG))
    );
    assert_eq!(
        locate_config(&fs, Some(Path::new("/elsewhere/custom.toml")), Path::new("/project")),
        Some(PathBuf::from("/elsewhere/custom.toml"))
    );
    assert_eq!(locate_config(&fs, None, Path::new("/other")), None);
}

#[test]
fn config_without_presets_layers_over_defaults() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "[utilities.brand]\ncolor = \"red\"\n");

    let config = resolve(&fs).unwrap();

    assert!(config.utilities.contains_key("brand"));
    assert!(config.utilities.contains_key("flex"));
    assert_eq!(config.source, Some(PathBuf::from(ROOT_CONFIG)));
    assert_eq!(screen_names(&config), vec!["sm", "md", "lg"]);
}

#[test]
fn empty_preset_list_opts_out_of_defaults() {
    let fs = MockFileSystem::new();
    fs.add_file(
        ROOT_CONFIG,
        r#"
        presets = ["./presets/brand.toml"]
        important = true

        [utilities.brand]
        color = "blue"
        "#,
    );
    fs.add_file(
        "/project/presets/brand.toml",
        r#"
        presets = []
        prefix = "tw-"

        [screens]
        tablet = "700px"

        [utilities.brand]
        color = "red"

        [utilities.card]
        padding = "1rem"
        "#,
    );

    let config = resolve(&fs).unwrap();

    assert!(!config.utilities.contains_key("flex"));
    assert_eq!(config.utilities["brand"]["color"], "blue");
    assert!(config.utilities.contains_key("card"));
    assert_eq!(config.prefix, "tw-");
    assert!(config.important);
    assert_eq!(screen_names(&config), vec!["tablet"]);
}

#[test]
fn graph_reports_every_module_as_dependency() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "presets = [\"a.toml\", \"b.toml\"]");
    fs.add_file("/project/a.toml", "presets = [\"b.toml\"]");
    fs.add_file("/project/b.toml", "");

    let mut cache = ModuleCache::new();
    let loaded = load_config_graph(&mut cache, &fs, Path::new(ROOT_CONFIG)).unwrap();

    let mut deps = loaded.dependencies();
    deps.sort();
    assert_eq!(
        deps,
        vec![
            PathBuf::from("/project/a.toml"),
            PathBuf::from("/project/b.toml"),
            PathBuf::from(ROOT_CONFIG),
        ]
    );
}

#[test]
fn preset_cycle_is_a_config_error() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "presets = [\"a.toml\"]");
    fs.add_file("/project/a.toml", "presets = [\"stylewatch.config.toml\"]");

    let err = resolve(&fs).unwrap_err();

    assert!(err.to_string().contains("preset cycle"), "{err}");
}

#[test]
fn screens_are_ordered_by_width_not_name() {
    let fs = MockFileSystem::new();
    fs.add_file(
        ROOT_CONFIG,
        "presets = []\n[screens]\nxl = \"1280px\"\nsm = \"640px\"\nmd = \"768px\"\n",
    );

    let config = resolve(&fs).unwrap();

    assert_eq!(screen_names(&config), vec!["sm", "md", "xl"]);
}

#[test]
fn unparseable_screen_width_is_rejected() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "[screens]\nmd = \"wide\"\n");

    assert!(resolve(&fs).is_err());
}

#[test]
fn content_section_form_and_raw_extension_default() {
    let fs = MockFileSystem::new();
    fs.add_file(
        ROOT_CONFIG,
        r#"
        [content]
        files = ["src/**/*.html", { raw = "<b class='p-4'>" }, { raw = "p-2", extension = "md" }]
        "#,
    );

    let config = resolve(&fs).unwrap();

    assert_eq!(config.content.patterns, vec!["src/**/*.html".to_string()]);
    assert_eq!(
        config.content.raw,
        vec![
            RawContent {
                text: "<b class='p-4'>".to_string(),
                extension: "html".to_string(),
            },
            RawContent {
                text: "p-2".to_string(),
                extension: "md".to_string(),
            },
        ]
    );
}

#[test]
fn defaults_only_has_no_source() {
    let config = LayeredResolver
        .resolve(&LoadedConfig::defaults_only(), &default_config().unwrap())
        .unwrap();

    assert_eq!(config.source, None);
    assert!(config.content.patterns.is_empty());
    assert!(config.base.contains_key("html"));
}

#[test]
fn module_cache_reads_disk_once_until_evicted() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "important = true");
    let path = Path::new(ROOT_CONFIG);
    let mut cache = ModuleCache::new();

    cache.load(&fs, path).unwrap();
    cache.load(&fs, path).unwrap();
    assert_eq!(fs.read_count(path), 1);

    assert!(cache.evict(path));
    assert!(!cache.evict(path));
    cache.load(&fs, path).unwrap();
    assert_eq!(fs.read_count(path), 2);
}

#[test]
fn malformed_config_names_the_file() {
    let fs = MockFileSystem::new();
    fs.add_file(ROOT_CONFIG, "content = [");

    let err = resolve(&fs).unwrap_err();

    assert!(err.to_string().contains("stylewatch.config.toml"), "{err}");
}
