use std::sync::Arc;

use stylewatch::config::{ConfigResolver, LoadedConfig, RawConfig, RawContent, ResolvedConfig};
use stylewatch::context::ChangedContentItem;
use stylewatch::engine::{build, WatchCoordinator};
use stylewatch::watch::ChangedFile;
use stylewatch_test_utils::builders::ProjectBuilder;
use stylewatch_test_utils::init_tracing;
use stylewatch_test_utils::recording::CountingFactory;

const CONFIG_WITH_RAW: &str = r#"
content = [
    "src/**/*.html",
    { raw = "<b class=\"brand\">" },
    { raw = "brand", extension = "md" },
]

[utilities.brand]
color = "red"
"#;

fn project() -> ProjectBuilder {
    ProjectBuilder::new()
        .config(CONFIG_WITH_RAW)
        .file("src/a.html", r#"<div class="flex">"#)
        .file("src/nested/b.html", r#"<div class="p-4">"#)
        .file("src/notes.txt", "flex")
}

#[test]
fn new_context_reads_every_content_file_and_raw_entry() {
    init_tracing();
    let mut session = project().session();

    let context = session.context().unwrap();
    let guard = context.lock().unwrap();

    assert_eq!(guard.config_path(), Some(ProjectBuilder::path("stylewatch.config.toml").as_path()));
    assert_eq!(guard.config().content.raw.len(), 2);

    let pending = guard.pending_content();
    assert_eq!(pending.len(), 4, "2 files + 2 raw entries");
    assert!(pending.iter().any(|i| i.extension == "md" && i.text == "brand"));
    assert!(pending.iter().filter(|i| i.extension == "html").count() == 3);
}

#[test]
fn existing_context_is_reused_without_recompute() {
    let factory = CountingFactory::new();
    let mut session = project().session().with_factory(Box::new(factory.clone()));

    let first = session.context().unwrap();
    let second = session.context().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(factory.created(), 1);
    assert_eq!(session.cache().generation(), 1);
}

#[test]
fn queued_content_is_flushed_into_live_context() {
    let mut session = project().session();
    let context = session.context().unwrap();
    context.lock().unwrap().flush_content();

    session.queue_content([ChangedContentItem::new("<i class=\"m-4\">", "html")]);
    assert_eq!(session.cache().pending_len(), 1);

    let same = session.context().unwrap();
    assert_eq!(same.lock().unwrap().pending_content().len(), 1);
    assert_eq!(session.cache().pending_len(), 0);
}

#[test]
fn invalidate_forces_full_read_not_delta() {
    let factory = CountingFactory::new();
    let mut session = project().session().with_factory(Box::new(factory.clone()));

    let first = session.context().unwrap();
    first.lock().unwrap().flush_content();
    session.queue_content([ChangedContentItem::new("delta", "html")]);

    session.invalidate();
    let rebuilt = session.context().unwrap();

    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(factory.created(), 2);
    assert_eq!(session.cache().generation(), 2);
    assert_eq!(rebuilt.lock().unwrap().pending_content().len(), 4);
}

#[test]
fn config_change_is_tracked_as_config_dependency() {
    let mut session = project().session();
    session.context().unwrap();

    let config = ProjectBuilder::path("stylewatch.config.toml");
    assert!(session.tracker().config_dependencies().contains(&config));
    assert!(session.tracker().module_cache().contains(&config));
    assert_eq!(session.tracker().module_cache().len(), 1);
    assert_eq!(session.tracker().content_patterns().sources(), ["src/**/*.html"]);
    assert_eq!(
        session.tracker().classify(&config),
        stylewatch::types::ChangeClass::ConfigDependency
    );
}

#[tokio::test]
async fn config_dependency_change_loads_config_fresh_from_disk() {
    init_tracing();
    let project = project().output("out.css");
    let fs = project.fs();
    let config = ProjectBuilder::path("stylewatch.config.toml");
    let mut session = project.session();

    let first = build(&mut session).await.unwrap();
    assert!(first.css.contains("color: red"));
    assert_eq!(fs.read_count(&config), 1);

    fs.add_file(&config, CONFIG_WITH_RAW.replace("red", "blue"));

    // Without invalidation the cached context keeps the old config.
    let stale = build(&mut session).await.unwrap();
    assert!(stale.css.contains("color: red"));
    assert_eq!(fs.read_count(&config), 1);

    let mut coordinator = WatchCoordinator::new();
    let fresh = coordinator
        .on_batch(&mut session, &[ChangedFile::new(&config)])
        .await
        .unwrap();

    assert!(fresh.css.contains("color: blue"), "{}", fresh.css);
    assert_eq!(fs.read_count(&config), 2);
}

#[test]
fn content_override_replaces_configured_entries() {
    let mut session = project().content(&["src/nested/**/*.html"]).session();

    let context = session.context().unwrap();
    let guard = context.lock().unwrap();

    assert_eq!(guard.pending_content().len(), 1);
    assert!(guard.pending_content()[0].text.contains("p-4"));
}

/// Ignores every file and serves one utility from inline content.
#[derive(Debug)]
struct FixedResolver;

impl ConfigResolver for FixedResolver {
    fn resolve(&self, _loaded: &LoadedConfig, _defaults: &RawConfig) -> stylewatch::errors::Result<ResolvedConfig> {
        let mut config = ResolvedConfig::default();
        config.content.raw.push(RawContent {
            text: "<i class=\"ink\">".to_string(),
            extension: "html".to_string(),
        });
        config
            .utilities
            .insert("ink".to_string(), [("color".to_string(), "black".to_string())].into());
        Ok(config)
    }
}

#[tokio::test]
async fn custom_resolver_drives_generated_output() {
    let mut session = project().session().with_resolver(Box::new(FixedResolver));

    let report = build(&mut session).await.unwrap();

    assert!(report.css.contains(".ink {\n  color: black;\n}"), "{}", report.css);
    assert!(!report.css.contains(".flex"));
}
