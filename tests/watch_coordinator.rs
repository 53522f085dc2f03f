use std::path::PathBuf;

use tokio::sync::mpsc;

use stylewatch::engine::{build, coalesce, plan_batch, BatchPlan, CoordinatorState, Runtime, RuntimeEvent, WatchCoordinator};
use stylewatch::types::ChangeClass;
use stylewatch::watch::ChangedFile;
use stylewatch_test_utils::builders::ProjectBuilder;
use stylewatch_test_utils::recording::RecordingWatcher;
use stylewatch_test_utils::{init_tracing, with_timeout};

fn changed(rel: &str) -> ChangedFile {
    ChangedFile::new(ProjectBuilder::path(rel))
}

fn project() -> ProjectBuilder {
    ProjectBuilder::new()
        .config("content = [\"src/**/*.html\"]\n")
        .input("styles.css", "@import \"./partials/buttons.css\";\n@stylewatch utilities;\n")
        .file("partials/buttons.css", ".btn { padding: 0; }")
        .file("src/index.html", r#"<div class="flex">"#)
        .output("dist/out.css")
}

#[tokio::test]
async fn watched_build_records_context_dependencies() {
    init_tracing();
    let watcher = RecordingWatcher::new();
    let mut session = project().session();
    session.set_watcher(Box::new(watcher.clone()));

    let report = build(&mut session).await.unwrap();

    let partial = ProjectBuilder::path("partials/buttons.css");
    assert_eq!(report.dependencies, vec![partial.clone()]);
    assert!(session.tracker().context_dependencies().contains(&partial));
    // Once when the context was created, once after the run.
    assert_eq!(watcher.refresh_count(), 2);

    let watched = watcher.last().unwrap();
    assert!(watched.files.contains(&partial));
    assert!(watched.files.contains(&ProjectBuilder::path("stylewatch.config.toml")));
    assert!(watched.files.contains(&ProjectBuilder::path("styles.css")));
    assert!(watched.wants(&ProjectBuilder::path("src/new/page.html")));
    assert!(!watched.wants(&ProjectBuilder::path("dist/out.css")));
    assert!(!watched.wants(&ProjectBuilder::path("dist/out.css.map")));
}

#[tokio::test]
async fn unwatched_build_does_not_track_context_dependencies() {
    let mut session = project().session();

    let report = build(&mut session).await.unwrap();

    assert_eq!(report.dependencies.len(), 1);
    assert!(session.tracker().context_dependencies().is_empty());
}

#[tokio::test]
async fn dependency_in_batch_takes_precedence_over_content() {
    let mut session = project().session();
    session.set_watcher(Box::new(RecordingWatcher::new()));
    build(&mut session).await.unwrap();

    let batch = vec![changed("src/index.html"), changed("partials/buttons.css")];
    assert_eq!(
        plan_batch(session.tracker(), &batch),
        BatchPlan::Invalidate {
            trigger: ProjectBuilder::path("partials/buttons.css"),
            class: ChangeClass::ContextDependency,
        }
    );

    let batch = vec![changed("stylewatch.config.toml"), changed("partials/buttons.css")];
    assert!(matches!(
        plan_batch(session.tracker(), &batch),
        BatchPlan::Invalidate {
            class: ChangeClass::ConfigDependency,
            ..
        }
    ));
}

#[tokio::test]
async fn unknown_files_are_content() {
    let mut session = project().session();
    build(&mut session).await.unwrap();

    let batch = vec![changed("src/index.html"), changed("somewhere/else.txt")];

    assert_eq!(
        plan_batch(session.tracker(), &batch),
        BatchPlan::Incremental(vec![
            ProjectBuilder::path("src/index.html"),
            ProjectBuilder::path("somewhere/else.txt"),
        ])
    );
}

#[tokio::test]
async fn content_batch_rebuilds_incrementally() {
    let project = project();
    let fs = project.fs();
    let mut session = project.session();
    build(&mut session).await.unwrap();

    fs.add_file(ProjectBuilder::path("src/index.html"), r#"<div class="flex p-2">"#);
    let mut coordinator = WatchCoordinator::new();
    let report = coordinator
        .on_batch(&mut session, &[changed("src/index.html")])
        .await
        .unwrap();

    assert!(report.css.contains(".p-2 {"));
    assert_eq!(session.cache().generation(), 1);
    assert_eq!(coordinator.state(), CoordinatorState::Idle);
    assert_eq!(coordinator.builds(), 1);
}

#[tokio::test]
async fn context_dependency_batch_recreates_context() {
    let project = project();
    let fs = project.fs();
    let mut session = project.session();
    session.set_watcher(Box::new(RecordingWatcher::new()));
    build(&mut session).await.unwrap();

    fs.add_file(ProjectBuilder::path("partials/buttons.css"), ".btn { padding: 1rem; }");
    let mut coordinator = WatchCoordinator::new();
    let report = coordinator
        .on_batch(&mut session, &[changed("partials/buttons.css")])
        .await
        .unwrap();

    assert!(report.css.contains("padding: 1rem"));
    assert_eq!(session.cache().generation(), 2);
}

#[tokio::test]
async fn deleted_content_file_is_skipped() {
    let project = project();
    let fs = project.fs();
    let mut session = project.session();
    build(&mut session).await.unwrap();

    fs.remove_file(ProjectBuilder::path("src/index.html"));
    let mut coordinator = WatchCoordinator::new();

    let report = coordinator.on_batch(&mut session, &[changed("src/index.html")]).await;

    assert!(report.is_ok());
}

#[test]
fn coalesce_merges_batches_in_first_seen_order() {
    let merged = coalesce([
        vec![changed("a.html"), changed("b.html")],
        vec![changed("b.html"), changed("c.html")],
    ]);

    let paths: Vec<PathBuf> = merged.into_iter().map(|f| f.path).collect();
    assert_eq!(
        paths,
        vec![
            ProjectBuilder::path("a.html"),
            ProjectBuilder::path("b.html"),
            ProjectBuilder::path("c.html"),
        ]
    );
}

#[tokio::test]
async fn runtime_drains_queued_batches_until_channel_closes() {
    init_tracing();
    let project = project();
    let fs = project.fs();
    let mut session = project.session();
    build(&mut session).await.unwrap();

    let (tx, rx) = mpsc::channel(8);
    fs.add_file(ProjectBuilder::path("src/index.html"), r#"<div class="m-4">"#);
    tx.send(RuntimeEvent::ChangeBatch(vec![changed("src/index.html")])).await.unwrap();
    tx.send(RuntimeEvent::ChangeBatch(vec![changed("src/index.html")])).await.unwrap();

    drop(tx);

    let session = with_timeout(Runtime::new(session, rx).run()).await.unwrap();
    assert_eq!(session.cache().generation(), 1);
    let out = fs.contents("/project/dist/out.css").unwrap();
    assert!(out.contains(".m-4 {"), "{out}");
}

#[tokio::test]
async fn failed_rebuild_keeps_runtime_alive() {
    let project = project();
    let fs = project.fs();
    let mut session = project.session();
    build(&mut session).await.unwrap();

    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(Runtime::new(session, rx).run());

    // Broken config: the rebuild fails, the loop keeps going.
    fs.add_file(ProjectBuilder::path("stylewatch.config.toml"), "content = [");
    tx.send(RuntimeEvent::ChangeBatch(vec![changed("stylewatch.config.toml")])).await.unwrap();
    tokio::task::yield_now().await;

    fs.add_file(ProjectBuilder::path("stylewatch.config.toml"), "content = [\"src/**/*.html\"]\n");
    tx.send(RuntimeEvent::ChangeBatch(vec![changed("stylewatch.config.toml")])).await.unwrap();
    drop(tx);

    let session = with_timeout(handle).await.unwrap().unwrap();
    assert!(session.cache().is_active());
}

#[tokio::test]
async fn shutdown_stops_the_runtime_without_building() {
    let mut session = project().session();
    build(&mut session).await.unwrap();

    let (tx, rx) = mpsc::channel(8);
    tx.send(RuntimeEvent::ShutdownRequested).await.unwrap();

    let session = with_timeout(Runtime::new(session, rx).run()).await.unwrap();
    assert_eq!(session.cache().generation(), 1);
    drop(tx);
}
