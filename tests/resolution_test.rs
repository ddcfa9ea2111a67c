//! End-to-end resolution against a mock repository.

use conduit_deps::config::Settings;
use conduit_deps::download::{EnsureOutcome, RecordingListener};
use conduit_deps::loadpath::LoadPath;
use conduit_deps::repository::{
    LocalRepository, Repository, RepositoryPolicy, RepositoryResolver,
};
use conduit_deps::{DepsError, ResolutionContext};
use httpmock::prelude::*;
use httpmock::Mock;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const WIDGET: &str = "mvn:org.example:widget:1.0";

struct Repo<'a> {
    widget: Mock<'a>,
    support: Mock<'a>,
}

/// `widget` declares `widget-support`; neither has further dependencies.
fn serve_widget(server: &MockServer) -> Repo<'_> {
    let widget = server.mock(|when, then| {
        when.method(GET).path("/org/example/widget/1.0/widget-1.0.jar");
        then.status(200).body("widget bytes");
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/org/example/widget/1.0/widget-1.0.deps.json");
        then.status(200).body(
            r#"{"dependencies":[
                {"coordinate":"org.example:widget-support:1.0"},
                {"coordinate":"org.example:widget-tests:1.0","scope":"test"}
            ]}"#,
        );
    });
    let support = server.mock(|when, then| {
        when.method(GET)
            .path("/org/example/widget-support/1.0/widget-support-1.0.jar");
        then.status(200).body("support bytes");
    });
    Repo { widget, support }
}

fn resolver(server: &MockServer, cache: &Path) -> RepositoryResolver {
    RepositoryResolver::new(LocalRepository::new(cache)).with_central(Repository::new(
        "central",
        server.base_url(),
        RepositoryPolicy::releases(),
    ))
}

fn context(
    resolver: RepositoryResolver,
    load_path: LoadPath,
    offline: bool,
) -> (ResolutionContext, Arc<RecordingListener>) {
    let settings = Settings {
        offline,
        ..Settings::default()
    };
    let ctx = ResolutionContext::with_resolver(settings, Arc::new(resolver), load_path).unwrap();
    let recorder = Arc::new(RecordingListener::new());
    ctx.add_listener(recorder.clone());
    (ctx, recorder)
}

#[test]
fn transitive_ensure_adds_both_files() {
    let server = MockServer::start();
    let repo = serve_widget(&server);
    let cache = TempDir::new().unwrap();
    let (ctx, recorder) = context(resolver(&server, cache.path()), LoadPath::default(), false);

    let outcome = ctx.ensure_reference(WIDGET, true).unwrap();

    assert_eq!(outcome.artifacts().len(), 2);
    let entries = ctx.load_path().entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|p| p.is_file()));
    assert!(entries[0].ends_with("org/example/widget/1.0/widget-1.0.jar"));
    assert_eq!(std::fs::read_to_string(&entries[1]).unwrap(), "support bytes");

    let downloaded: Vec<String> = recorder.downloaded().iter().map(|c| c.to_string()).collect();
    assert_eq!(
        downloaded,
        vec!["org.example:widget:1.0", "org.example:widget-support:1.0"]
    );
    repo.widget.assert_calls(1);
    repo.support.assert_calls(1);
}

#[test]
fn preseeded_support_is_already_available() {
    let server = MockServer::start();
    serve_widget(&server);
    let cache = TempDir::new().unwrap();
    let load_path = LoadPath::new(["/opt/conduit/lib/widget-support-1.0.jar"]);
    let (ctx, recorder) = context(resolver(&server, cache.path()), load_path, false);

    ctx.ensure_reference(WIDGET, true).unwrap();

    assert_eq!(recorder.downloaded().len(), 1);
    assert_eq!(recorder.already_available().len(), 1);
    assert_eq!(recorder.already_available()[0].name(), "widget-support");
    assert_eq!(ctx.load_path().entries().len(), 1);
}

#[test]
fn repeated_ensure_is_idempotent() {
    let server = MockServer::start();
    let repo = serve_widget(&server);
    let cache = TempDir::new().unwrap();
    let (ctx, recorder) = context(resolver(&server, cache.path()), LoadPath::default(), false);

    ctx.ensure_reference(WIDGET, true).unwrap();
    let second = ctx.ensure_reference(WIDGET, true).unwrap();

    assert_eq!(second, EnsureOutcome::AlreadyAvailable);
    assert_eq!(ctx.load_path().entries().len(), 2);
    assert_eq!(recorder.downloaded().len(), 2);
    repo.widget.assert_calls(1);
}

#[test]
fn startup_entry_short_circuits() {
    let server = MockServer::start();
    let repo = serve_widget(&server);
    let cache = TempDir::new().unwrap();
    let load_path = LoadPath::new(["/opt/conduit/lib/widget-1.0.jar"]);
    let (ctx, recorder) = context(resolver(&server, cache.path()), load_path, false);

    let outcome = ctx.ensure_reference(WIDGET, true).unwrap();

    assert_eq!(outcome, EnsureOutcome::AlreadyAvailable);
    assert_eq!(recorder.already_available().len(), 1);
    assert!(recorder.downloaded().is_empty());
    repo.widget.assert_calls(0);
    repo.support.assert_calls(0);
}

#[test]
fn cached_artifacts_resolve_offline() {
    let server = MockServer::start();
    let repo = serve_widget(&server);
    let cache = TempDir::new().unwrap();

    let (online, _) = context(resolver(&server, cache.path()), LoadPath::default(), false);
    online.ensure_reference(WIDGET, true).unwrap();

    let (offline, recorder) = context(resolver(&server, cache.path()), LoadPath::default(), true);
    offline.ensure_reference(WIDGET, true).unwrap();

    assert_eq!(recorder.downloaded().len(), 2);
    repo.widget.assert_calls(1);
    repo.support.assert_calls(1);
}

#[test]
fn offline_miss_is_a_resolution_failure() {
    let server = MockServer::start();
    let cache = TempDir::new().unwrap();
    let (ctx, recorder) = context(resolver(&server, cache.path()), LoadPath::default(), true);

    let err = ctx.ensure_reference(WIDGET, true).unwrap_err();

    match err {
        DepsError::ResolutionFailure { coordinate, .. } => {
            assert_eq!(coordinate, "org.example:widget:1.0");
        }
        other => panic!("expected ResolutionFailure, got {:?}", other),
    }
    assert!(ctx.load_path().entries().is_empty());
    assert_eq!(recorder.requested().len(), 1);
}

#[test]
fn missing_support_fails_the_whole_ensure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/org/example/widget/1.0/widget-1.0.jar");
        then.status(200).body("widget bytes");
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/org/example/widget/1.0/widget-1.0.deps.json");
        then.status(200)
            .body(r#"{"dependencies":[{"coordinate":"org.example:widget-support:1.0"}]}"#);
    });
    let cache = TempDir::new().unwrap();
    let (ctx, recorder) = context(resolver(&server, cache.path()), LoadPath::default(), false);

    let err = ctx.ensure_reference(WIDGET, true).unwrap_err();

    assert!(err.to_string().contains("widget-support"));
    assert!(ctx.load_path().entries().is_empty());
    assert!(recorder.downloaded().is_empty());
}
