//! Demand resolvers wired through a resolution context.

use conduit_deps::config::Settings;
use conduit_deps::coordinate::Coordinate;
use conduit_deps::demand::{Capability, CapabilityKind, CapabilityResolver, TemplateSource};
use conduit_deps::download::RecordingListener;
use conduit_deps::loadpath::LoadPath;
use conduit_deps::repository::{
    ArtifactResolver, ArtifactSource, ResolveRequest, ResolvedArtifact,
};
use conduit_deps::{DepsError, ResolutionContext, Result};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Resolves every coordinate to a file name under `/cache`.
#[derive(Default)]
struct Catalogued {
    calls: Mutex<Vec<Coordinate>>,
}

impl Catalogued {
    fn names(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }
}

impl ArtifactResolver for Catalogued {
    fn resolve(&self, request: &ResolveRequest) -> Result<Vec<ResolvedArtifact>> {
        self.calls
            .lock()
            .unwrap()
            .extend(request.coordinates.iter().cloned());
        Ok(request
            .coordinates
            .iter()
            .map(|c| ResolvedArtifact {
                coordinate: c.clone(),
                file: PathBuf::from("/cache").join(c.file_name()),
                source: ArtifactSource::Cache,
            })
            .collect())
    }
}

/// Host resolver that knows every name it is asked about.
#[derive(Default)]
struct Host {
    calls: AtomicUsize,
}

impl CapabilityResolver for Host {
    fn resolve(&self, name: &str) -> Result<Option<Capability>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(
            Capability::new(CapabilityKind::Component, name).with_provider("host"),
        ))
    }
}

/// Host resolver that knows nothing.
struct Empty;

impl CapabilityResolver for Empty {
    fn resolve(&self, _name: &str) -> Result<Option<Capability>> {
        Ok(None)
    }
}

fn context(settings: Settings) -> (ResolutionContext, Arc<Catalogued>, Arc<RecordingListener>) {
    let artifacts = Arc::new(Catalogued::default());
    let settings = Settings {
        engine_version: "4.2.0".into(),
        ..settings
    };
    let ctx =
        ResolutionContext::with_resolver(settings, artifacts.clone(), LoadPath::default()).unwrap();
    let recorder = Arc::new(RecordingListener::new());
    ctx.add_listener(recorder.clone());
    (ctx, artifacts, recorder)
}

#[test]
fn component_is_downloaded_before_the_host_resolves_it() {
    let (ctx, artifacts, recorder) = context(Settings::default());
    let host = Arc::new(Host::default());
    let resolver = ctx.demand_resolver(CapabilityKind::Component, host.clone());

    let capability = resolver.resolve("kafka").unwrap().unwrap();

    assert_eq!(capability.provider.as_deref(), Some("host"));
    assert_eq!(artifacts.names(), vec!["conduit-kafka"]);
    assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    assert!(ctx
        .load_path()
        .entries()
        .contains(&PathBuf::from("/cache/conduit-kafka-4.2.0.jar")));
    assert_eq!(recorder.downloaded().len(), 1);
}

#[test]
fn rest_brings_direct_along() {
    let (ctx, artifacts, _) = context(Settings::default());
    let resolver = ctx.demand_resolver(CapabilityKind::Component, Arc::new(Host::default()));

    resolver.resolve("rest").unwrap().unwrap();

    let names = artifacts.names();
    assert!(names.contains(&"conduit-rest".to_string()));
    assert!(names.contains(&"conduit-direct".to_string()));
}

#[test]
fn jms_brings_the_connection_pool() {
    let (ctx, artifacts, _) = context(Settings::default());
    let resolver = ctx.demand_resolver(CapabilityKind::Component, Arc::new(Host::default()));

    resolver.resolve("jms").unwrap().unwrap();

    assert!(artifacts.names().contains(&"pooled-jms".to_string()));
}

#[test]
fn stub_everything_still_records_requirements() {
    let (ctx, artifacts, recorder) = context(Settings {
        stub_pattern: Some("*".into()),
        ..Settings::default()
    });
    let host = Arc::new(Host::default());

    for kind in [CapabilityKind::Component, CapabilityKind::DataFormat] {
        let resolver = ctx.demand_resolver(kind, host.clone());
        let capability = resolver.resolve("kafka").unwrap().unwrap();
        assert!(capability.is_stub());
        assert_eq!(capability.kind, kind);
    }

    assert_eq!(host.calls.load(Ordering::SeqCst), 0);
    assert_eq!(artifacts.names(), vec!["conduit-kafka"]);
    let requested: Vec<String> = recorder.requested().iter().map(|c| c.to_string()).collect();
    assert_eq!(requested, vec!["dev.conduit:conduit-kafka:4.2.0"]);
}

#[test]
fn stub_list_only_replaces_named_components() {
    let (ctx, artifacts, _) = context(Settings {
        stub_pattern: Some("jms,kafka".into()),
        ..Settings::default()
    });
    let host = Arc::new(Host::default());
    let resolver = ctx.demand_resolver(CapabilityKind::Component, host.clone());

    assert!(resolver.resolve("jms").unwrap().unwrap().is_stub());
    assert!(!resolver.resolve("timer").unwrap().unwrap().is_stub());

    assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    let names = artifacts.names();
    assert!(names.contains(&"conduit-jms".to_string()));
    assert!(names.contains(&"conduit-timer".to_string()));
}

#[test]
fn silent_mode_stubs_listening_components() {
    let (ctx, artifacts, _) = context(Settings {
        silent: true,
        ..Settings::default()
    });
    let resolver = ctx.demand_resolver(CapabilityKind::Component, Arc::new(Host::default()));

    assert!(resolver.resolve("netty-http").unwrap().unwrap().is_stub());
    assert!(!resolver.resolve("log").unwrap().unwrap().is_stub());
    assert_eq!(artifacts.names(), vec!["conduit-netty-http", "conduit-log"]);
}

#[test]
fn unknown_component_suggests_the_closest_name() {
    let (ctx, _, _) = context(Settings::default());
    let resolver = ctx.demand_resolver(CapabilityKind::Component, Arc::new(Empty));

    let err = resolver.resolve("dirct").unwrap_err();

    assert_eq!(err.to_string(), "Unknown component 'dirct'. Did you mean 'direct'?");
    assert!(matches!(err, DepsError::UnknownCapability { .. }));
}

#[test]
fn templates_from_a_project_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("orders.template.yaml"),
        r#"
spec:
  dependencies:
    - "conduit:kamelet"
    - "conduit:sql"
    - "mvn:org.postgresql:postgresql:42.7.3"
"#,
    )
    .unwrap();
    let (ctx, artifacts, recorder) = context(Settings {
        template_dirs: vec![dir.path().to_path_buf()],
        ..Settings::default()
    });
    let resolver = ctx.template_resolver(Arc::new(Host::default()), TemplateSource::empty());

    resolver.resolve("orders").unwrap().unwrap();

    assert_eq!(artifacts.names(), vec!["conduit-sql", "postgresql"]);
    assert_eq!(recorder.templates(), vec!["orders"]);
}
