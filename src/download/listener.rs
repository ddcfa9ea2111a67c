//! Download event hooks.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use crate::coordinate::Coordinate;

/// Observer of resolution activity.
///
/// Every hook defaults to a no-op. Hooks may be called from worker threads.
pub trait DownloadListener: Send + Sync {
    /// A coordinate was requested, before any availability check.
    fn on_download_requested(&self, _coordinate: &Coordinate) {}

    /// An artifact was added to the load path.
    fn on_downloaded(&self, _coordinate: &Coordinate, _file: &Path) {}

    /// A requested artifact was already on the load path.
    fn on_already_available(&self, _coordinate: &Coordinate) {}

    /// A coordinate's group needs an extra repository.
    fn on_extra_repository_needed(&self, _url: &str) {}

    /// A route template's text was loaded.
    fn on_template_loaded(&self, _name: &str, _content: &str) {}
}

/// The set of listeners registered with a context.
#[derive(Default)]
pub struct Listeners {
    inner: RwLock<Vec<Arc<dyn DownloadListener>>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn DownloadListener>) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(listener);
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Listeners are called outside the lock so they may register others.
    fn snapshot(&self) -> Vec<Arc<dyn DownloadListener>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn download_requested(&self, coordinate: &Coordinate) {
        for listener in self.snapshot() {
            listener.on_download_requested(coordinate);
        }
    }

    pub fn downloaded(&self, coordinate: &Coordinate, file: &Path) {
        for listener in self.snapshot() {
            listener.on_downloaded(coordinate, file);
        }
    }

    pub fn already_available(&self, coordinate: &Coordinate) {
        for listener in self.snapshot() {
            listener.on_already_available(coordinate);
        }
    }

    pub fn extra_repository_needed(&self, url: &str) {
        for listener in self.snapshot() {
            listener.on_extra_repository_needed(url);
        }
    }

    pub fn template_loaded(&self, name: &str, content: &str) {
        for listener in self.snapshot() {
            listener.on_template_loaded(name, content);
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}

/// A recorded listener event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadEvent {
    Requested(Coordinate),
    Downloaded { coordinate: Coordinate, file: PathBuf },
    AlreadyAvailable(Coordinate),
    ExtraRepository(String),
    TemplateLoaded(String),
}

/// Captures every event, e.g. to export the set of requirements a run needed.
#[derive(Debug, Default)]
pub struct RecordingListener {
    events: Mutex<Vec<DownloadEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: DownloadEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }

    /// All events in arrival order.
    pub fn events(&self) -> Vec<DownloadEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Coordinates requested, without duplicates, in first-request order.
    pub fn requested(&self) -> Vec<Coordinate> {
        let mut out: Vec<Coordinate> = Vec::new();
        for event in self.events() {
            if let DownloadEvent::Requested(c) = event {
                if !out.contains(&c) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Coordinates that were downloaded and added to the load path.
    pub fn downloaded(&self) -> Vec<Coordinate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::Downloaded { coordinate, .. } => Some(coordinate),
                _ => None,
            })
            .collect()
    }

    /// Coordinates reported as already available.
    pub fn already_available(&self) -> Vec<Coordinate> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::AlreadyAvailable(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Extra repositories reported as needed.
    pub fn extra_repositories(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::ExtraRepository(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Names of loaded templates.
    pub fn templates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                DownloadEvent::TemplateLoaded(name) => Some(name),
                _ => None,
            })
            .collect()
    }
}

impl DownloadListener for RecordingListener {
    fn on_download_requested(&self, coordinate: &Coordinate) {
        self.record(DownloadEvent::Requested(coordinate.clone()));
    }

    fn on_downloaded(&self, coordinate: &Coordinate, file: &Path) {
        self.record(DownloadEvent::Downloaded {
            coordinate: coordinate.clone(),
            file: file.to_path_buf(),
        });
    }

    fn on_already_available(&self, coordinate: &Coordinate) {
        self.record(DownloadEvent::AlreadyAvailable(coordinate.clone()));
    }

    fn on_extra_repository_needed(&self, url: &str) {
        self.record(DownloadEvent::ExtraRepository(url.to_string()));
    }

    fn on_template_loaded(&self, name: &str, _content: &str) {
        self.record(DownloadEvent::TemplateLoaded(name.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silent;
    impl DownloadListener for Silent {}

    #[test]
    fn default_hooks_are_noops() {
        let listeners = Listeners::new();
        listeners.add(Arc::new(Silent));
        listeners.download_requested(&Coordinate::parse("a.b:c:1", None));
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn fans_out_to_every_listener() {
        let listeners = Listeners::new();
        let first = Arc::new(RecordingListener::new());
        let second = Arc::new(RecordingListener::new());
        listeners.add(first.clone());
        listeners.add(second.clone());

        let c = Coordinate::parse("a.b:c:1", None);
        listeners.already_available(&c);
        listeners.extra_repository_needed("https://repo.example");

        for recorder in [first, second] {
            assert_eq!(recorder.already_available(), vec![c.clone()]);
            assert_eq!(recorder.extra_repositories(), vec!["https://repo.example"]);
        }
    }

    #[test]
    fn requested_is_deduplicated() {
        let recorder = RecordingListener::new();
        let a = Coordinate::parse("a.b:a:1", None);
        let b = Coordinate::parse("a.b:b:1", None);
        recorder.on_download_requested(&a);
        recorder.on_download_requested(&b);
        recorder.on_download_requested(&a);

        assert_eq!(recorder.requested(), vec![a, b]);
        assert_eq!(recorder.events().len(), 3);
    }

    #[test]
    fn records_downloads_and_templates() {
        let recorder = RecordingListener::new();
        let c = Coordinate::parse("a.b:c:1", None);
        recorder.on_downloaded(&c, Path::new("/tmp/c-1.jar"));
        recorder.on_template_loaded("timer-source", "apiVersion: v1");

        assert_eq!(recorder.downloaded(), vec![c]);
        assert_eq!(recorder.templates(), vec!["timer-source"]);
    }
}
