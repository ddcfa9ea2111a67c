//! The running program's code-search path.
//!
//! A [`LoadPath`] combines the entries the process started with and the
//! files added while it runs. Additions are serialized by a write lock and
//! re-checked under it, so concurrent resolutions never add a file twice.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::download::Listeners;
use crate::error::Result;

/// Environment variable holding the startup module path.
pub const MODULE_PATH_ENV: &str = "CONDUIT_MODULE_PATH";

/// Makes files available to the running program.
pub trait ModuleLoader: Send + Sync {
    /// Register a newly resolved module.
    fn add_module(&self, path: &Path) -> Result<()>;

    /// Whether the loader already has the coordinate's module.
    fn is_loaded(&self, coordinate: &Coordinate) -> bool;
}

/// Records modules so the next process start can put them on its path.
#[derive(Debug, Default)]
pub struct DeferredLoader {
    modules: Mutex<Vec<PathBuf>>,
}

impl DeferredLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modules recorded so far.
    pub fn modules(&self) -> Vec<PathBuf> {
        self.modules.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Render the recorded modules as a platform path list, ready for
    /// `CONDUIT_MODULE_PATH`.
    pub fn module_path(&self) -> Result<String> {
        let joined = std::env::join_paths(self.modules()).map_err(anyhow::Error::from)?;
        Ok(joined.to_string_lossy().into_owned())
    }
}

impl ModuleLoader for DeferredLoader {
    fn add_module(&self, path: &Path) -> Result<()> {
        debug!("Deferring module {} to next start", path.display());
        self.modules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());
        Ok(())
    }

    fn is_loaded(&self, coordinate: &Coordinate) -> bool {
        let target = coordinate.target();
        self.modules()
            .iter()
            .any(|p| p.to_string_lossy().contains(&target))
    }
}

/// Startup snapshot plus dynamically added files.
pub struct LoadPath {
    startup: Vec<String>,
    dynamic: RwLock<Vec<PathBuf>>,
    loader: Box<dyn ModuleLoader>,
}

impl LoadPath {
    /// Create a load path from explicit startup entries.
    pub fn new<I, S>(startup: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            startup: startup.into_iter().map(Into::into).collect(),
            dynamic: RwLock::new(Vec::new()),
            loader: Box::new(DeferredLoader::new()),
        }
    }

    /// Capture the startup entries from `CONDUIT_MODULE_PATH`.
    pub fn from_env() -> Self {
        let entries: Vec<String> = std::env::var_os(MODULE_PATH_ENV)
            .map(|value| {
                std::env::split_paths(&value)
                    .map(|p| p.to_string_lossy().into_owned())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
            .unwrap_or_default();
        debug!("Load path starts with {} entries", entries.len());
        Self::new(entries)
    }

    /// Replace the module loader.
    pub fn with_loader(mut self, loader: Box<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn loader(&self) -> &dyn ModuleLoader {
        self.loader.as_ref()
    }

    /// Entries the process started with.
    pub fn startup(&self) -> &[String] {
        &self.startup
    }

    /// Whether the coordinate's `name-version` appears on the load path.
    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        let target = coordinate.target();
        if self.startup.iter().any(|entry| entry.contains(&target)) {
            return true;
        }
        self.dynamic
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|p| p.to_string_lossy().contains(&target))
    }

    /// Like [`contains`](Self::contains), notifying `on_already_available`
    /// on a hit.
    pub fn is_available(&self, coordinate: &Coordinate, listeners: &Listeners) -> bool {
        let found = self.contains(coordinate);
        if found {
            listeners.already_available(coordinate);
        }
        found
    }

    /// Add a file to the load path. Returns false if it was already there.
    pub fn extend(&self, file: &Path) -> Result<bool> {
        if self.has_file(file) {
            return Ok(false);
        }

        let mut dynamic = self.dynamic.write().unwrap_or_else(|e| e.into_inner());
        if dynamic.iter().any(|p| p == file) {
            return Ok(false);
        }
        self.loader.add_module(file)?;
        dynamic.push(file.to_path_buf());
        debug!("Added {} to load path", file.display());
        Ok(true)
    }

    fn has_file(&self, file: &Path) -> bool {
        self.dynamic
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|p| p == file)
    }

    /// Snapshot of the files added since startup.
    pub fn entries(&self) -> Vec<PathBuf> {
        self.dynamic.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for LoadPath {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl std::fmt::Debug for LoadPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadPath")
            .field("startup", &self.startup)
            .field("dynamic", &self.entries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::RecordingListener;
    use std::sync::Arc;

    fn widget() -> Coordinate {
        Coordinate::parse("org.example:widget:1.0", None)
    }

    #[test]
    fn startup_entries_match_by_name_version() {
        let path = LoadPath::new(["/opt/lib/widget-1.0.jar"]);
        assert!(path.contains(&widget()));
        assert!(!path.contains(&Coordinate::parse("org.example:widget:2.0", None)));
    }

    #[test]
    fn is_available_notifies_once_per_hit() {
        let path = LoadPath::new(["/opt/lib/widget-1.0.jar"]);
        let listeners = Listeners::new();
        let recorder = Arc::new(RecordingListener::new());
        listeners.add(recorder.clone());

        assert!(path.is_available(&widget(), &listeners));
        assert!(!path.is_available(&Coordinate::parse("a.b:c:1", None), &listeners));
        assert_eq!(recorder.already_available(), vec![widget()]);
    }

    #[test]
    fn contains_does_not_notify() {
        let path = LoadPath::new(["/opt/lib/widget-1.0.jar"]);
        assert!(path.contains(&widget()));
    }

    #[test]
    fn extend_adds_once() {
        let path = LoadPath::default();
        let file = Path::new("/cache/widget-1.0.jar");

        assert!(path.extend(file).unwrap());
        assert!(!path.extend(file).unwrap());
        assert_eq!(path.entries(), vec![file.to_path_buf()]);
        assert!(path.contains(&widget()));
    }

    #[test]
    fn concurrent_extend_adds_once() {
        let path = Arc::new(LoadPath::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                std::thread::spawn(move || path.extend(Path::new("/cache/widget-1.0.jar")).unwrap())
            })
            .collect();

        let added = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|added| *added)
            .count();
        assert_eq!(added, 1);
        assert_eq!(path.entries().len(), 1);
    }

    #[test]
    fn deferred_loader_records_modules() {
        let loader = DeferredLoader::new();
        loader.add_module(Path::new("/cache/widget-1.0.jar")).unwrap();

        assert!(loader.is_loaded(&widget()));
        assert_eq!(loader.modules().len(), 1);
        assert!(loader.module_path().unwrap().contains("widget-1.0.jar"));
    }

    #[test]
    fn extend_forwards_to_loader() {
        struct Counting(Mutex<usize>);
        impl ModuleLoader for Counting {
            fn add_module(&self, _path: &Path) -> Result<()> {
                *self.0.lock().unwrap() += 1;
                Ok(())
            }
            fn is_loaded(&self, _coordinate: &Coordinate) -> bool {
                false
            }
        }

        let path = LoadPath::default().with_loader(Box::new(Counting(Mutex::new(0))));
        path.extend(Path::new("/a.jar")).unwrap();
        path.extend(Path::new("/a.jar")).unwrap();
        path.extend(Path::new("/b.jar")).unwrap();
        assert_eq!(path.entries().len(), 2);
    }
}
