//! Configuration file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, so editors
//! and deploy tools that replace the file by rename keep triggering reloads.
//! Events for sibling files are ignored, and a reload only happens when the
//! file's content actually changed since the last one seen.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::RouterConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for validated configuration updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned handle must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut reloader = Reloader::new(self.path.clone(), self.update_tx);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => reloader.handle(&event),
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Event filter and reload state, owned by the watcher callback.
struct Reloader {
    path: PathBuf,
    last_content: Option<String>,
    tx: mpsc::UnboundedSender<RouterConfig>,
}

impl Reloader {
    fn new(path: PathBuf, tx: mpsc::UnboundedSender<RouterConfig>) -> Self {
        let last_content = fs::read_to_string(&path).ok();
        Self {
            path,
            last_content,
            tx,
        }
    }

    fn concerns_config(&self, event: &Event) -> bool {
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return false;
        }
        let Some(name) = self.path.file_name() else {
            return false;
        };
        event.paths.iter().any(|p| p.file_name() == Some(name))
    }

    fn handle(&mut self, event: &Event) {
        if self.concerns_config(event) {
            self.reload();
        }
    }

    fn reload(&mut self) {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // Mid-replace; the rename that follows fires another event.
            Err(e) => {
                tracing::debug!(path = ?self.path, error = %e, "Config file not readable yet");
                return;
            }
        };

        if self.last_content.as_deref() == Some(content.as_str()) {
            return;
        }

        tracing::info!(path = ?self.path, "Config file change detected, reloading");
        let parsed = parse_config(&content);
        self.last_content = Some(content);

        match parsed {
            Ok(config) => {
                let _ = self.tx.send(config);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, EventKind, ModifyKind};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tenant-router-watch-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn replace(path: &Path, content: &str) {
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content).unwrap();
        fs::rename(&tmp, path).unwrap();
    }

    fn domain(name: &str) -> String {
        format!("[routing]\nbase_domain = \"{name}\"\n")
    }

    #[test]
    fn test_reloader_ignores_siblings_and_unchanged_content() {
        let dir = scratch_dir("reloader");
        let path = dir.join("router.toml");
        fs::write(&path, domain("example.com")).unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut reloader = Reloader::new(path.clone(), tx);

        let touched = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(path.clone());
        reloader.handle(&touched);
        assert!(rx.try_recv().is_err(), "unchanged content must not reload");

        fs::write(&path, domain("example.org")).unwrap();
        let sibling = Event::new(EventKind::Modify(ModifyKind::Any)).add_path(dir.join("other.toml"));
        reloader.handle(&sibling);
        assert!(rx.try_recv().is_err(), "sibling file must not reload");

        let created = Event::new(EventKind::Create(CreateKind::File)).add_path(path.clone());
        reloader.handle(&created);
        assert_eq!(rx.try_recv().unwrap().routing.base_domain.as_str(), "example.org");

        reloader.handle(&created);
        assert!(rx.try_recv().is_err(), "repeated event must not reload twice");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_watcher_delivers_valid_reloads_only() {
        let dir = scratch_dir("live");
        let path = dir.join("router.toml");
        fs::write(&path, domain("example.com")).unwrap();

        let (watcher, mut rx) = ConfigWatcher::new(&path);
        let _handle = watcher.run().unwrap();

        replace(&path, &domain("example.org"));
        let config = tokio::time::timeout(Duration::from_secs(10), rx.recv())
            .await
            .expect("no reload within 10s")
            .expect("watcher channel closed");
        assert_eq!(config.routing.base_domain.as_str(), "example.org");

        replace(&path, "[timeouts]\nrequest_secs = 0\n");
        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
        assert!(next.is_err(), "invalid config must not be delivered");

        fs::remove_dir_all(&dir).unwrap();
    }
}
