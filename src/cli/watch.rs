//! Re-parse a transcript file whenever it changes, using notify.

use super::{check_source, decode, read_source};
use crate::config::Config;
use crate::transcript::ParseReport;
use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Watches one transcript file for writes.
pub struct TranscriptWatcher {
    _watcher: RecommendedWatcher,
    /// Receives the path each time the file is modified or recreated.
    pub rx: Receiver<PathBuf>,
    path: PathBuf,
}

impl TranscriptWatcher {
    /// Start watching `path`. The parent directory is watched so that
    /// editors which replace the file on save are still noticed.
    pub fn new(path: &Path) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("Not a file: {}", path.display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .with_context(|| format!("No parent directory for {}", path.display()))?;

        let (tx, rx) = channel::<PathBuf>();
        let target = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => Self::handle_event(&event, &file_name, &target, &tx),
                Err(err) => tracing::warn!(error = %err, "watch error"),
            },
            notify::Config::default(),
        )?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;

        Ok(Self {
            _watcher: watcher,
            rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn handle_event(event: &Event, file_name: &OsString, target: &Path, tx: &Sender<PathBuf>) {
        // Only handle writes and recreations
        if !(event.kind.is_modify() || event.kind.is_create()) {
            return;
        }
        if event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
        {
            let _ = tx.send(target.to_path_buf());
        }
    }
}

/// One-line description of a parse result.
pub fn summarize(report: &ParseReport) -> String {
    let conversation = &report.conversation;
    format!(
        "{}: {} message(s), {} participant(s), {} diagnostic(s)",
        conversation.config.title,
        conversation.messages.len(),
        conversation.participants.len(),
        report.diagnostics.len()
    )
}

fn reparse(path: &Path, config: &Config) -> Result<ParseReport> {
    let bytes = read_source(path)?;
    let source = decode(&bytes, path)?;
    Ok(check_source(&source, config))
}

/// `chatblock watch`: print a summary now and after every change, until the
/// channel closes or the process is interrupted.
pub fn run_watch(path: &Path, config: &Config) -> Result<()> {
    let watcher = TranscriptWatcher::new(path)?;
    tracing::info!(path = %watcher.path().display(), "watching");

    let mut last = None;
    loop {
        match reparse(watcher.path(), config) {
            Ok(report) => {
                let line = summarize(&report);
                // Saves often fire several events; print only real changes.
                if last.as_ref() != Some(&line) {
                    println!("{line}");
                    last = Some(line);
                }
            }
            Err(err) => eprintln!("Warning: {err:#}"),
        }

        if watcher.rx.recv().is_err() {
            return Ok(());
        }
        // Coalesce bursts of events from a single save
        while watcher.rx.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, EventKind, ModifyKind};
    use std::time::Duration;

    #[test]
    fn test_summarize() {
        let report = check_source(
            "#title=Standup\n@alice\nalice: hi\nbob: hey",
            &Config::default(),
        );
        assert_eq!(
            summarize(&report),
            "Standup: 2 message(s), 1 participant(s), 1 diagnostic(s)"
        );
    }

    #[test]
    fn test_handle_event_filters_by_file_name() {
        let (tx, rx) = channel();
        let name = OsString::from("a.chat");
        let target = PathBuf::from("/tmp/a.chat");

        let other = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any)))
            .add_path(PathBuf::from("/tmp/b.chat"));
        TranscriptWatcher::handle_event(&other, &name, &target, &tx);
        assert!(rx.try_recv().is_err());

        let ours = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/a.chat"));
        TranscriptWatcher::handle_event(&ours, &name, &target, &tx);
        assert_eq!(rx.try_recv().unwrap(), target);
    }

    #[test]
    fn test_handle_event_ignores_access() {
        let (tx, rx) = channel();
        let name = OsString::from("a.chat");
        let event = Event::new(EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/tmp/a.chat"));
        TranscriptWatcher::handle_event(&event, &name, Path::new("/tmp/a.chat"), &tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_watcher_sees_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.chat");
        std::fs::write(&path, "alice: hi").unwrap();

        let watcher = TranscriptWatcher::new(&path).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        std::fs::write(&path, "alice: hi\nbob: yo").unwrap();

        let changed = watcher.rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(changed, watcher.path());
    }

    #[test]
    fn test_watcher_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(TranscriptWatcher::new(&dir.path().join("nope.chat")).is_err());
    }
}
