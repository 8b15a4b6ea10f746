use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::index::CreationIndex;

/// Prefix of in-flight temp files; such files are never treated as entries
const TEMP_PREFIX: &str = ".qp-tmp-";

/// Maps every character outside `[A-Za-z0-9._-]` to `-`
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Commands processed by the single cache writer task
enum CacheCommand {
    Store {
        key: String,
        bytes: Vec<u8>,
        ack: Option<oneshot::Sender<()>>,
    },
    Delete {
        key: String,
        ack: oneshot::Sender<()>,
    },
    Bootstrap {
        entries: Vec<(String, Vec<u8>)>,
        ack: oneshot::Sender<usize>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
}

/// Bounded on-disk blob store, one file per key under a single root.
///
/// Reads go straight to the filesystem. Every mutation is funnelled through
/// one background writer, which owns the creation-order index and evicts the
/// oldest entries once `max_entries` is exceeded. Writes land in a temp file
/// that is renamed into place, so readers never see partial content.
///
/// No operation returns an error: I/O failures are logged and degrade to a
/// miss.
#[derive(Clone)]
pub struct AssetCache {
    root: PathBuf,
    write_tx: mpsc::UnboundedSender<CacheCommand>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to stop and waits until queued writes are flushed
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
        tracing::info!("Cache writer stopped");
    }
}

impl AssetCache {
    /// Opens the cache at `root` and spawns its writer task.
    ///
    /// The creation-order index is rebuilt from a single directory scan here;
    /// afterwards it is maintained incrementally.
    pub async fn open(root: impl Into<PathBuf>, max_entries: usize) -> (Self, CacheWriterHandle) {
        let root = root.into();

        if let Err(e) = tokio::fs::create_dir_all(&root).await {
            tracing::error!(error = %e, root = %root.display(), "Failed to create cache directory");
        }

        let mut writer = CacheWriter {
            root: root.clone(),
            max_entries,
            index: scan_entries(&root).await,
            temp_seq: 0,
        };
        writer.evict_overflow().await;

        tracing::info!(
            root = %root.display(),
            entries = writer.index.len(),
            max_entries,
            "Asset cache opened"
        );

        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(async move {
            writer.run(write_rx, shutdown_rx).await;
        });

        (Self { root, write_tx }, CacheWriterHandle { shutdown_tx, task })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a file exists for `key`
    pub async fn has(&self, key: &str) -> bool {
        let Some(path) = self.entry_path(key) else {
            return false;
        };
        match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata.is_file(),
            Err(e) => {
                if e.kind() != ErrorKind::NotFound {
                    tracing::warn!(error = %e, key = %key, "Cache stat failed");
                }
                false
            }
        }
    }

    /// Stored bytes for `key`, or `None` on a miss or any read error
    pub async fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "Cache read failed");
                None
            }
        }
    }

    /// Writes `bytes` under `key`, then runs the eviction sweep.
    ///
    /// Resolves once the writer has processed the request.
    pub async fn store(&self, key: &str, bytes: Vec<u8>) {
        let (ack, done) = oneshot::channel();
        self.send(CacheCommand::Store {
            key: key.to_string(),
            bytes,
            ack: Some(ack),
        });
        let _ = done.await;
    }

    /// Queues a store without waiting for it
    pub fn store_in_background(&self, key: &str, bytes: Vec<u8>) {
        self.send(CacheCommand::Store {
            key: key.to_string(),
            bytes,
            ack: None,
        });
    }

    /// Removes the entry for `key` if present
    pub async fn delete(&self, key: &str) {
        let (ack, done) = oneshot::channel();
        self.send(CacheCommand::Delete {
            key: key.to_string(),
            ack,
        });
        let _ = done.await;
    }

    /// Stores every `(key, bytes)` pair that is not already cached.
    ///
    /// Returns how many entries were written; a second call with the same
    /// entries writes nothing.
    pub async fn bootstrap(&self, entries: Vec<(String, Vec<u8>)>) -> usize {
        let (ack, done) = oneshot::channel();
        self.send(CacheCommand::Bootstrap { entries, ack });
        done.await.unwrap_or(0)
    }

    /// Number of entries currently tracked by the writer
    pub async fn len(&self) -> usize {
        let (reply, done) = oneshot::channel();
        self.send(CacheCommand::Len { reply });
        done.await.unwrap_or(0)
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn send(&self, command: CacheCommand) {
        if let Err(e) = self.write_tx.send(command) {
            tracing::error!(error = %e, "Failed to send cache command, writer is gone");
        }
    }

    fn entry_path(&self, key: &str) -> Option<PathBuf> {
        entry_name(key).map(|name| self.root.join(name))
    }
}

impl std::fmt::Display for CacheCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheCommand::Store { key, bytes, .. } => write!(f, "store {} ({} bytes)", key, bytes.len()),
            CacheCommand::Delete { key, .. } => write!(f, "delete {}", key),
            CacheCommand::Bootstrap { entries, .. } => write!(f, "bootstrap {} entries", entries.len()),
            CacheCommand::Len { .. } => write!(f, "len"),
        }
    }
}

/// Sanitized file name for `key`, or `None` when the key cannot name a file
fn entry_name(key: &str) -> Option<String> {
    let name = sanitize_key(key);
    if name.is_empty() || name.chars().all(|c| c == '.') || name.starts_with(TEMP_PREFIX) {
        return None;
    }
    Some(name)
}

/// Builds the creation-order index from the files under `root`.
///
/// Leftover temp files from an interrupted write are removed.
async fn scan_entries(root: &Path) -> CreationIndex {
    let mut found = Vec::new();

    let mut dir = match tokio::fs::read_dir(root).await {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!(error = %e, root = %root.display(), "Cache directory unreadable");
            return CreationIndex::new();
        }
    };

    loop {
        let entry = match dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Cache directory listing interrupted");
                break;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(TEMP_PREFIX) {
            let _ = tokio::fs::remove_file(entry.path()).await;
            continue;
        }

        match entry.metadata().await {
            Ok(metadata) if metadata.is_file() => {
                let created = metadata
                    .created()
                    .or_else(|_| metadata.modified())
                    .unwrap_or(SystemTime::UNIX_EPOCH);
                found.push((DateTime::<Utc>::from(created), name));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, name = %name, "Cache stat failed"),
        }
    }

    // Name breaks timestamp ties so the rebuilt order is deterministic
    found.sort();

    let mut index = CreationIndex::new();
    for (created, name) in found {
        index.insert(name, created);
    }
    index
}

/// State owned by the writer task
struct CacheWriter {
    root: PathBuf,
    max_entries: usize,
    index: CreationIndex,
    /// Numbers temp files so their names stay short whatever the key length
    temp_seq: u64,
}

impl CacheWriter {
    /// Processes commands until shutdown, then drains whatever is still queued
    async fn run(
        mut self,
        mut write_rx: mpsc::UnboundedReceiver<CacheCommand>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::debug!("Cache writer task started");

        loop {
            tokio::select! {
                command = write_rx.recv() => match command {
                    Some(command) => self.apply(command).await,
                    None => break,
                },
                Some(()) = shutdown_rx.recv() => {
                    let mut flushed = 0;
                    while let Ok(command) = write_rx.try_recv() {
                        self.apply(command).await;
                        flushed += 1;
                    }
                    tracing::info!(flushed, "Cache writer shutting down");
                    break;
                }
            }
        }
    }

    async fn apply(&mut self, command: CacheCommand) {
        tracing::trace!(command = %command, "Applying cache command");

        match command {
            CacheCommand::Store { key, bytes, ack } => {
                self.store(&key, &bytes).await;
                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
            CacheCommand::Delete { key, ack } => {
                if let Some(name) = entry_name(&key) {
                    self.index.remove(&name);
                    self.remove_file(&name).await;
                }
                let _ = ack.send(());
            }
            CacheCommand::Bootstrap { entries, ack } => {
                let mut written = 0;
                for (key, bytes) in entries {
                    let Some(name) = entry_name(&key) else {
                        continue;
                    };
                    if file_exists(&self.root.join(&name)).await {
                        continue;
                    }
                    if self.store(&key, &bytes).await {
                        written += 1;
                    }
                }
                if written > 0 {
                    tracing::info!(written, "Bootstrapped bundled cache entries");
                }
                let _ = ack.send(written);
            }
            CacheCommand::Len { reply } => {
                let _ = reply.send(self.index.len());
            }
        }
    }

    /// Writes one entry and sweeps; returns whether the write landed
    async fn store(&mut self, key: &str, bytes: &[u8]) -> bool {
        let Some(name) = entry_name(key) else {
            tracing::warn!(key = %key, "Refusing to cache unnamed key");
            return false;
        };

        match self.write_atomic(&name, bytes).await {
            Ok(()) => {
                self.index.insert(name, Utc::now());
                self.evict_overflow().await;
                true
            }
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache write failed");
                false
            }
        }
    }

    async fn write_atomic(&mut self, name: &str, bytes: &[u8]) -> std::io::Result<()> {
        self.temp_seq += 1;
        let temp = self.root.join(format!("{}{}", TEMP_PREFIX, self.temp_seq));
        let target = self.root.join(name);

        let result = async {
            let mut file = tokio::fs::File::create(&temp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            // A fresh inode per write keeps the file's creation time in step with the index
            tokio::fs::rename(&temp, &target).await
        }
        .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(&temp).await;
        }
        result
    }

    async fn evict_overflow(&mut self) {
        let evicted = self.index.drain_overflow(self.max_entries);
        if evicted.is_empty() {
            return;
        }
        for name in &evicted {
            self.remove_file(name).await;
        }
        tracing::debug!(
            evicted = evicted.len(),
            remaining = self.index.len(),
            "Cache eviction sweep"
        );
    }

    async fn remove_file(&self, name: &str) {
        match tokio::fs::remove_file(self.root.join(name)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, name = %name, "Cache delete failed"),
        }
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}
