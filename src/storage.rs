//! Key-value persistence with cross-context change notifications.
//!
//! The cart lives in a string key-value store shaped like the browser's
//! `localStorage`. Several contexts (tabs) can share one backend; a write in
//! one context queues a [`StorageEvent`] for every *other* context, which
//! picks it up with [`KeyValueStore::drain_events`] on its next turn.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    rc::Rc,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use parking_lot::Mutex;

use crate::error::StorageError;

/// Notification that `key` was changed by another context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub new_value: Option<String>,
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Takes the change notifications queued by other contexts since the
    /// last call. Writes made through `self` never show up here.
    fn drain_events(&self) -> Vec<StorageEvent>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn drain_events(&self) -> Vec<StorageEvent> {
        (**self).drain_events()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Rc<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn drain_events(&self) -> Vec<StorageEvent> {
        (**self).drain_events()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ContextId(u64);

impl ContextId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        ContextId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Default)]
struct Backend {
    items: HashMap<String, String>,
    queues: HashMap<ContextId, Vec<StorageEvent>>,
}

impl Backend {
    fn broadcast(&mut self, from: ContextId, key: &str, new_value: Option<&str>) {
        for (context, queue) in self.queues.iter_mut() {
            if *context != from {
                queue.push(StorageEvent {
                    key: key.to_string(),
                    new_value: new_value.map(str::to_string),
                });
            }
        }
    }
}

/// In-memory storage. Wrap a handle in an `Arc` to share one context
/// between components; call [`open_context`](Self::open_context) to get a
/// handle that behaves like another tab on the same origin.
pub struct MemoryStorage {
    context: ContextId,
    backend: Arc<Mutex<Backend>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::attach(Arc::new(Mutex::new(Backend::default())))
    }

    fn attach(backend: Arc<Mutex<Backend>>) -> Self {
        let context = ContextId::next();
        backend.lock().queues.insert(context, Vec::new());
        Self { context, backend }
    }

    pub fn open_context(&self) -> Self {
        Self::attach(self.backend.clone())
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.backend.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStorage {
    fn drop(&mut self) {
        self.backend.lock().queues.remove(&self.context);
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.backend.lock().items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut backend = self.backend.lock();
        let unchanged = backend.items.get(key).is_some_and(|old| old == value);
        backend.items.insert(key.to_string(), value.to_string());
        // Browsers skip the event when the stored value did not change.
        if !unchanged {
            backend.broadcast(self.context, key, Some(value));
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut backend = self.backend.lock();
        if backend.items.remove(key).is_some() {
            backend.broadcast(self.context, key, None);
        }
        Ok(())
    }

    fn drain_events(&self) -> Vec<StorageEvent> {
        self.backend
            .lock()
            .queues
            .get_mut(&self.context)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

/// Stores each key as `<dir>/<key>.json`.
///
/// There is no cross-process change notification; `drain_events` is always
/// empty.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        // Write to a sibling file first so readers never see a torn value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)
            .and_then(|_| fs::rename(&tmp, &path))
            .map_err(|source| StorageError::Io { path, source })
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn drain_events(&self) -> Vec<StorageEvent> {
        Vec::new()
    }
}
