//! Local history of scan sessions
//!
//! - [`backend`]: string-set preference storage (file and memory)
//! - [`store`]: [`HistoryStore`], the observable history on top of it

pub mod backend;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, PreferenceBackend, Preferences, StoreError};
pub use store::{HistoryEntry, HistoryStore, HistoryWatcher, HISTORY_KEY};
