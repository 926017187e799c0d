#![forbid(unsafe_code)]

pub mod store;

pub use store::{FailingStore, JsonFileStore, KeyValueStore, MemoryStore, Storage, StorageError};
