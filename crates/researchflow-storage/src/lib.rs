//! Local persistence for researchflow: paths, JSON file I/O and the key-value store

mod io;
pub mod keys;
mod paths;
mod store;

pub use io::{atomic_write, read_json, write_json};
pub use paths::{Paths, HOME_ENV};
pub use store::{load_json, save_json, FileStore, KeyValueStore, MemoryStore, StoreError};
