//! Concrete `MemoryStore` backends (C11/C12) and the factory that picks
//! between them (C13).

pub mod factory;
pub mod keyword;
pub mod vector;

pub use factory::{create_memory_store, DegradationRecord, DegradationTracker, StoreConfig};
pub use keyword::KeywordStore;
pub use vector::VectorStore;
