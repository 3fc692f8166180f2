#![forbid(unsafe_code)]

pub mod json_file;
pub mod repository;
pub mod sqlite;

pub use json_file::JsonFileRepository;
pub use repository::{DocumentRepository, DocumentTemplate, InitOutcome, Storage, StorageError};
