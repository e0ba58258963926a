//! Storage backends for alert rules.

mod memory;
mod sqlite;

pub use memory::MemoryAlertRepository;
pub use sqlite::SqliteAlertRepository;
