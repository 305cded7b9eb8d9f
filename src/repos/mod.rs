pub mod error;
pub mod memory;
pub mod pg;
pub mod store;

pub use memory::MemoryListStore;
pub use pg::PgListStore;
pub use store::{ItemRow, ListRow, ListStore};
