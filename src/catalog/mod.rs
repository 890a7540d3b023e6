mod manager;
mod mock_catalog;
mod sqlite_manager;

pub use manager::{CatalogManager, DatasetRecord, UserRecord};
pub use mock_catalog::MockCatalog;
pub use sqlite_manager::SqliteCatalogManager;
