//! Score store backends.
//!
//! | Backend | Feature | Selected by |
//! |---------|---------|-------------|
//! | [`InMemoryScoreStore`] | always | no `database_url` |
//! | `SqliteScoreStore` | `sqlite` | `database_url` starting with `sqlite:` |

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::InMemoryScoreStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteScoreStore;

use riskzone_kernel::leaderboard::{ScoreStore, StoreError, StoreResult};
use std::sync::Arc;

/// Open the backend named by `database_url`.
pub async fn open_store(database_url: Option<&str>) -> StoreResult<Arc<dyn ScoreStore>> {
    match database_url {
        None => Ok(InMemoryScoreStore::shared()),
        #[cfg(feature = "sqlite")]
        Some(url) if url.starts_with("sqlite:") => {
            Ok(Arc::new(SqliteScoreStore::connect(url).await?))
        }
        Some(url) => Err(StoreError::Connection(format!(
            "unsupported database url '{url}' (sqlite: URLs need the `sqlite` feature)"
        ))),
    }
}
