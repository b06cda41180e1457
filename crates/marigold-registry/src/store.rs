use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// Keyed storage for registry records.
///
/// Every call is atomic with respect to the others. `get` and `list`
/// return copies.
#[async_trait]
pub trait Store<R>: Send + Sync
where
  R: Clone + Send + Sync + 'static,
{
  /// Insert or replace the record stored under `id`.
  async fn put(&self, id: &str, record: R) -> Result<(), StoreError>;

  async fn get(&self, id: &str) -> Result<Option<R>, StoreError>;

  /// All records, in unspecified order.
  async fn list(&self) -> Result<Vec<R>, StoreError>;
}

/// In-memory store guarded by a read-write lock.
pub struct MemoryStore<R> {
  records: RwLock<HashMap<String, R>>,
}

impl<R> MemoryStore<R> {
  pub fn new() -> Self {
    Self {
      records: RwLock::new(HashMap::new()),
    }
  }
}

impl<R> Default for MemoryStore<R> {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl<R> Store<R> for MemoryStore<R>
where
  R: Clone + Send + Sync + 'static,
{
  async fn put(&self, id: &str, record: R) -> Result<(), StoreError> {
    self.records.write().await.insert(id.to_string(), record);
    Ok(())
  }

  async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
    Ok(self.records.read().await.get(id).cloned())
  }

  async fn list(&self) -> Result<Vec<R>, StoreError> {
    Ok(self.records.read().await.values().cloned().collect())
  }
}
