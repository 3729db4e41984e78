use crate::domain::ports::PendingPaymentStore;
use crate::domain::ticket::PendingPayment;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for payments that verified but have no saved ticket.
pub const CF_PENDING: &str = "pending_payments";

/// A persistent pending-payment store using RocksDB.
///
/// Keyed by gateway order id, so recording the same failed attempt twice
/// keeps a single record. `Clone` shares the underlying `Arc<DB>`.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at `path` with the pending column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_pending = ColumnFamilyDescriptor::new(CF_PENDING, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_pending])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PENDING).ok_or_else(|| {
            BookingError::StorageError("pending_payments column family not found".to_string())
        })
    }
}

#[async_trait]
impl PendingPaymentStore for RocksDBStore {
    async fn store(&self, pending: PendingPayment) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(&pending)
            .map_err(|e| BookingError::StorageError(format!("Serialization error: {e}")))?;
        self.db.put_cf(cf, pending.order_id().as_bytes(), value)?;
        Ok(())
    }

    async fn remove(&self, order_id: &str) -> Result<()> {
        let cf = self.cf()?;
        self.db.delete_cf(cf, order_id.as_bytes())?;
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<PendingPayment>> {
        let cf = self.cf()?;
        let mut all = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let pending: PendingPayment = serde_json::from_slice(&value).map_err(|e| {
                BookingError::StorageError(format!("Failed to deserialize pending payment: {e}"))
            })?;
            all.push(pending);
        }
        all.sort_by_key(|p| p.recorded_at);
        Ok(all)
    }
}
