use crate::domain::ports::{PendingPaymentStore, SessionStore};
use crate::domain::ticket::PendingPayment;
use crate::error::{BookingError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for pending payments, keyed by order id.
///
/// Records are lost when the process exits; use the RocksDB store when they
/// need to survive until the next `reconcile`.
#[derive(Default, Clone)]
pub struct InMemoryPendingStore {
    pending: Arc<RwLock<HashMap<String, PendingPayment>>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingPaymentStore for InMemoryPendingStore {
    async fn store(&self, pending: PendingPayment) -> Result<()> {
        let mut map = self.pending.write().await;
        map.insert(pending.order_id().to_string(), pending);
        Ok(())
    }

    async fn remove(&self, order_id: &str) -> Result<()> {
        let mut map = self.pending.write().await;
        map.remove(order_id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<PendingPayment>> {
        let map = self.pending.read().await;
        let mut all: Vec<PendingPayment> = map.values().cloned().collect();
        all.sort_by_key(|p| p.recorded_at);
        Ok(all)
    }
}

/// Session held in process memory. Cloning shares the same login state.
#[derive(Default, Clone)]
pub struct InMemorySession {
    token: Arc<std::sync::RwLock<Option<String>>>,
}

impl InMemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    pub fn login(&self, token: impl Into<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = Some(token.into());
        }
    }

    pub fn logout(&self) {
        if let Ok(mut slot) = self.token.write() {
            *slot = None;
        }
    }
}

impl SessionStore for InMemorySession {
    fn token(&self) -> Result<Option<String>> {
        self.token
            .read()
            .map(|slot| slot.clone())
            .map_err(|_| BookingError::StorageError("session lock poisoned".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::booking::{AttemptId, BookingRequest, Passenger};
    use crate::domain::money::{MinorUnits, SeatCount};
    use crate::domain::payment::{PaymentConfirmation, PaymentOrder, VerifiedPayment};
    use chrono::NaiveDate;

    fn pending(order_id: &str) -> PendingPayment {
        let request = BookingRequest::new(
            1,
            Passenger {
                full_name: "Nila".into(),
                email: "nila@example.com".into(),
                age: 22,
            },
            NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            SeatCount::new(1).unwrap(),
        )
        .unwrap();
        let payment = VerifiedPayment::new(
            PaymentOrder {
                order_id: order_id.into(),
                amount: MinorUnits(14000),
                currency: "INR".into(),
            },
            PaymentConfirmation {
                order_id: order_id.into(),
                payment_id: format!("pay_{order_id}"),
                signature: "sig".into(),
            },
        );
        PendingPayment::new(AttemptId::new(), request, &payment)
    }

    #[tokio::test]
    async fn test_in_memory_pending_store() {
        let store = InMemoryPendingStore::new();
        store.store(pending("order_1")).await.unwrap();
        store.store(pending("order_2")).await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 2);

        store.remove("order_1").await.unwrap();
        let left = store.get_all().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].order_id(), "order_2");
    }

    #[tokio::test]
    async fn test_same_order_recorded_once() {
        let store = InMemoryPendingStore::new();
        store.store(pending("order_1")).await.unwrap();
        store.store(pending("order_1")).await.unwrap();
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[test]
    fn test_session_login_logout() {
        let session = InMemorySession::new();
        assert_eq!(session.token().unwrap(), None);

        let shared = session.clone();
        session.login("abc");
        assert_eq!(shared.token().unwrap().as_deref(), Some("abc"));

        shared.logout();
        assert_eq!(session.token().unwrap(), None);
    }
}
