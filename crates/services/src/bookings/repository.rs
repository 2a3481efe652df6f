use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use uuid::Uuid;

use models::booking;
use models::enums::BookingStatus;

use super::errors::BookingError;

/// Storage seam for the booking lifecycle. `claim_pending` and
/// `transition` are compare-and-set operations: they return `true` only
/// when this call changed the row, so races resolve in the store and the
/// service never holds a lock across them.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<booking::Model>, BookingError>;
    async fn insert(&self, row: booking::Model) -> Result<booking::Model, BookingError>;

    /// Assign `technician_id` and flip Pending to Accepted, but only while
    /// the booking is still pending and unassigned.
    async fn claim_pending(&self, id: Uuid, technician_id: Uuid) -> Result<bool, BookingError>;

    /// Move from `expected` to `next` in one conditional update, stamping
    /// `work_completed_at` when given.
    async fn transition(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        completed_at: Option<DateTime<FixedOffset>>,
    ) -> Result<bool, BookingError>;

    async fn offering_rate(&self, service_id: Uuid) -> Result<Option<Decimal>, BookingError>;
    async fn address_owner(&self, address_id: Uuid) -> Result<Option<Uuid>, BookingError>;
    async fn bump_completed_jobs(&self, technician_id: Uuid) -> Result<(), BookingError>;
}

/// In-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Every mutation runs under one lock so the compare-and-set
    /// semantics match the database implementation.
    #[derive(Default)]
    pub struct MockBookingRepository {
        bookings: Mutex<HashMap<Uuid, booking::Model>>,
        rates: Mutex<HashMap<Uuid, Decimal>>,
        owners: Mutex<HashMap<Uuid, Uuid>>, // address id -> user id
        completed: Mutex<HashMap<Uuid, i32>>,
    }

    impl MockBookingRepository {
        pub fn with_offering(self, service_id: Uuid, rate: Decimal) -> Self {
            self.rates.lock().unwrap().insert(service_id, rate);
            self
        }

        pub fn with_address(self, address_id: Uuid, owner: Uuid) -> Self {
            self.owners.lock().unwrap().insert(address_id, owner);
            self
        }

        pub fn completed_jobs(&self, technician_id: Uuid) -> i32 {
            *self.completed.lock().unwrap().get(&technician_id).unwrap_or(&0)
        }
    }

    #[async_trait]
    impl BookingRepository for MockBookingRepository {
        async fn find(&self, id: Uuid) -> Result<Option<booking::Model>, BookingError> {
            Ok(self.bookings.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, row: booking::Model) -> Result<booking::Model, BookingError> {
            self.bookings.lock().unwrap().insert(row.id, row.clone());
            Ok(row)
        }

        async fn claim_pending(
            &self,
            id: Uuid,
            technician_id: Uuid,
        ) -> Result<bool, BookingError> {
            let mut bookings = self.bookings.lock().unwrap();
            let Some(row) = bookings.get_mut(&id) else { return Ok(false) };
            if row.status != BookingStatus::Pending || row.technician_id.is_some() {
                return Ok(false);
            }
            row.status = BookingStatus::Accepted;
            row.technician_id = Some(technician_id);
            row.updated_at = Utc::now().into();
            Ok(true)
        }

        async fn transition(
            &self,
            id: Uuid,
            expected: BookingStatus,
            next: BookingStatus,
            completed_at: Option<DateTime<FixedOffset>>,
        ) -> Result<bool, BookingError> {
            let mut bookings = self.bookings.lock().unwrap();
            let Some(row) = bookings.get_mut(&id) else { return Ok(false) };
            if row.status != expected {
                return Ok(false);
            }
            row.status = next;
            if completed_at.is_some() {
                row.work_completed_at = completed_at;
            }
            row.updated_at = Utc::now().into();
            Ok(true)
        }

        async fn offering_rate(&self, service_id: Uuid) -> Result<Option<Decimal>, BookingError> {
            Ok(self.rates.lock().unwrap().get(&service_id).copied())
        }

        async fn address_owner(&self, address_id: Uuid) -> Result<Option<Uuid>, BookingError> {
            Ok(self.owners.lock().unwrap().get(&address_id).copied())
        }

        async fn bump_completed_jobs(&self, technician_id: Uuid) -> Result<(), BookingError> {
            *self.completed.lock().unwrap().entry(technician_id).or_insert(0) += 1;
            Ok(())
        }
    }
}
