use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::booking;
use models::enums::BookingStatus;

use super::domain::{NewBooking, TechnicianGate};
use super::errors::BookingError;
use super::repository::BookingRepository;

/// Booking lifecycle service. Claiming and every status change go through
/// conditional updates in the repository, so two racing callers can both
/// reach the store and still only one of them wins.
pub struct BookingService<R: BookingRepository> {
    repo: Arc<R>,
}

impl<R: BookingRepository> BookingService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Create a pending booking priced at the service's current fixed rate.
    ///
    /// # Examples
    /// ```
    /// use services::bookings::{BookingService, domain::NewBooking};
    /// use services::bookings::repository::mock::MockBookingRepository;
    /// use models::enums::BookingStatus;
    /// use rust_decimal::Decimal;
    /// use std::sync::Arc;
    /// use uuid::Uuid;
    ///
    /// let customer = Uuid::new_v4();
    /// let service_id = Uuid::new_v4();
    /// let address_id = Uuid::new_v4();
    /// let repo = MockBookingRepository::default()
    ///     .with_offering(service_id, Decimal::new(450000, 2))
    ///     .with_address(address_id, customer);
    /// let svc = BookingService::new(Arc::new(repo));
    ///
    /// let start = chrono::Utc::now() + chrono::Duration::hours(24);
    /// let booking = tokio_test::block_on(svc.create(customer, NewBooking {
    ///     service_id,
    ///     address_id,
    ///     description: "kitchen sink leaking".into(),
    ///     reference_image: None,
    ///     preferred_start: start.into(),
    ///     preferred_end: (start + chrono::Duration::hours(3)).into(),
    /// })).unwrap();
    /// assert_eq!(booking.status, BookingStatus::Pending);
    /// assert_eq!(booking.total_amount, Decimal::new(450000, 2));
    /// ```
    #[instrument(skip(self, input), fields(customer = %customer_id))]
    pub async fn create(
        &self,
        customer_id: Uuid,
        input: NewBooking,
    ) -> Result<booking::Model, BookingError> {
        if input.description.trim().is_empty() {
            return Err(BookingError::Validation("description is required".into()));
        }
        if input.preferred_start >= input.preferred_end {
            return Err(BookingError::Validation(
                "preferred window must end after it starts".into(),
            ));
        }

        let rate = self
            .repo
            .offering_rate(input.service_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("service".into()))?;
        let owner = self
            .repo
            .address_owner(input.address_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("address".into()))?;
        if owner != customer_id {
            return Err(BookingError::Validation(
                "address does not belong to this customer".into(),
            ));
        }

        let now: DateTime<FixedOffset> = Utc::now().into();
        let row = booking::Model {
            id: Uuid::new_v4(),
            customer_id,
            technician_id: None,
            service_id: input.service_id,
            address_id: input.address_id,
            description: input.description.trim().to_string(),
            reference_image: input.reference_image,
            booked_at: now,
            preferred_start: input.preferred_start,
            preferred_end: input.preferred_end,
            status: BookingStatus::Pending,
            total_amount: rate,
            work_completed_at: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.repo.insert(row).await?;
        info!(booking = %created.id, amount = %created.total_amount, "booking_created");
        Ok(created)
    }

    /// Claim a pending booking for a verified technician. The conditional
    /// update in the store decides the race; a lost claim is a conflict,
    /// not an error.
    #[instrument(skip(self, gate), fields(booking = %booking_id, technician = %gate.technician_id))]
    pub async fn claim(
        &self,
        gate: TechnicianGate,
        booking_id: Uuid,
    ) -> Result<booking::Model, BookingError> {
        if !gate.is_verified() {
            return Err(BookingError::Forbidden("technician is not verified".into()));
        }
        self.repo
            .find(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("booking".into()))?;

        if !self.repo.claim_pending(booking_id, gate.technician_id).await? {
            warn!(booking = %booking_id, "claim_lost");
            return Err(BookingError::Conflict("booking is no longer available".into()));
        }
        info!(booking = %booking_id, "claim_won");
        self.repo
            .find(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("booking".into()))
    }

    /// Walk an assigned job through `InProgress`, `Completed` or
    /// `Cancelled`. Jobs not assigned to the caller read as absent.
    #[instrument(skip(self, gate), fields(booking = %booking_id, technician = %gate.technician_id, ?next))]
    pub async fn update_status(
        &self,
        gate: TechnicianGate,
        booking_id: Uuid,
        next: BookingStatus,
    ) -> Result<booking::Model, BookingError> {
        if !gate.is_verified() {
            return Err(BookingError::Forbidden("technician is not verified".into()));
        }
        if !matches!(
            next,
            BookingStatus::InProgress | BookingStatus::Completed | BookingStatus::Cancelled
        ) {
            return Err(BookingError::Validation(format!(
                "unsupported status change to {next:?}"
            )));
        }

        let current = self
            .repo
            .find(booking_id)
            .await?
            .filter(|b| b.technician_id == Some(gate.technician_id))
            .ok_or_else(|| BookingError::NotFound("job".into()))?;

        if !current.status.can_transition_to(next) {
            return Err(BookingError::Conflict(format!(
                "job cannot move from {:?} to {next:?}",
                current.status
            )));
        }

        let completed_at =
            matches!(next, BookingStatus::Completed).then(|| Utc::now().into());
        if !self
            .repo
            .transition(booking_id, current.status, next, completed_at)
            .await?
        {
            return Err(BookingError::Conflict("job was updated concurrently".into()));
        }
        if matches!(next, BookingStatus::Completed) {
            self.repo.bump_completed_jobs(gate.technician_id).await?;
        }
        info!(booking = %booking_id, from = ?current.status, to = ?next, "job_status_changed");
        self.repo
            .find(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("job".into()))
    }

    /// Customer-side cancellation; only reachable before work starts.
    #[instrument(skip(self), fields(booking = %booking_id, customer = %customer_id))]
    pub async fn cancel_by_customer(
        &self,
        customer_id: Uuid,
        booking_id: Uuid,
    ) -> Result<booking::Model, BookingError> {
        let current = self
            .repo
            .find(booking_id)
            .await?
            .filter(|b| b.customer_id == customer_id)
            .ok_or_else(|| BookingError::NotFound("booking".into()))?;

        if !current.status.can_transition_to(BookingStatus::Cancelled) {
            return Err(BookingError::Conflict(format!(
                "booking cannot be cancelled while {:?}",
                current.status
            )));
        }
        if !self
            .repo
            .transition(booking_id, current.status, BookingStatus::Cancelled, None)
            .await?
        {
            return Err(BookingError::Conflict("booking was updated concurrently".into()));
        }
        info!(booking = %booking_id, "booking_cancelled");
        self.repo
            .find(booking_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("booking".into()))
    }
}
