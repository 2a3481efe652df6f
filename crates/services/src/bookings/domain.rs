use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use uuid::Uuid;

use models::enums::VerificationStatus;

/// Booking request body; the customer id comes from the session, never
/// from the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBooking {
    pub service_id: Uuid,
    pub address_id: Uuid,
    pub description: String,
    #[serde(default)]
    pub reference_image: Option<String>,
    pub preferred_start: DateTime<FixedOffset>,
    pub preferred_end: DateTime<FixedOffset>,
}

/// Proof that the caller has a technician profile, re-read from the store
/// for every guarded call. `technician_id` is the profile id, not the
/// user id.
#[derive(Debug, Clone, Copy)]
pub struct TechnicianGate {
    pub technician_id: Uuid,
    pub verification: VerificationStatus,
}

impl TechnicianGate {
    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Approved
    }
}
