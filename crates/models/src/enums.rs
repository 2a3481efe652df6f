//! Closed status vocabularies stored as strings.
//!
//! Every column that used to hold a free-form status string is typed with
//! one of these enums; comparisons happen on the enum, never on raw text.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Role {
    #[sea_orm(string_value = "Customer")]
    Customer,
    #[sea_orm(string_value = "Technician")]
    Technician,
    #[sea_orm(string_value = "Admin")]
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AccountStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Inactive")]
    Inactive,
    #[sea_orm(string_value = "Banned")]
    Banned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum BookingStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Accepted")]
    Accepted,
    #[sea_orm(string_value = "InProgress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl BookingStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    pub fn allowed_transitions(self) -> &'static [BookingStatus] {
        match self {
            BookingStatus::Pending => &[BookingStatus::Accepted, BookingStatus::Cancelled],
            BookingStatus::Accepted => &[BookingStatus::InProgress, BookingStatus::Cancelled],
            BookingStatus::InProgress => &[BookingStatus::Completed],
            BookingStatus::Completed | BookingStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum VerificationStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Availability {
    #[sea_orm(string_value = "Available")]
    Available,
    #[sea_orm(string_value = "Busy")]
    Busy,
    #[sea_orm(string_value = "Offline")]
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum AdminLevel {
    #[sea_orm(string_value = "SuperAdmin")]
    SuperAdmin,
    #[sea_orm(string_value = "Moderator")]
    Moderator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_accepted_or_cancelled() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Accepted));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::InProgress));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn accepted_can_start_or_cancel() {
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::InProgress));
        assert!(BookingStatus::Accepted.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Accepted.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Accepted.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn in_progress_only_completes() {
        assert!(BookingStatus::InProgress.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::InProgress.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::InProgress.can_transition_to(BookingStatus::Accepted));
    }

    #[test]
    fn terminal_states_reject_everything() {
        for terminal in [BookingStatus::Completed, BookingStatus::Cancelled] {
            assert!(terminal.is_terminal());
            assert!(terminal.allowed_transitions().is_empty());
            for next in [
                BookingStatus::Pending,
                BookingStatus::Accepted,
                BookingStatus::InProgress,
                BookingStatus::Completed,
                BookingStatus::Cancelled,
            ] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn no_transition_is_self_referential() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Accepted,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(!status.can_transition_to(status));
        }
    }

    #[test]
    fn status_round_trips_through_db_value() {
        use sea_orm::ActiveEnum;
        assert_eq!(BookingStatus::InProgress.to_value(), "InProgress");
        assert_eq!(
            BookingStatus::try_from_value(&"InProgress".to_string()).ok(),
            Some(BookingStatus::InProgress)
        );
        assert_eq!(VerificationStatus::Approved.to_value(), "Approved");
        assert_eq!(Role::Technician.to_value(), "Technician");
    }
}
