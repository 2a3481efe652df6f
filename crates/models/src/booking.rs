use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::BookingStatus;
use crate::technician;
use crate::user;

/// A customer's job request. `technician_id` stays NULL until a claim wins
/// and `total_amount` is fixed at creation from the service's rate.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub technician_id: Option<Uuid>,
    pub service_id: Uuid,
    pub address_id: Uuid,
    pub description: String,
    pub reference_image: Option<String>,
    pub booked_at: DateTimeWithTimeZone,
    pub preferred_start: DateTimeWithTimeZone,
    pub preferred_end: DateTimeWithTimeZone,
    pub status: BookingStatus,
    pub total_amount: Decimal,
    pub work_completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    Technician,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(user::Entity)
                .from(Column::CustomerId)
                .to(user::Column::Id)
                .into(),
            Relation::Technician => Entity::belongs_to(technician::Entity)
                .from(Column::TechnicianId)
                .to(technician::Column::Id)
                .into(),
            Relation::Service => Entity::belongs_to(crate::service::Entity)
                .from(Column::ServiceId)
                .to(crate::service::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
