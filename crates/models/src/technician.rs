use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{Availability, VerificationStatus};
use crate::errors;
use crate::user;

/// One-to-one extension of `user` for the Technician role: verification
/// state, uploaded document references and running counters.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "technician")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub experience_years: i32,
    pub rating_average: Decimal,
    pub total_ratings: i32,
    pub availability: Availability,
    pub wallet_balance: Decimal,
    pub total_jobs_completed: i32,
    pub verification_status: VerificationStatus,
    pub verified_at: Option<DateTimeWithTimeZone>,
    pub id_proof: Option<String>,
    pub certificate: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
