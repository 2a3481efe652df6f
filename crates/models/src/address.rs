use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "address")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTimeWithTimeZone,
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

pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
}

/// Insert an address for a user. An omitted country defaults to the
/// marketplace's home market; `is_default` is set by the caller.
pub async fn create(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: NewAddress,
    is_default: bool,
) -> Result<Model, errors::ModelError> {
    if input.street.trim().is_empty() || input.city.trim().is_empty() {
        return Err(errors::ModelError::Validation("street and city are required".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        street: Set(input.street.trim().to_string()),
        city: Set(input.city.trim().to_string()),
        state: Set(input.state.trim().to_string()),
        postal_code: Set(input.postal_code.trim().to_string()),
        country: Set(input
            .country
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Sri Lanka".to_string())),
        is_default: Set(is_default),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
