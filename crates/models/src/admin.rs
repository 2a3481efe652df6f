use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::AdminLevel;
use crate::errors;
use crate::user;

/// One-to-one extension of `user` for the Admin role.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub admin_level: AdminLevel,
    pub can_manage_users: bool,
    pub can_manage_services: bool,
    pub can_view_reports: bool,
    pub last_login_at: Option<DateTimeWithTimeZone>,
    pub last_login_ip: Option<String>,
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

/// True once any admin account exists; gates the bootstrap endpoint.
pub async fn any_exists(db: &DatabaseConnection) -> Result<bool, errors::ModelError> {
    let count = Entity::find()
        .count(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(count > 0)
}
