use sea_orm::sea_query::{Expr, Func};
use sea_orm::{entity::prelude::*, DatabaseConnection, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors;

/// Service category managed by admins. Names are unique ignoring case.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

/// Case-insensitive name lookup, backed by the `LOWER(name)` unique index.
pub async fn find_by_name_ci(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(Column::Name))).eq(name.trim().to_lowercase()))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
