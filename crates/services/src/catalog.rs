//! Category and service catalog management.
//!
//! Category names are unique ignoring case, and deletions are refused
//! while anything still references the row.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use models::{booking, category, service};

use crate::errors::ServiceError;

fn db_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Db(e.to_string())
}

fn valid_name(name: &str) -> Result<&str, ServiceError> {
    let name = name.trim();
    if name.is_empty() || name.len() > 128 {
        return Err(ServiceError::Validation("name must be 1..=128 characters".into()));
    }
    Ok(name)
}

/// List categories; customers only see active ones.
pub async fn list_categories(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<category::Model>, ServiceError> {
    let mut finder = category::Entity::find().order_by_asc(category::Column::Name);
    if !include_inactive {
        finder = finder.filter(category::Column::IsActive.eq(true));
    }
    finder.all(db).await.map_err(db_err)
}

pub async fn get_category(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<category::Model, ServiceError> {
    category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("category"))
}

/// Create a category; the name must be free ignoring case.
pub async fn create_category(
    db: &DatabaseConnection,
    created_by: Uuid,
    name: &str,
    description: Option<&str>,
) -> Result<category::Model, ServiceError> {
    let name = valid_name(name)?;
    if category::find_by_name_ci(db, name).await?.is_some() {
        return Err(ServiceError::Conflict(format!("category '{name}' already exists")));
    }
    let created = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        is_active: Set(true),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .map_err(db_err)?;
    info!(category = %created.id, name = %created.name, "category_created");
    Ok(created)
}

/// Update name, description or active flag; renames keep the
/// case-insensitive uniqueness rule.
pub async fn update_category(
    db: &DatabaseConnection,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
    is_active: Option<bool>,
) -> Result<category::Model, ServiceError> {
    let existing = get_category(db, id).await?;
    let mut am: category::ActiveModel = existing.into();
    if let Some(n) = name {
        let n = valid_name(n)?;
        if let Some(clash) = category::find_by_name_ci(db, n).await? {
            if clash.id != id {
                return Err(ServiceError::Conflict(format!("category '{n}' already exists")));
            }
        }
        am.name = Set(n.to_string());
    }
    if let Some(d) = description {
        am.description = Set(Some(d.to_string()));
    }
    if let Some(flag) = is_active {
        am.is_active = Set(flag);
    }
    am.updated_at = Set(Some(chrono::Utc::now().into()));
    am.update(db).await.map_err(db_err)
}

/// Delete a category with no services left in it.
pub async fn delete_category(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let dependants = service::Entity::find()
        .filter(service::Column::CategoryId.eq(id))
        .count(db)
        .await
        .map_err(db_err)?;
    if dependants > 0 {
        return Err(ServiceError::Conflict(format!(
            "category still has {dependants} services"
        )));
    }
    let res = category::Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("category"));
    }
    info!(category = %id, "category_deleted");
    Ok(())
}

/// A bookable service with its category name resolved.
#[derive(Debug, Clone, Serialize)]
pub struct OfferingView {
    pub id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub name: String,
    pub description: Option<String>,
    pub fixed_rate: Decimal,
    pub estimated_duration_hours: Decimal,
    pub image_url: Option<String>,
}

fn to_view(s: service::Model, categories: &HashMap<Uuid, String>) -> OfferingView {
    OfferingView {
        id: s.id,
        category_id: s.category_id,
        category_name: categories.get(&s.category_id).cloned().unwrap_or_default(),
        name: s.name,
        description: s.description,
        fixed_rate: s.fixed_rate,
        estimated_duration_hours: s.estimated_duration_hours,
        image_url: s.image_url,
    }
}

async fn category_names(
    db: &DatabaseConnection,
    ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, String>, ServiceError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = category::Entity::find()
        .filter(category::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|c| (c.id, c.name)).collect())
}

/// List services, optionally narrowed to one category.
pub async fn list_offerings(
    db: &DatabaseConnection,
    category_id: Option<Uuid>,
) -> Result<Vec<OfferingView>, ServiceError> {
    let mut finder = service::Entity::find().order_by_asc(service::Column::Name);
    if let Some(cid) = category_id {
        finder = finder.filter(service::Column::CategoryId.eq(cid));
    }
    let rows = finder.all(db).await.map_err(db_err)?;
    let categories = category_names(db, rows.iter().map(|s| s.category_id).collect()).await?;
    Ok(rows.into_iter().map(|s| to_view(s, &categories)).collect())
}

pub async fn get_offering(db: &DatabaseConnection, id: Uuid) -> Result<OfferingView, ServiceError> {
    let row = service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    let categories = category_names(db, vec![row.category_id]).await?;
    Ok(to_view(row, &categories))
}

fn valid_rate(rate: Decimal) -> Result<(), ServiceError> {
    if rate <= Decimal::ZERO {
        return Err(ServiceError::Validation("fixed_rate must be positive".into()));
    }
    Ok(())
}

fn valid_duration(hours: Decimal) -> Result<(), ServiceError> {
    if hours <= Decimal::ZERO {
        return Err(ServiceError::Validation(
            "estimated_duration_hours must be positive".into(),
        ));
    }
    Ok(())
}

/// Create a service under an existing category.
#[allow(clippy::too_many_arguments)]
pub async fn create_offering(
    db: &DatabaseConnection,
    category_id: Uuid,
    name: &str,
    description: Option<&str>,
    fixed_rate: Decimal,
    estimated_duration_hours: Decimal,
    image_url: Option<&str>,
) -> Result<OfferingView, ServiceError> {
    let name = valid_name(name)?;
    valid_rate(fixed_rate)?;
    valid_duration(estimated_duration_hours)?;
    let parent = get_category(db, category_id).await?;

    let created = service::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        name: Set(name.to_string()),
        description: Set(description.map(str::to_string)),
        fixed_rate: Set(fixed_rate),
        estimated_duration_hours: Set(estimated_duration_hours),
        image_url: Set(image_url.map(str::to_string)),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    }
    .insert(db)
    .await
    .map_err(db_err)?;
    info!(service = %created.id, category = %parent.id, rate = %fixed_rate, "service_created");

    let mut categories = HashMap::new();
    categories.insert(parent.id, parent.name);
    Ok(to_view(created, &categories))
}

/// Update a service; a new category must exist, a new rate must be
/// positive. Existing bookings keep the price they were created with.
#[allow(clippy::too_many_arguments)]
pub async fn update_offering(
    db: &DatabaseConnection,
    id: Uuid,
    category_id: Option<Uuid>,
    name: Option<&str>,
    description: Option<&str>,
    fixed_rate: Option<Decimal>,
    estimated_duration_hours: Option<Decimal>,
    image_url: Option<&str>,
) -> Result<OfferingView, ServiceError> {
    let existing = service::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(db_err)?
        .ok_or_else(|| ServiceError::not_found("service"))?;
    let mut am: service::ActiveModel = existing.into();
    if let Some(cid) = category_id {
        get_category(db, cid).await?;
        am.category_id = Set(cid);
    }
    if let Some(n) = name {
        am.name = Set(valid_name(n)?.to_string());
    }
    if let Some(d) = description {
        am.description = Set(Some(d.to_string()));
    }
    if let Some(rate) = fixed_rate {
        valid_rate(rate)?;
        am.fixed_rate = Set(rate);
    }
    if let Some(hours) = estimated_duration_hours {
        valid_duration(hours)?;
        am.estimated_duration_hours = Set(hours);
    }
    if let Some(url) = image_url {
        am.image_url = Set(Some(url.to_string()));
    }
    am.updated_at = Set(Some(chrono::Utc::now().into()));
    let updated = am.update(db).await.map_err(db_err)?;
    let categories = category_names(db, vec![updated.category_id]).await?;
    Ok(to_view(updated, &categories))
}

/// Delete a service nothing was ever booked against.
pub async fn delete_offering(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let referenced = booking::Entity::find()
        .filter(booking::Column::ServiceId.eq(id))
        .count(db)
        .await
        .map_err(db_err)?;
    if referenced > 0 {
        return Err(ServiceError::Conflict(format!(
            "service is referenced by {referenced} bookings"
        )));
    }
    let res = service::Entity::delete_by_id(id).exec(db).await.map_err(db_err)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("service"));
    }
    info!(service = %id, "service_deleted");
    Ok(())
}
