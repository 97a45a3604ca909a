use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use uuid::Uuid;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vacations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub destination: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub start_date: Date,
    pub end_date: Date,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    /// Stored file name inside the images directory.
    pub image: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::follower::Entity")]
    Followers,
}

impl Related<crate::follower::Entity> for Entity {
    fn to() -> RelationDef { Relation::Followers.def() }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, PartialEq)]
pub struct NewVacation {
    pub destination: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: f64,
    pub image: String,
}

fn check(v: &NewVacation) -> Result<(), ModelError> {
    if v.destination.trim().is_empty() { return Err(ModelError::Validation("destination required".into())); }
    if v.end_date < v.start_date { return Err(ModelError::Validation("end date before start date".into())); }
    if !(v.price > 0.0 && v.price <= 10_000.0) { return Err(ModelError::Validation("price out of range".into())); }
    if v.image.trim().is_empty() { return Err(ModelError::Validation("image required".into())); }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(db: &C, v: NewVacation) -> Result<Model, ModelError> {
    check(&v)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        destination: Set(v.destination),
        description: Set(v.description),
        start_date: Set(v.start_date),
        end_date: Set(v.end_date),
        price: Set(v.price),
        image: Set(v.image),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

/// Overwrite every editable column; `None` when the row is gone.
pub async fn update<C: ConnectionTrait>(db: &C, id: Uuid, v: NewVacation) -> Result<Option<Model>, ModelError> {
    check(&v)?;
    let Some(found) = Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut am: ActiveModel = found.into();
    am.destination = Set(v.destination);
    am.description = Set(v.description);
    am.start_date = Set(v.start_date);
    am.end_date = Set(v.end_date);
    am.price = Set(v.price);
    am.image = Set(v.image);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(Some(updated))
}

/// Returns whether a row was removed.
pub async fn hard_delete<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<bool, ModelError> {
    let res = Entity::delete_by_id(id).exec(db).await.map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected > 0)
}
