use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One row per (user, vacation) follow; the composite key makes follows unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "followers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub vacation_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::user::Entity",
        from = "Column::UserId",
        to = "crate::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "crate::vacation::Entity",
        from = "Column::VacationId",
        to = "crate::vacation::Column::Id",
        on_delete = "Cascade"
    )]
    Vacation,
}

impl Related<crate::user::Entity> for Entity {
    fn to() -> RelationDef { Relation::User.def() }
}

impl Related<crate::vacation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Vacation.def() }
}

impl ActiveModelBehavior for ActiveModel {}
