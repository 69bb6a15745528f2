//! Session rows backing the login cookie.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A login session.
///
/// | Column      | Type               | Description                              |
/// |-------------|--------------------|------------------------------------------|
/// | id          | TEXT (Primary Key) | Session id, the value of the cookie      |
/// | user_id     | INTEGER            | Owner, cascades on user deletion         |
/// | data        | TEXT               | JSON [`SessionUser`] snapshot            |
/// | expiry_date | TIMESTAMPTZ        | Instant after which the row is dead      |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    pub user_id: i32,
    #[sea_orm(column_type = "Text")]
    pub data: String,
    pub expiry_date: DateTimeWithTimeZone,
}

/// Snapshot of the user taken when the session was opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub username: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
