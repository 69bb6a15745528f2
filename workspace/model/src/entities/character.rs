use sea_orm::entity::prelude::*;

/// Starting value of every stat on a freshly created character.
pub const DEFAULT_STAT: i32 = 50;

/// A pet owned by exactly one user.
///
/// Rows are listed in ascending `id`, which is the order they were created in.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "characters")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// The owning user. Deleting the user deletes the character.
    pub user_id: i32,
    pub name: String,
    /// URL of the picture shown for this character.
    pub image: String,
    #[sea_orm(default_value = 50)]
    pub health: i32,
    #[sea_orm(default_value = 50)]
    pub stamina: i32,
    #[sea_orm(default_value = 50)]
    pub energy: i32,
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
