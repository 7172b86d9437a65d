//! Follow entity: a directed follower -> author relationship.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the storage constraint forbidding `user_id == author_id`.
pub const CHECK_FOLLOW_SELF: &str = "check_follow_self";

/// Name of the unique index over `(user_id, author_id)`.
pub const UNIQUE_FOLLOW: &str = "unique_follow";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follow")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who is following
    pub user_id: String,

    /// The user being followed
    #[sea_orm(indexed)]
    pub author_id: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Follower,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl ActiveModelBehavior for ActiveModel {}
