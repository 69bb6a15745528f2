//! Root of the SeaORM entity modules.
//!
//! A user owns an ordered list of characters and any number of login
//! sessions. Both children reference the user through `user_id` and are
//! removed together with it.

pub mod character;
pub mod session;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::character::Entity as Character;
    pub use super::session::Entity as Session;
    pub use super::user::Entity as User;
}
