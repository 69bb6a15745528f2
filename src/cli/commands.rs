pub mod initdb;
pub mod purge_sessions;
pub mod serve;

pub use initdb::init_database;
pub use purge_sessions::purge_sessions;
pub use serve::serve;
