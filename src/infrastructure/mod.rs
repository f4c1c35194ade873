pub mod providers;
pub mod sqlite;
pub mod storage;
