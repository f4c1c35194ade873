pub mod json_exports;
pub mod local_store;
