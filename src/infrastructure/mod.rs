pub mod airport_zones;
pub mod config;
pub mod error;
pub mod reminder_store;
pub mod storage;
