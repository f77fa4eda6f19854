pub mod ask;
pub mod chat;
pub mod chunks;
pub mod config;
