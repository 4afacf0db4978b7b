pub mod catalog;
pub mod error;
pub mod security;
pub mod server;
pub mod session;
pub mod storage;
