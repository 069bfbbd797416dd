pub mod auth;
pub mod common;
pub mod products;
pub mod pvz;
pub mod receptions;
