//! Application services orchestrating domain rules, persistence, and cache.

pub mod admin;
pub mod blog;
pub mod error;
pub mod intake;
pub mod pagination;
pub mod practice;
pub mod render;
pub mod repos;
pub mod search;
pub mod validate;
