//! Back-office services behind the admin listener.

pub mod appointments;
pub mod categories;
pub mod comments;
pub mod contact;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod services;
pub mod tags;
pub mod users;
