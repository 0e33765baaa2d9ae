//! Roster backend library.
//!
//! Users, companies and posts behind a JWT role-authorization layer.

pub mod api;
pub mod auth;
pub mod company;
pub mod db;
pub mod post;
pub mod user;
