pub mod advisor;
pub mod auth;
pub mod competition;
pub mod extension;
pub mod file;
pub mod judging;
pub mod milestone;
pub mod notification;
pub mod project;
pub mod project_type;
pub mod registration;
pub mod shared;
pub mod system;
pub mod user;
