mod common;

mod competitions;
mod notifications;
mod project_types;
mod projects;
