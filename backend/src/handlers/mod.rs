pub mod admin;
pub mod deployments;
pub mod projects;
pub mod session;
pub mod tokens;
