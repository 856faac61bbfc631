pub mod credential_store;
pub mod deployment_store;
pub mod deployment_tokens;
pub mod deployments;
pub mod projects;
pub mod session_tokens;
pub mod transaction;
pub mod users;

pub use credential_store::{CredentialStore, PgCredentialStore};
pub use deployment_store::{DeploymentStore, PgDeploymentStore};
