pub mod error;
pub mod gateway;
pub mod password;

pub use error::AuthError;
pub use gateway::{AuthGateway, Authenticated, GatewayConfig, role_matches};
pub use password::{hash_password, verify_password};
