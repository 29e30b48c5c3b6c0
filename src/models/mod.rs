pub mod config;
pub mod user;

pub use config::{
    AppConfig, AuthSettings, Environment, MAX_BCRYPT_COST, MAX_SESSION_TTL_SECS, MIN_BCRYPT_COST,
    RouteSettings, SeedUser, ServerSettings, SessionSettings,
};
pub use user::{
    CreateUserRequest, LoginRequest, LoginResponse, RegisterRequest, UpdateRoleRequest, User,
    UserInfo, UserRole,
};
