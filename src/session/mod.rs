// Session management module
// Token-keyed login grants with live expiry checks and a periodic sweep

pub mod manager;
pub mod storage;
pub mod types;

pub use manager::SessionManager;
pub use storage::{MemorySessionStorage, SessionStorage};
pub use types::{Session, SessionConfig, SessionInfo, generate_token};
