//! Authentication core: hashing, credential parsing, session stores, strategies
//! and the per-request gate.
//!
//! Nothing in here knows about routing. The HTTP layer in [`crate::api`] builds
//! an [`AuthState`] at startup and hands it to the middleware.

pub mod clock;
pub mod credentials;
pub mod error;
pub mod exclusion;
pub mod gate;
pub mod password;
pub mod repository;
pub mod service;
pub mod state;
pub mod store;
pub mod strategy;
pub mod utils;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, StoreError};
pub use exclusion::ExcludedPaths;
pub use gate::{Decision, RequestGate};
pub use password::PasswordHasher;
pub use repository::{SessionRepository, User, UserRepository};
pub use service::{AuthService, LoginOutcome};
pub use state::{AuthConfig, AuthState};
pub use store::{SessionRecord, SessionStore};
pub use strategy::{AuthStrategy, StrategyKind};
