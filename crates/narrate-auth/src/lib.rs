//! Narrate Authentication and Authorization
//!
//! This crate provides password hashing, JWT issuance, the server-side
//! session registry, one-time codes and the access guard that ties them
//! together.

pub mod error;
pub mod guard;
pub mod jwt;
pub mod otp;
pub mod password;
pub mod service;
pub mod session;
pub mod validation;

pub use error::AuthError;
pub use guard::{AccessGuard, AuthUser, extract_bearer_token};
pub use jwt::{Claims, JwtManager};
pub use otp::{OtpPurpose, OtpService};
pub use password::{hash_password, verify_password};
pub use service::{AccessUpdate, AuthService, AuthSettings, DashboardStats, LoginOutcome, OtpDispatch};
pub use session::{DEFAULT_SESSION_TTL, SessionStore};
