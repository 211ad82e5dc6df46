//! Authentication domain types

mod token;
mod user;

pub use token::{DEFAULT_TOKEN_TYPE, TokenBundle, TokenRecord};
pub use user::{
    AuthSession, LoginRequest, PhoneLoginRequest, RegisterRequest, User, UserRole, UserStatus,
};
