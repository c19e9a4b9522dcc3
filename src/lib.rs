#![doc = "The `taskforge_auth` library crate."]
#![doc = ""]
#![doc = "Authentication and credential issuance for TaskForge: RSA-signed access and"]
#![doc = "refresh tokens, the sign-up/token/refresh protocol, user storage adapters and"]
#![doc = "the HTTP gateway that exposes them. The binary (`main.rs`) only wires these together."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

pub use crate::error::AppError;
pub use crate::service::{AuthService, AuthServiceConfig};
