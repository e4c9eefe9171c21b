pub mod config;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod service;
pub mod validate;

pub use config::ServiceConfig;
pub use error::{ApiError, ServerError};
pub use server::{router, run, serve};
pub use service::CreditRiskService;
