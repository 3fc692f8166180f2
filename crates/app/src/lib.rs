#![forbid(unsafe_code)]

pub mod config;
pub mod http;

pub use config::{Args, ArgsError, Backend};
pub use http::{ApiError, AppState, router};
