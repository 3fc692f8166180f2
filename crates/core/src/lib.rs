#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod mutation;
pub mod progress;
pub mod template;
pub mod time;

pub use error::Error;
pub use time::Clock;
