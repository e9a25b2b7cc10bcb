//! Supporting utilities: logging setup and path handling

pub mod logger;
pub mod paths;
