//! Common utilities and shared components

pub mod constants;
pub mod decimal;
pub mod error;

pub use constants::*;
pub use decimal::*;
pub use error::*;
