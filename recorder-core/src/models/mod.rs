pub mod config;
pub mod device;
pub mod error;
pub mod levels;
pub mod result;
pub mod state;
