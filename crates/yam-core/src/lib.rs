pub mod config;
pub mod platform;
pub mod registry;
pub mod schedule;
pub mod search;
pub mod shortcuts;
pub mod text;

mod engine;
mod error;

pub(crate) mod utils;

#[cfg(test)]
mod tests;

pub use engine::{HostHandle, YamCore};
pub use error::{Error, ErrorKind, Result};
pub use shortcuts::SlotLaunch;

pub use yam_types::*;
