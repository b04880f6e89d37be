#![no_std]

mod errors;
mod registry;
mod types;

mod test;

pub use crate::errors::RegistryError;
pub use crate::registry::{CommunityRegistry, CommunityRegistryClient};
pub use crate::types::DataKey;
