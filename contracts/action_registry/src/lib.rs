#![no_std]

mod action_registry;
mod errors;
mod types;

mod test;

pub use crate::action_registry::{ActionRegistry, ActionRegistryClient};
pub use crate::errors::ActionRegistryError;
pub use crate::types::DataKey;
