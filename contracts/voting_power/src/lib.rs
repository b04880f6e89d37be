#![no_std]

mod errors;
mod types;
mod voting_power;


pub use crate::errors::VotingPowerError;
pub use crate::types::{Checkpoint, DataKey};
pub use crate::voting_power::{VotingPower, VotingPowerClient};
