#![no_std]

mod claims;
mod errors;
mod types;


pub use crate::claims::{ClaimsEngine, ClaimsEngineClient};
pub use crate::errors::ClaimsError;
pub use crate::types::{Claim, ClaimStatus, ClaimantState, ClaimsConfig, DataKey, JurorVote};
