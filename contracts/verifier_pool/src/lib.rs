#![no_std]

mod errors;
mod types;
mod verifier_pool;

mod test;

pub use crate::errors::PoolError;
pub use crate::types::{DataKey, PoolConfig, Verifier, ABSENCE_PENALTY};
pub use crate::verifier_pool::{VerifierPool, VerifierPoolClient};
