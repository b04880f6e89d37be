//! Contract error codes that callers match on across a contract boundary.
//! Each value mirrors a variant of the owning contract's error enum.

use soroban_sdk::Error;

pub mod governor {
    pub const VOTES_NOT_CONFIGURED: u32 = 5;
    pub const BELOW_PROPOSAL_THRESHOLD: u32 = 11;
    pub const DUPLICATE_PROPOSAL: u32 = 21;
    pub const COMMUNITY_INACTIVE: u32 = 24;
    pub const INVALID_BUNDLE: u32 = 51;
    pub const INVALID_OPTION: u32 = 52;
}

pub mod verifier_pool {
    pub const INSUFFICIENT_VERIFIERS: u32 = 41;
}

/// True when `error` is the contract error `code` raised by the callee.
pub fn is_contract_error(error: &Error, code: u32) -> bool {
    *error == Error::from_contract_error(code)
}
