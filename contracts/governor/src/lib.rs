#![no_std]

mod errors;
mod governor;
mod types;


pub use crate::errors::GovernorError;
pub use crate::governor::{Governor, GovernorClient};
pub use crate::types::{
    DataKey, GovernorConfig, Proposal, ProposalStatus, VoteReceipt, BINARY_OPTIONS, MAX_OPTIONS,
    OPTION_ABSTAIN, OPTION_AGAINST, OPTION_FOR,
};
