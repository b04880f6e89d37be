#![no_std]

mod errors;
mod escalation;
mod types;

mod test;

pub use crate::errors::EscalationError;
pub use crate::escalation::{Escalation, EscalationClient};
pub use crate::types::{
    Comment, DataKey, Draft, DraftStatus, Request, RequestStatus, Review, ReviewPolicy,
};
