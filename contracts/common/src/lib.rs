#![no_std]

pub mod codes;
mod hashing;
mod interfaces;
mod list;
pub mod modules;
mod ttl;
mod types;


pub use crate::codes::is_contract_error;
pub use crate::hashing::{description_hash, module_key, proposal_hash};
pub use crate::interfaces::{
    ActionCatalog, CatalogClient, Directory, DirectoryClient, JurorPool, JurorPoolClient,
    ProposalSink, ProposerClient, VotesClient, VotesSource,
};
pub use crate::list::{list_len, list_page, list_push, MAX_PAGE};
pub use crate::modules::{authorize, resolve, Capability};
pub use crate::ttl::{
    bump_instance, bump_persistent, DAY_IN_LEDGERS, INSTANCE_BUMP_LEDGERS,
    PERSISTENT_BUMP_LEDGERS,
};
pub use crate::types::{
    ActionParams, ActionType, CallBundle, Community, CommunityParams, Payload, RevenueSplit,
    RewardSpec, BPS_DENOMINATOR, MAX_CALLS,
};
