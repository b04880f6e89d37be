//! Client-side views of the contracts that call into each other.
//!
//! Only the entry points a sibling actually needs are declared here so that
//! no contract crate has to link another one to talk to it.

use soroban_sdk::{contractclient, Address, BytesN, Env, String, Vec};

use crate::types::{ActionType, CallBundle, Community};

#[contractclient(name = "DirectoryClient")]
pub trait Directory {
    fn community(env: Env, community_id: u64) -> Community;
    fn module(env: Env, community_id: u64, name: String) -> Option<Address>;
}

#[contractclient(name = "VotesClient")]
pub trait VotesSource {
    fn votes_at(env: Env, account: Address, timestamp: u64) -> i128;
    fn total_supply_at(env: Env, timestamp: u64) -> i128;
}

#[contractclient(name = "ProposerClient")]
pub trait ProposalSink {
    fn propose(
        env: Env,
        proposer: Address,
        bundle: CallBundle,
        description: String,
        multi_choice: bool,
        num_options: u32,
    ) -> BytesN<32>;
}

#[contractclient(name = "CatalogClient")]
pub trait ActionCatalog {
    fn action(env: Env, action_id: u64) -> ActionType;
}

#[contractclient(name = "JurorPoolClient")]
pub trait JurorPool {
    fn select_panel(env: Env, action_id: u64, claimant: Address, panel_size: u32) -> Vec<Address>;
    fn slash(env: Env, verifier: Address, bps: u32) -> i128;
    fn reward(env: Env, verifier: Address, amount: u32);
    fn record_absence(env: Env, verifier: Address);
    fn release_seat(env: Env, verifier: Address);
}
