use common::CallBundle;
use soroban_sdk::{contractevent, contracttype, Address, BytesN, Vec};

pub const OPTION_AGAINST: u32 = 0;
pub const OPTION_FOR: u32 = 1;
pub const OPTION_ABSTAIN: u32 = 2;
pub const BINARY_OPTIONS: u32 = 3;
pub const MAX_OPTIONS: u32 = 10;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovernorConfig {
    pub registry: Address,
    pub community_id: u64,
    /// May cancel any proposal that has not reached a terminal state.
    pub guardian: Address,
    /// Token moved by non-zero call values.
    pub treasury_token: Address,
    pub quorum_bps: u32,
    /// How long a queued proposal stays executable after its eta.
    pub grace_period: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    Proposal(BytesN<32>),
    Receipt(BytesN<32>, Address),
    ProposalCount,
    ProposalAt(u32),
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProposalStatus {
    Pending = 0,
    Active = 1,
    Canceled = 2,
    Defeated = 3,
    Succeeded = 4,
    Queued = 5,
    Executed = 6,
    Expired = 7,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    pub id: BytesN<32>,
    pub proposer: Address,
    pub description_hash: BytesN<32>,
    pub bundle: CallBundle,
    pub multi_choice: bool,
    pub num_options: u32,
    pub created_at: u64,
    pub snapshot: u64,
    pub deadline: u64,
    pub eta: u64,
    pub status: ProposalStatus,
    /// Weighted votes per option. Binary proposals use against/for/abstain.
    pub tallies: Vec<i128>,
    pub winning_option: Option<u32>,
}

impl Proposal {
    /// Stored status with the time-driven transitions applied. Pending turns
    /// Active at the snapshot and Queued turns Expired once the grace period
    /// after the eta has run out; everything else needs an explicit call.
    pub fn status_at(&self, now: u64, grace_period: u64) -> ProposalStatus {
        match self.status {
            ProposalStatus::Pending if now >= self.snapshot => ProposalStatus::Active,
            ProposalStatus::Queued if now > self.eta.saturating_add(grace_period) => {
                ProposalStatus::Expired
            }
            status => status,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteReceipt {
    pub option: u32,
    pub weight: i128,
}

#[contractevent]
pub struct ProposalCreated {
    #[topic]
    pub proposal_id: BytesN<32>,
    pub proposer: Address,
    pub snapshot: u64,
    pub deadline: u64,
}

#[contractevent]
pub struct VoteCast {
    #[topic]
    pub proposal_id: BytesN<32>,
    #[topic]
    pub voter: Address,
    pub option: u32,
    pub weight: i128,
}

#[contractevent]
pub struct ProposalTallied {
    #[topic]
    pub proposal_id: BytesN<32>,
    pub status: ProposalStatus,
    pub winning_option: Option<u32>,
}

#[contractevent]
pub struct ProposalQueued {
    #[topic]
    pub proposal_id: BytesN<32>,
    pub eta: u64,
}

#[contractevent]
pub struct ProposalExecuted {
    #[topic]
    pub proposal_id: BytesN<32>,
}

#[contractevent]
pub struct ProposalCanceled {
    #[topic]
    pub proposal_id: BytesN<32>,
    pub canceled_by: Address,
}
