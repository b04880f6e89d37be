use common::ActionParams;
use soroban_sdk::{contractevent, contracttype, Address, BytesN, String, Vec};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimsConfig {
    pub registry: Address,
    pub community_id: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    ClaimCount,
    Claim(u64),
    Vote(u64, Address),
    Claimant(Address, u64),
    UsedRef(BytesN<32>),
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ClaimStatus {
    Pending = 0,
    Approved = 1,
    Rejected = 2,
    Revoked = 3,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Claim {
    pub id: u64,
    pub action_id: u64,
    pub claimant: Address,
    /// Opaque content pointer, stored and forwarded but never interpreted.
    pub evidence: String,
    pub description: String,
    pub status: ClaimStatus,
    pub created_at: u64,
    pub verify_deadline: u64,
    pub panel: Vec<Address>,
    pub approvals: u32,
    pub rejections: u32,
    /// Action terms as they were when the claim was filed.
    pub terms: ActionParams,
    /// Pool the panel was drawn from; settlement goes back to it.
    pub pool: Address,
    pub settled_at: u64,
    pub tranches_paid: u32,
}

impl Claim {
    /// Whether the verify window has run out at `now`.
    pub fn window_closed(&self, now: u64) -> bool {
        now > self.verify_deadline
    }

    /// Earliest time the next unpaid tranche may be released.
    pub fn next_tranche_at(&self) -> u64 {
        let elapsed = (self.tranches_paid as u64).saturating_mul(self.terms.tranche_interval);
        self.settled_at.saturating_add(elapsed)
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JurorVote {
    pub approve: bool,
    pub rationale: String,
    pub voted_at: u64,
}

/// Per claimant and action type bookkeeping for concurrency and cooldown.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ClaimantState {
    pub pending: u32,
    pub last_settled_at: Option<u64>,
}

#[contractevent]
pub struct ClaimSubmitted {
    #[topic]
    pub claim_id: u64,
    #[topic]
    pub action_id: u64,
    pub claimant: Address,
    pub panel: Vec<Address>,
}

#[contractevent]
pub struct VerificationCast {
    #[topic]
    pub claim_id: u64,
    #[topic]
    pub juror: Address,
    pub approve: bool,
}

#[contractevent]
pub struct ClaimSettled {
    #[topic]
    pub claim_id: u64,
    pub status: ClaimStatus,
}

#[contractevent]
pub struct TrancheReleased {
    #[topic]
    pub claim_id: u64,
    pub tranche: u32,
}
