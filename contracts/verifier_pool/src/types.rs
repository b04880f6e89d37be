use soroban_sdk::{contractevent, contracttype, Address, Vec};

/// Reputation lost for every panel seat left unvoted.
pub const ABSENCE_PENALTY: u32 = 1;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolConfig {
    pub registry: Address,
    pub community_id: u64,
    pub bond_token: Address,
    pub min_bond: i128,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    Verifier(Address),
    Members,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Verifier {
    pub address: Address,
    pub bond: i128,
    pub registered: bool,
    pub reputation: u32,
    pub accurate_votes: u32,
    pub inaccurate_votes: u32,
    pub missed_votes: u32,
    /// Panel seats on claims that have not settled yet.
    pub open_seats: u32,
    pub registered_at: u64,
}

#[contractevent]
pub struct VerifierRegistered {
    #[topic]
    pub verifier: Address,
    pub bond: i128,
}

#[contractevent]
pub struct VerifierDeregistered {
    #[topic]
    pub verifier: Address,
    pub bond: i128,
}

#[contractevent]
pub struct PanelSelected {
    #[topic]
    pub action_id: u64,
    pub claimant: Address,
    pub panel: Vec<Address>,
}

#[contractevent]
pub struct VerifierSlashed {
    #[topic]
    pub verifier: Address,
    pub amount: i128,
    pub remaining: i128,
}

#[contractevent]
pub struct BondWithdrawn {
    #[topic]
    pub verifier: Address,
    pub paid_out: i128,
    pub fee: i128,
}
