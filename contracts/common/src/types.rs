use soroban_sdk::{contracttype, Address, String, Symbol, Val, Vec};

/// Basis-point denominator shared by every rate in the protocol.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Upper bound on calls carried by a single governance bundle.
pub const MAX_CALLS: u32 = 10;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RevenueSplit {
    pub workers_bps: u32,
    pub treasury_bps: u32,
    pub investors_bps: u32,
}

impl RevenueSplit {
    pub fn is_valid(&self) -> bool {
        let total = self.workers_bps as u64 + self.treasury_bps as u64 + self.investors_bps as u64;
        total == BPS_DENOMINATOR as u64
    }
}

/// Governance parameters owned by the registry and read by dependants at call time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommunityParams {
    /// Seconds between proposal creation and the voting snapshot.
    pub debate_window: u64,
    /// Seconds the vote stays open after the snapshot.
    pub vote_window: u64,
    /// Timelock delay applied when a succeeded proposal is queued.
    pub execution_delay: u64,
    pub proposal_threshold: i128,
    pub revenue_split: RevenueSplit,
    pub withdrawal_fee_bps: u32,
}

impl CommunityParams {
    pub fn is_valid(&self) -> bool {
        self.vote_window > 0
            && self.proposal_threshold >= 0
            && self.withdrawal_fee_bps <= BPS_DENOMINATOR
            && self.revenue_split.is_valid()
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Community {
    pub id: u64,
    pub name: String,
    pub active: bool,
    pub bootstrapped: bool,
    pub created_at: u64,
    pub params: CommunityParams,
}

/// One call of a governance bundle: the entry point and its arguments.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Payload {
    pub function: Symbol,
    pub args: Vec<Val>,
}

/// Parallel arrays describing everything a proposal executes.
///
/// `values[i]` is an amount of the governor's treasury token moved to
/// `targets[i]` right before `payloads[i]` is invoked on it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallBundle {
    pub targets: Vec<Address>,
    pub values: Vec<i128>,
    pub payloads: Vec<Payload>,
}

impl CallBundle {
    pub fn is_well_formed(&self) -> bool {
        let calls = self.targets.len();
        if calls == 0 || calls > MAX_CALLS {
            return false;
        }
        if self.values.len() != calls || self.payloads.len() != calls {
            return false;
        }
        self.values.iter().all(|value| value >= 0)
    }

    pub fn len(&self) -> u32 {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardSpec {
    pub token: Address,
    pub amount: i128,
}

/// Verification and payout terms of a valuable action.
///
/// Claims copy these at submission so later governance edits or
/// deprecation never change how an in-flight claim settles.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionParams {
    pub rewards: Vec<RewardSpec>,
    pub jurors_min: u32,
    pub panel_size: u32,
    pub verify_window: u64,
    pub cooldown: u64,
    pub max_concurrent: u32,
    pub verifier_reward_weight: u32,
    pub slash_bps: u32,
    pub revocable: bool,
    pub reward_tranches: u32,
    pub tranche_interval: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActionType {
    pub id: u64,
    pub community_id: u64,
    pub params: ActionParams,
    pub active: bool,
    pub deprecated: bool,
    pub created_at: u64,
    pub created_ref: soroban_sdk::BytesN<32>,
}
