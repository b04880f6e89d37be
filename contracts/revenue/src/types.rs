use common::BPS_DENOMINATOR;
use soroban_sdk::{contractevent, contracttype, Address, BytesN, Vec};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RouterConfig {
    pub registry: Address,
    /// Token all investments and revenue are denominated in.
    pub token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CohortParams {
    pub target_roi_bps: u32,
    pub priority_weight: u32,
    pub max_investors: u32,
}

impl CohortParams {
    pub fn is_valid(&self) -> bool {
        self.target_roi_bps > 0 && self.priority_weight > 0 && self.max_investors > 0
    }
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Config,
    CohortCount,
    Cohort(u64),
    CommunityCohortCount(u64),
    CommunityCohort(u64, u32),
    /// Cohorts of a community that have not reached their target.
    OpenCohorts(u64),
    Investment(u64, Address),
    CohortInvestors(u64),
    Payment(BytesN<32>),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cohort {
    pub id: u64,
    pub community_id: u64,
    pub target_roi_bps: u32,
    pub priority_weight: u32,
    pub max_investors: u32,
    pub total_invested: i128,
    pub total_returned: i128,
    pub investor_count: u32,
    pub active: bool,
    pub completed: bool,
    pub created_at: u64,
}

impl Cohort {
    /// Total return owed to the cohort's investors.
    pub fn target(&self) -> i128 {
        self.total_invested.saturating_mul(self.target_roi_bps as i128) / BPS_DENOMINATOR as i128
    }

    /// What is still owed before the cohort reaches its target.
    pub fn remaining(&self) -> i128 {
        (self.target() - self.total_returned).max(0)
    }

    /// Share weight in the investor bucket. Decays linearly with progress
    /// towards the target and is zero once the target is reached.
    pub fn weight(&self) -> i128 {
        if !self.active || self.completed {
            return 0;
        }
        let target = self.target();
        if target <= 0 {
            return 0;
        }
        (self.priority_weight as i128)
            .saturating_mul(self.remaining())
            .saturating_mul(BPS_DENOMINATOR as i128)
            / target
    }
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CohortShare {
    pub cohort_id: u64,
    pub amount: i128,
}

/// Where one revenue payment goes. `unallocated` is investor money no
/// cohort could absorb; it is paid to the treasury on top of `treasury`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributionBreakdown {
    pub workers: i128,
    pub treasury: i128,
    pub investors: i128,
    pub cohorts: Vec<CohortShare>,
    pub unallocated: i128,
}

#[contractevent]
pub struct CohortCreated {
    #[topic]
    pub cohort_id: u64,
    #[topic]
    pub community_id: u64,
    pub priority_weight: u32,
}

#[contractevent]
pub struct InvestmentAdded {
    #[topic]
    pub cohort_id: u64,
    #[topic]
    pub investor: Address,
    pub amount: i128,
}

#[contractevent]
pub struct RevenueRouted {
    #[topic]
    pub community_id: u64,
    pub payment_ref: BytesN<32>,
    pub amount: i128,
    pub breakdown: DistributionBreakdown,
}

#[contractevent]
pub struct CohortCompleted {
    #[topic]
    pub cohort_id: u64,
    pub total_returned: i128,
}
