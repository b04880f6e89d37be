use common::{
    authorize, bump_instance, bump_persistent, list_page, list_push, modules, resolve, Capability,
    DirectoryClient, RevenueSplit, BPS_DENOMINATOR,
};
use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, Vec};

use crate::errors::RevenueError;
use crate::types::{
    Cohort, CohortCompleted, CohortCreated, CohortParams, CohortShare, DataKey,
    DistributionBreakdown, InvestmentAdded, RevenueRouted, RouterConfig,
};

/// Cohort registry and revenue router shared by all communities.
#[contract]
pub struct RevenueRouter;

#[contractimpl]
impl RevenueRouter {
    pub fn initialize(
        env: Env,
        deployer: Address,
        registry: Address,
        token: Address,
    ) -> Result<(), RevenueError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(RevenueError::AlreadyInitialized);
        }
        deployer.require_auth();

        env.storage()
            .instance()
            .set(&DataKey::Config, &RouterConfig { registry, token });
        env.storage().instance().set(&DataKey::CohortCount, &0u64);
        bump_instance(&env);
        Ok(())
    }

    pub fn create_cohort(
        env: Env,
        community_id: u64,
        params: CohortParams,
    ) -> Result<u64, RevenueError> {
        let config = Self::load_config(&env)?;
        Self::require_governor(&env, &config, community_id)?;
        if !params.is_valid() {
            return Err(RevenueError::InvalidCohortParams);
        }

        let cohort_id = env
            .storage()
            .instance()
            .get::<_, u64>(&DataKey::CohortCount)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&DataKey::CohortCount, &cohort_id);
        bump_instance(&env);

        let cohort = Cohort {
            id: cohort_id,
            community_id,
            target_roi_bps: params.target_roi_bps,
            priority_weight: params.priority_weight,
            max_investors: params.max_investors,
            total_invested: 0,
            total_returned: 0,
            investor_count: 0,
            active: true,
            completed: false,
            created_at: env.ledger().timestamp(),
        };
        Self::save_cohort(&env, &cohort);

        list_push(
            &env,
            &DataKey::CommunityCohortCount(community_id),
            |position| DataKey::CommunityCohort(community_id, position),
            &cohort_id,
        );
        let mut open = Self::open_cohorts(env.clone(), community_id);
        open.push_back(cohort_id);
        Self::save_open_cohorts(&env, community_id, &open);

        CohortCreated {
            cohort_id,
            community_id,
            priority_weight: params.priority_weight,
        }
        .publish(&env);
        Ok(cohort_id)
    }

    pub fn set_cohort_active(env: Env, cohort_id: u64, active: bool) -> Result<(), RevenueError> {
        let config = Self::load_config(&env)?;
        let mut cohort = Self::load_cohort(&env, cohort_id)?;
        Self::require_governor(&env, &config, cohort.community_id)?;

        cohort.active = active;
        Self::save_cohort(&env, &cohort);
        Ok(())
    }

    /// Moves `amount` from the investor to the community treasury and
    /// records it against the cohort.
    pub fn add_investment(
        env: Env,
        cohort_id: u64,
        investor: Address,
        amount: i128,
    ) -> Result<(), RevenueError> {
        let config = Self::load_config(&env)?;
        investor.require_auth();
        if amount <= 0 {
            return Err(RevenueError::InvalidAmount);
        }

        let mut cohort = Self::load_cohort(&env, cohort_id)?;
        if !cohort.active || cohort.completed {
            return Err(RevenueError::CohortClosed);
        }

        let investment_key = DataKey::Investment(cohort_id, investor.clone());
        let previous = Self::investment(env.clone(), cohort_id, investor.clone());
        if previous == 0 {
            if cohort.investor_count >= cohort.max_investors {
                return Err(RevenueError::CohortFull);
            }
            cohort.investor_count += 1;
            let investors_key = DataKey::CohortInvestors(cohort_id);
            let mut investors = Self::investors(&env, cohort_id);
            investors.push_back(investor.clone());
            env.storage().persistent().set(&investors_key, &investors);
            bump_persistent(&env, &investors_key);
        }

        let treasury = Self::destination(&env, &config, cohort.community_id, modules::TREASURY)?;
        token::Client::new(&env, &config.token).transfer(&investor, &treasury, &amount);

        let invested = previous.checked_add(amount).ok_or(RevenueError::Overflow)?;
        env.storage().persistent().set(&investment_key, &invested);
        bump_persistent(&env, &investment_key);

        cohort.total_invested = cohort
            .total_invested
            .checked_add(amount)
            .ok_or(RevenueError::Overflow)?;
        Self::save_cohort(&env, &cohort);

        InvestmentAdded {
            cohort_id,
            investor,
            amount,
        }
        .publish(&env);
        Ok(())
    }

    /// What `route_revenue` would pay for `amount` against current state.
    pub fn preview_distribution(
        env: Env,
        community_id: u64,
        amount: i128,
    ) -> Result<DistributionBreakdown, RevenueError> {
        let config = Self::load_config(&env)?;
        if amount <= 0 {
            return Err(RevenueError::InvalidAmount);
        }
        Self::distribute(&env, &config, community_id, amount)
    }

    /// Pays one revenue amount out to workers, treasury and cohorts. Each
    /// `payment_ref` is accepted once.
    pub fn route_revenue(
        env: Env,
        payer: Address,
        community_id: u64,
        amount: i128,
        payment_ref: BytesN<32>,
    ) -> Result<DistributionBreakdown, RevenueError> {
        let config = Self::load_config(&env)?;
        payer.require_auth();
        if amount <= 0 {
            return Err(RevenueError::InvalidAmount);
        }
        let payment_key = DataKey::Payment(payment_ref.clone());
        if env.storage().persistent().has(&payment_key) {
            return Err(RevenueError::DuplicatePayment);
        }

        let breakdown = Self::distribute(&env, &config, community_id, amount)?;
        let client = token::Client::new(&env, &config.token);

        let worker_pool = Self::destination(&env, &config, community_id, modules::WORKER_POOL)?;
        let treasury = Self::destination(&env, &config, community_id, modules::TREASURY)?;
        pay(&client, &payer, &worker_pool, breakdown.workers);
        pay(
            &client,
            &payer,
            &treasury,
            breakdown.treasury + breakdown.unallocated,
        );

        let mut open = Self::open_cohorts(env.clone(), community_id);
        for share in breakdown.cohorts.iter() {
            let mut cohort = Self::load_cohort(&env, share.cohort_id)?;
            Self::pay_investors(&env, &client, &payer, &cohort, share.amount)?;

            cohort.total_returned = cohort
                .total_returned
                .checked_add(share.amount)
                .ok_or(RevenueError::Overflow)?;
            if cohort.total_returned >= cohort.target() {
                cohort.completed = true;
                if let Some(position) = open.first_index_of(cohort.id) {
                    open.remove(position);
                }
                CohortCompleted {
                    cohort_id: cohort.id,
                    total_returned: cohort.total_returned,
                }
                .publish(&env);
            }
            Self::save_cohort(&env, &cohort);
        }
        Self::save_open_cohorts(&env, community_id, &open);

        env.storage().persistent().set(&payment_key, &true);
        bump_persistent(&env, &payment_key);

        RevenueRouted {
            community_id,
            payment_ref,
            amount,
            breakdown: breakdown.clone(),
        }
        .publish(&env);
        log!(&env, "routed {} for community {}", amount, community_id);

        Ok(breakdown)
    }

    pub fn cohort(env: Env, cohort_id: u64) -> Result<Cohort, RevenueError> {
        Self::load_cohort(&env, cohort_id)
    }

    /// Every cohort the community ever created, one page at a time.
    pub fn cohorts_for_community(env: Env, community_id: u64, start: u32, limit: u32) -> Vec<u64> {
        list_page(
            &env,
            &DataKey::CommunityCohortCount(community_id),
            |position| DataKey::CommunityCohort(community_id, position),
            start,
            limit,
        )
    }

    /// Cohorts still owed a return. Only these take part in distribution.
    pub fn open_cohorts(env: Env, community_id: u64) -> Vec<u64> {
        env.storage()
            .persistent()
            .get(&DataKey::OpenCohorts(community_id))
            .unwrap_or(Vec::new(&env))
    }

    pub fn investment(env: Env, cohort_id: u64, investor: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&DataKey::Investment(cohort_id, investor))
            .unwrap_or(0)
    }

    pub fn cohort_weight(env: Env, cohort_id: u64) -> Result<i128, RevenueError> {
        Ok(Self::load_cohort(&env, cohort_id)?.weight())
    }

    pub fn is_payment_processed(env: Env, payment_ref: BytesN<32>) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Payment(payment_ref))
    }

    pub fn config(env: Env) -> Result<RouterConfig, RevenueError> {
        Self::load_config(&env)
    }
}

impl RevenueRouter {
    fn load_config(env: &Env) -> Result<RouterConfig, RevenueError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(RevenueError::NotInitialized)
    }

    fn require_governor(
        env: &Env,
        config: &RouterConfig,
        community_id: u64,
    ) -> Result<(), RevenueError> {
        authorize(env, &config.registry, community_id, Capability::Governance)
            .map(|_| ())
            .ok_or(RevenueError::NotGovernor)
    }

    fn destination(
        env: &Env,
        config: &RouterConfig,
        community_id: u64,
        name: &str,
    ) -> Result<Address, RevenueError> {
        resolve(env, &config.registry, community_id, name).ok_or(RevenueError::ModuleNotConfigured)
    }

    /// Splits `amount` into the three buckets and divides the investor
    /// bucket across eligible cohorts by weight. Reads state only.
    fn distribute(
        env: &Env,
        config: &RouterConfig,
        community_id: u64,
        amount: i128,
    ) -> Result<DistributionBreakdown, RevenueError> {
        let split = match DirectoryClient::new(env, &config.registry).try_community(&community_id)
        {
            Ok(Ok(community)) => community.params.revenue_split,
            _ => return Err(RevenueError::CommunityNotFound),
        };
        let (workers, treasury, investors) = split_buckets(&split, amount)?;

        let mut eligible = Vec::new(env);
        let mut total_weight = 0i128;
        for cohort_id in Self::open_cohorts(env.clone(), community_id).iter() {
            let cohort = Self::load_cohort(env, cohort_id)?;
            let weight = cohort.weight();
            if weight > 0 {
                total_weight = total_weight
                    .checked_add(weight)
                    .ok_or(RevenueError::Overflow)?;
                eligible.push_back((cohort, weight));
            }
        }

        let mut cohorts = Vec::new(env);
        let mut allocated = 0i128;
        if investors > 0 && total_weight > 0 {
            for (cohort, weight) in eligible.iter() {
                let share = investors
                    .checked_mul(weight)
                    .ok_or(RevenueError::Overflow)?
                    / total_weight;
                let share = share.min(cohort.remaining());
                if share > 0 {
                    allocated += share;
                    cohorts.push_back(CohortShare {
                        cohort_id: cohort.id,
                        amount: share,
                    });
                }
            }
        }

        Ok(DistributionBreakdown {
            workers,
            treasury,
            investors,
            cohorts,
            unallocated: investors - allocated,
        })
    }

    /// Pays a cohort's share to its investors pro rata to what each put in.
    /// The last investor takes the rounding remainder.
    fn pay_investors(
        env: &Env,
        client: &token::Client,
        payer: &Address,
        cohort: &Cohort,
        share: i128,
    ) -> Result<(), RevenueError> {
        let investors = Self::investors(env, cohort.id);
        let count = investors.len();
        let mut paid = 0i128;
        for (position, investor) in investors.iter().enumerate() {
            let amount = if position as u32 + 1 == count {
                share - paid
            } else {
                let invested = Self::investment(env.clone(), cohort.id, investor.clone());
                share
                    .checked_mul(invested)
                    .ok_or(RevenueError::Overflow)?
                    / cohort.total_invested
            };
            pay(client, payer, &investor, amount);
            paid += amount;
        }
        Ok(())
    }

    fn save_open_cohorts(env: &Env, community_id: u64, open: &Vec<u64>) {
        let key = DataKey::OpenCohorts(community_id);
        env.storage().persistent().set(&key, open);
        bump_persistent(env, &key);
    }

    fn investors(env: &Env, cohort_id: u64) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::CohortInvestors(cohort_id))
            .unwrap_or(Vec::new(env))
    }

    fn load_cohort(env: &Env, cohort_id: u64) -> Result<Cohort, RevenueError> {
        env.storage()
            .persistent()
            .get(&DataKey::Cohort(cohort_id))
            .ok_or(RevenueError::CohortNotFound)
    }

    fn save_cohort(env: &Env, cohort: &Cohort) {
        let key = DataKey::Cohort(cohort.id);
        env.storage().persistent().set(&key, cohort);
        bump_persistent(env, &key);
    }
}

/// Worker and investor buckets round down; the treasury absorbs the
/// remainder so the three always add up to `amount`.
fn split_buckets(split: &RevenueSplit, amount: i128) -> Result<(i128, i128, i128), RevenueError> {
    let bucket = |bps: u32| {
        amount
            .checked_mul(bps as i128)
            .map(|scaled| scaled / BPS_DENOMINATOR as i128)
            .ok_or(RevenueError::Overflow)
    };
    let workers = bucket(split.workers_bps)?;
    let investors = bucket(split.investors_bps)?;
    Ok((workers, amount - workers - investors, investors))
}

fn pay(client: &token::Client, from: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        client.transfer(from, to, &amount);
    }
}
