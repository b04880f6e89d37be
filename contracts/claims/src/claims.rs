use common::{
    authorize, bump_instance, bump_persistent, codes, is_contract_error, modules, resolve,
    ActionType, CatalogClient, Capability, JurorPoolClient,
};
use soroban_sdk::{contract, contractimpl, log, token, Address, BytesN, Env, String};

use crate::errors::ClaimsError;
use crate::types::{
    Claim, ClaimSettled, ClaimStatus, ClaimSubmitted, ClaimantState, ClaimsConfig, DataKey,
    JurorVote, TrancheReleased, VerificationCast,
};

/// M-of-N verification of work claims for one community.
///
/// Rewards are paid out of this contract's own token balances.
#[contract]
pub struct ClaimsEngine;

#[contractimpl]
impl ClaimsEngine {
    pub fn initialize(
        env: Env,
        deployer: Address,
        config: ClaimsConfig,
    ) -> Result<(), ClaimsError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(ClaimsError::AlreadyInitialized);
        }
        deployer.require_auth();
        env.storage().instance().set(&DataKey::Config, &config);
        env.storage().instance().set(&DataKey::ClaimCount, &0u64);
        bump_instance(&env);
        Ok(())
    }

    /// Files a claim against an active action type and draws its panel.
    pub fn submit_claim(
        env: Env,
        claimant: Address,
        action_id: u64,
        evidence: String,
        description: String,
    ) -> Result<u64, ClaimsError> {
        let config = Self::load_config(&env)?;
        claimant.require_auth();

        let action = Self::load_action(&env, &config, action_id)?;
        if !action.active {
            return Err(ClaimsError::ActionInactive);
        }
        let terms = action.params;

        let now = env.ledger().timestamp();
        let state_key = DataKey::Claimant(claimant.clone(), action_id);
        let mut state = Self::claimant_state(env.clone(), claimant.clone(), action_id);
        if state.pending >= terms.max_concurrent {
            return Err(ClaimsError::TooManyPending);
        }
        if let Some(settled_at) = state.last_settled_at {
            if now < settled_at.saturating_add(terms.cooldown) {
                return Err(ClaimsError::CooldownActive);
            }
        }

        let pool = Self::module(&env, &config, modules::VERIFIER_POOL)?;
        let panel = match JurorPoolClient::new(&env, &pool).try_select_panel(
            &action_id,
            &claimant,
            &terms.panel_size,
        ) {
            Ok(Ok(panel)) => panel,
            Err(Ok(error))
                if is_contract_error(&error, codes::verifier_pool::INSUFFICIENT_VERIFIERS) =>
            {
                return Err(ClaimsError::InsufficientJurors)
            }
            _ => return Err(ClaimsError::PoolCallFailed),
        };

        let claim_id = env
            .storage()
            .instance()
            .get::<_, u64>(&DataKey::ClaimCount)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&DataKey::ClaimCount, &claim_id);
        bump_instance(&env);

        let verify_deadline = now
            .checked_add(terms.verify_window)
            .ok_or(ClaimsError::Overflow)?;
        let claim = Claim {
            id: claim_id,
            action_id,
            claimant: claimant.clone(),
            evidence,
            description,
            status: ClaimStatus::Pending,
            created_at: now,
            verify_deadline,
            panel: panel.clone(),
            approvals: 0,
            rejections: 0,
            terms,
            pool,
            settled_at: 0,
            tranches_paid: 0,
        };
        Self::save_claim(&env, &claim);

        state.pending += 1;
        env.storage().persistent().set(&state_key, &state);
        bump_persistent(&env, &state_key);

        ClaimSubmitted {
            claim_id,
            action_id,
            claimant,
            panel,
        }
        .publish(&env);
        log!(&env, "claim {} submitted for action {}", claim_id, action_id);

        Ok(claim_id)
    }

    /// Records a panelist's verdict and settles the claim as soon as the
    /// outcome is decided.
    pub fn verify(
        env: Env,
        juror: Address,
        claim_id: u64,
        approve: bool,
        rationale: String,
    ) -> Result<ClaimStatus, ClaimsError> {
        Self::load_config(&env)?;
        juror.require_auth();

        let mut claim = Self::load_claim(&env, claim_id)?;
        if claim.status != ClaimStatus::Pending {
            return Err(ClaimsError::NotPending);
        }
        if !claim.panel.contains(&juror) {
            return Err(ClaimsError::NotPanelist);
        }
        let vote_key = DataKey::Vote(claim_id, juror.clone());
        if env.storage().persistent().has(&vote_key) {
            return Err(ClaimsError::AlreadyVoted);
        }
        let now = env.ledger().timestamp();
        if claim.window_closed(now) {
            return Err(ClaimsError::VerifyWindowClosed);
        }

        env.storage().persistent().set(
            &vote_key,
            &JurorVote {
                approve,
                rationale,
                voted_at: now,
            },
        );
        bump_persistent(&env, &vote_key);
        if approve {
            claim.approvals += 1;
        } else {
            claim.rejections += 1;
        }

        VerificationCast {
            claim_id,
            juror,
            approve,
        }
        .publish(&env);

        if claim.approvals >= claim.terms.jurors_min {
            Self::settle(&env, &mut claim, ClaimStatus::Approved)?;
        } else if claim.approvals + claim.rejections == claim.panel.len() {
            Self::settle(&env, &mut claim, ClaimStatus::Rejected)?;
        } else {
            Self::save_claim(&env, &claim);
        }

        Ok(claim.status)
    }

    /// Closes a claim whose verify window ran out undecided. It is rejected
    /// and every silent panelist is marked absent.
    pub fn finalize_verification(env: Env, claim_id: u64) -> Result<ClaimStatus, ClaimsError> {
        Self::load_config(&env)?;
        let mut claim = Self::load_claim(&env, claim_id)?;
        if claim.status != ClaimStatus::Pending {
            return Err(ClaimsError::NotPending);
        }
        if !claim.window_closed(env.ledger().timestamp()) {
            return Err(ClaimsError::VerifyWindowOpen);
        }

        let pool = JurorPoolClient::new(&env, &claim.pool);
        for juror in claim.panel.iter() {
            if Self::juror_vote(env.clone(), claim_id, juror.clone()).is_none()
                && !matches!(pool.try_record_absence(&juror), Ok(Ok(())))
            {
                return Err(ClaimsError::PoolCallFailed);
            }
        }

        Self::close(&env, &mut claim, ClaimStatus::Rejected)?;
        Ok(claim.status)
    }

    /// Governance-only reversal of an approved, revocable claim. Tranches
    /// already paid stay paid; the rest are never released.
    pub fn revoke(env: Env, claim_id: u64, governance_ref: BytesN<32>) -> Result<(), ClaimsError> {
        let config = Self::load_config(&env)?;
        authorize(
            &env,
            &config.registry,
            config.community_id,
            Capability::Governance,
        )
        .ok_or(ClaimsError::NotGovernor)?;

        let ref_key = DataKey::UsedRef(governance_ref);
        if env.storage().persistent().has(&ref_key) {
            return Err(ClaimsError::RefAlreadyUsed);
        }

        let mut claim = Self::load_claim(&env, claim_id)?;
        if claim.status != ClaimStatus::Approved {
            return Err(ClaimsError::NotApproved);
        }
        if !claim.terms.revocable {
            return Err(ClaimsError::NotRevocable);
        }

        env.storage().persistent().set(&ref_key, &true);
        bump_persistent(&env, &ref_key);

        claim.status = ClaimStatus::Revoked;
        Self::save_claim(&env, &claim);
        ClaimSettled {
            claim_id,
            status: claim.status,
        }
        .publish(&env);
        Ok(())
    }

    /// Pays the next tranche of an approved claim once its interval has
    /// elapsed. Returns the number of tranches paid so far.
    pub fn release_tranche(env: Env, claim_id: u64) -> Result<u32, ClaimsError> {
        Self::load_config(&env)?;
        let mut claim = Self::load_claim(&env, claim_id)?;
        if claim.status != ClaimStatus::Approved {
            return Err(ClaimsError::NotApproved);
        }
        if claim.tranches_paid >= claim.terms.reward_tranches {
            return Err(ClaimsError::AllTranchesPaid);
        }
        if env.ledger().timestamp() < claim.next_tranche_at() {
            return Err(ClaimsError::TrancheNotDue);
        }

        Self::pay_tranche(&env, &mut claim)?;
        Self::save_claim(&env, &claim);
        Ok(claim.tranches_paid)
    }

    pub fn claim(env: Env, claim_id: u64) -> Result<Claim, ClaimsError> {
        Self::load_claim(&env, claim_id)
    }

    pub fn juror_vote(env: Env, claim_id: u64, juror: Address) -> Option<JurorVote> {
        env.storage()
            .persistent()
            .get(&DataKey::Vote(claim_id, juror))
    }

    pub fn claimant_state(env: Env, claimant: Address, action_id: u64) -> ClaimantState {
        env.storage()
            .persistent()
            .get(&DataKey::Claimant(claimant, action_id))
            .unwrap_or_default()
    }

    pub fn claim_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::ClaimCount)
            .unwrap_or(0)
    }

    pub fn config(env: Env) -> Result<ClaimsConfig, ClaimsError> {
        Self::load_config(&env)
    }
}

impl ClaimsEngine {
    fn load_config(env: &Env) -> Result<ClaimsConfig, ClaimsError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(ClaimsError::NotInitialized)
    }

    fn module(env: &Env, config: &ClaimsConfig, name: &str) -> Result<Address, ClaimsError> {
        resolve(env, &config.registry, config.community_id, name)
            .ok_or(ClaimsError::ModuleNotConfigured)
    }

    fn load_action(
        env: &Env,
        config: &ClaimsConfig,
        action_id: u64,
    ) -> Result<ActionType, ClaimsError> {
        let catalog = Self::module(env, config, modules::ACTION_REGISTRY)?;
        match CatalogClient::new(env, &catalog).try_action(&action_id) {
            Ok(Ok(action)) if action.community_id == config.community_id => Ok(action),
            _ => Err(ClaimsError::ActionNotFound),
        }
    }

    /// Applies a decided outcome: panelists who voted with it gain
    /// reputation, those who voted against it are slashed, and an approval
    /// pays the first reward tranche.
    fn settle(env: &Env, claim: &mut Claim, outcome: ClaimStatus) -> Result<(), ClaimsError> {
        let approved = outcome == ClaimStatus::Approved;
        let pool = JurorPoolClient::new(env, &claim.pool);

        for juror in claim.panel.iter() {
            let Some(vote) = Self::juror_vote(env.clone(), claim.id, juror.clone()) else {
                continue;
            };
            let delivered = if vote.approve == approved {
                matches!(
                    pool.try_reward(&juror, &claim.terms.verifier_reward_weight),
                    Ok(Ok(()))
                )
            } else {
                matches!(pool.try_slash(&juror, &claim.terms.slash_bps), Ok(Ok(_)))
            };
            if !delivered {
                return Err(ClaimsError::PoolCallFailed);
            }
        }

        Self::close(env, claim, outcome)?;
        if approved {
            Self::pay_tranche(env, claim)?;
            Self::save_claim(env, claim);
        }
        Ok(())
    }

    /// Marks the claim terminal and frees the claimant's pending slot and
    /// every panel seat.
    fn close(env: &Env, claim: &mut Claim, outcome: ClaimStatus) -> Result<(), ClaimsError> {
        let pool = JurorPoolClient::new(env, &claim.pool);
        for juror in claim.panel.iter() {
            if !matches!(pool.try_release_seat(&juror), Ok(Ok(()))) {
                return Err(ClaimsError::PoolCallFailed);
            }
        }

        let now = env.ledger().timestamp();
        claim.status = outcome;
        claim.settled_at = now;
        Self::save_claim(env, claim);

        let state_key = DataKey::Claimant(claim.claimant.clone(), claim.action_id);
        let mut state =
            Self::claimant_state(env.clone(), claim.claimant.clone(), claim.action_id);
        state.pending = state.pending.saturating_sub(1);
        state.last_settled_at = Some(now);
        env.storage().persistent().set(&state_key, &state);
        bump_persistent(env, &state_key);

        ClaimSettled {
            claim_id: claim.id,
            status: outcome,
        }
        .publish(env);
        log!(env, "claim {} settled", claim.id);
        Ok(())
    }

    /// Transfers one tranche of every reward to the claimant. The last
    /// tranche carries the rounding remainder.
    fn pay_tranche(env: &Env, claim: &mut Claim) -> Result<(), ClaimsError> {
        let tranches = claim.terms.reward_tranches as i128;
        let is_last = claim.tranches_paid + 1 == claim.terms.reward_tranches;
        let this = env.current_contract_address();

        for reward in claim.terms.rewards.iter() {
            let per_tranche = reward.amount / tranches;
            let amount = if is_last {
                reward.amount - per_tranche * (tranches - 1)
            } else {
                per_tranche
            };
            if amount == 0 {
                continue;
            }
            let paid = token::Client::new(env, &reward.token).try_transfer(
                &this,
                &claim.claimant,
                &amount,
            );
            if !matches!(paid, Ok(Ok(()))) {
                return Err(ClaimsError::RewardTransferFailed);
            }
        }

        claim.tranches_paid += 1;
        TrancheReleased {
            claim_id: claim.id,
            tranche: claim.tranches_paid,
        }
        .publish(env);
        Ok(())
    }

    fn load_claim(env: &Env, claim_id: u64) -> Result<Claim, ClaimsError> {
        env.storage()
            .persistent()
            .get(&DataKey::Claim(claim_id))
            .ok_or(ClaimsError::ClaimNotFound)
    }

    fn save_claim(env: &Env, claim: &Claim) {
        let key = DataKey::Claim(claim.id);
        env.storage().persistent().set(&key, claim);
        bump_persistent(env, &key);
    }
}
