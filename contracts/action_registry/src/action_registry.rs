use common::{
    authorize, bump_instance, bump_persistent, list_len, list_page, list_push, ActionParams,
    ActionType, Capability, BPS_DENOMINATOR,
};
use soroban_sdk::{contract, contractimpl, log, Address, BytesN, Env, Vec};

use crate::errors::ActionRegistryError;
use crate::types::{ActionActivated, ActionDeprecated, ActionProposed, DataKey};

/// Catalog of valuable actions. Every write must come from the owning
/// community's governor and carry a governance reference that has never
/// been used before.
#[contract]
pub struct ActionRegistry;

#[contractimpl]
impl ActionRegistry {
    pub fn initialize(
        env: Env,
        deployer: Address,
        registry: Address,
    ) -> Result<(), ActionRegistryError> {
        if env.storage().instance().has(&DataKey::Registry) {
            return Err(ActionRegistryError::AlreadyInitialized);
        }
        deployer.require_auth();
        env.storage().instance().set(&DataKey::Registry, &registry);
        env.storage().instance().set(&DataKey::ActionCount, &0u64);
        bump_instance(&env);
        Ok(())
    }

    /// Creates an inactive action type. A second governance execution has to
    /// activate it before claims can be filed.
    pub fn propose_valuable_action(
        env: Env,
        community_id: u64,
        params: ActionParams,
        governance_ref: BytesN<32>,
    ) -> Result<u64, ActionRegistryError> {
        Self::require_governor(&env, community_id)?;
        Self::consume_ref(&env, &governance_ref)?;
        validate(&params)?;

        let action_id = env
            .storage()
            .instance()
            .get::<_, u64>(&DataKey::ActionCount)
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&DataKey::ActionCount, &action_id);
        bump_instance(&env);

        let action = ActionType {
            id: action_id,
            community_id,
            params,
            active: false,
            deprecated: false,
            created_at: env.ledger().timestamp(),
            created_ref: governance_ref.clone(),
        };
        Self::save_action(&env, &action);

        list_push(
            &env,
            &DataKey::CommunityActionCount(community_id),
            |position| DataKey::CommunityAction(community_id, position),
            &action_id,
        );

        ActionProposed {
            action_id,
            community_id,
            governance_ref,
        }
        .publish(&env);
        log!(&env, "action type {} proposed", action_id);

        Ok(action_id)
    }

    pub fn activate_from_governance(
        env: Env,
        action_id: u64,
        governance_ref: BytesN<32>,
    ) -> Result<(), ActionRegistryError> {
        let mut action = Self::load_action(&env, action_id)?;
        Self::require_governor(&env, action.community_id)?;
        Self::consume_ref(&env, &governance_ref)?;

        if action.deprecated {
            return Err(ActionRegistryError::Deprecated);
        }
        if action.active {
            return Err(ActionRegistryError::AlreadyActive);
        }

        action.active = true;
        Self::save_action(&env, &action);

        ActionActivated {
            action_id,
            governance_ref,
        }
        .publish(&env);
        Ok(())
    }

    /// Closes the action type to new claims. Claims already filed keep the
    /// terms they captured at submission.
    pub fn deprecate(
        env: Env,
        action_id: u64,
        governance_ref: BytesN<32>,
    ) -> Result<(), ActionRegistryError> {
        let mut action = Self::load_action(&env, action_id)?;
        Self::require_governor(&env, action.community_id)?;
        Self::consume_ref(&env, &governance_ref)?;

        if action.deprecated {
            return Err(ActionRegistryError::Deprecated);
        }

        action.active = false;
        action.deprecated = true;
        Self::save_action(&env, &action);

        ActionDeprecated {
            action_id,
            governance_ref,
        }
        .publish(&env);
        Ok(())
    }

    pub fn action(env: Env, action_id: u64) -> Result<ActionType, ActionRegistryError> {
        Self::load_action(&env, action_id)
    }

    /// Action ids of a community in creation order, one page at a time.
    pub fn actions_for_community(env: Env, community_id: u64, start: u32, limit: u32) -> Vec<u64> {
        list_page(
            &env,
            &DataKey::CommunityActionCount(community_id),
            |position| DataKey::CommunityAction(community_id, position),
            start,
            limit,
        )
    }

    pub fn action_count(env: Env, community_id: u64) -> u32 {
        list_len(&env, &DataKey::CommunityActionCount(community_id))
    }

    pub fn is_ref_used(env: Env, governance_ref: BytesN<32>) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::UsedRef(governance_ref))
    }
}

impl ActionRegistry {
    fn require_governor(env: &Env, community_id: u64) -> Result<(), ActionRegistryError> {
        let registry: Address = env
            .storage()
            .instance()
            .get(&DataKey::Registry)
            .ok_or(ActionRegistryError::NotInitialized)?;
        authorize(env, &registry, community_id, Capability::Governance)
            .map(|_| ())
            .ok_or(ActionRegistryError::GovernorNotConfigured)
    }

    fn consume_ref(env: &Env, governance_ref: &BytesN<32>) -> Result<(), ActionRegistryError> {
        let key = DataKey::UsedRef(governance_ref.clone());
        if env.storage().persistent().has(&key) {
            return Err(ActionRegistryError::RefAlreadyUsed);
        }
        env.storage().persistent().set(&key, &true);
        bump_persistent(env, &key);
        Ok(())
    }

    fn load_action(env: &Env, action_id: u64) -> Result<ActionType, ActionRegistryError> {
        env.storage()
            .persistent()
            .get(&DataKey::Action(action_id))
            .ok_or(ActionRegistryError::ActionNotFound)
    }

    fn save_action(env: &Env, action: &ActionType) {
        let key = DataKey::Action(action.id);
        env.storage().persistent().set(&key, action);
        bump_persistent(env, &key);
    }
}

fn validate(params: &ActionParams) -> Result<(), ActionRegistryError> {
    if params.jurors_min == 0 || params.jurors_min > params.panel_size {
        return Err(ActionRegistryError::InvalidJurorCount);
    }
    if params.slash_bps > BPS_DENOMINATOR {
        return Err(ActionRegistryError::InvalidSlashRate);
    }
    if params.verify_window == 0 {
        return Err(ActionRegistryError::InvalidWindow);
    }
    if params.max_concurrent == 0 {
        return Err(ActionRegistryError::InvalidConcurrency);
    }
    if params.rewards.iter().any(|reward| reward.amount <= 0) {
        return Err(ActionRegistryError::InvalidReward);
    }
    if params.reward_tranches == 0 || (params.reward_tranches > 1 && params.tranche_interval == 0) {
        return Err(ActionRegistryError::InvalidTranches);
    }
    Ok(())
}
