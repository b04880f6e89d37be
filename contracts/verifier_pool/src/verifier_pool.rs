use common::{
    authorize, bump_instance, bump_persistent, modules, resolve, Capability, DirectoryClient,
    BPS_DENOMINATOR,
};
use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Vec};

use crate::errors::PoolError;
use crate::types::{
    BondWithdrawn, DataKey, PanelSelected, PoolConfig, Verifier, VerifierDeregistered,
    VerifierRegistered, VerifierSlashed, ABSENCE_PENALTY,
};

/// Bonded juror set of one community.
#[contract]
pub struct VerifierPool;

#[contractimpl]
impl VerifierPool {
    pub fn initialize(env: Env, deployer: Address, config: PoolConfig) -> Result<(), PoolError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(PoolError::AlreadyInitialized);
        }
        deployer.require_auth();
        if config.min_bond <= 0 {
            return Err(PoolError::InvalidAmount);
        }
        env.storage().instance().set(&DataKey::Config, &config);
        bump_instance(&env);
        Ok(())
    }

    /// Bonds `bond_amount` and joins the panel pool. Calling again while
    /// registered changes nothing.
    pub fn register_verifier(
        env: Env,
        verifier: Address,
        bond_amount: i128,
    ) -> Result<(), PoolError> {
        let config = Self::load_config(&env)?;
        verifier.require_auth();

        let mut record = Self::load_verifier(&env, &verifier).unwrap_or(Verifier {
            address: verifier.clone(),
            bond: 0,
            registered: false,
            reputation: 0,
            accurate_votes: 0,
            inaccurate_votes: 0,
            missed_votes: 0,
            open_seats: 0,
            registered_at: 0,
        });
        if record.registered {
            return Ok(());
        }
        if bond_amount <= 0 {
            return Err(PoolError::InvalidAmount);
        }

        // A verifier dropped by slashing re-bonds on top of what is left.
        let bond = record
            .bond
            .checked_add(bond_amount)
            .ok_or(PoolError::Overflow)?;
        if bond < config.min_bond {
            return Err(PoolError::InsufficientBond);
        }

        token::Client::new(&env, &config.bond_token).transfer(
            &verifier,
            &env.current_contract_address(),
            &bond_amount,
        );

        record.bond = bond;
        record.registered = true;
        record.registered_at = env.ledger().timestamp();
        Self::save_verifier(&env, &record);

        let mut members = Self::active_verifiers(env.clone());
        members.push_back(verifier.clone());
        Self::save_members(&env, &members);

        VerifierRegistered { verifier, bond }.publish(&env);
        Ok(())
    }

    /// Draws `panel_size` distinct verifiers from the eligible set, never
    /// including the claimant.
    pub fn select_panel(
        env: Env,
        action_id: u64,
        claimant: Address,
        panel_size: u32,
    ) -> Result<Vec<Address>, PoolError> {
        let config = Self::load_config(&env)?;
        Self::require_claims_engine(&env, &config)?;

        if panel_size == 0 {
            return Err(PoolError::InvalidPanelSize);
        }
        let mut candidates = Self::eligible(&env, &config, Some(&claimant));
        let available = candidates.len();
        if available < panel_size {
            return Err(PoolError::InsufficientVerifiers);
        }

        // Partial Fisher-Yates: the first `panel_size` slots end up holding
        // a uniform draw without repetition.
        let mut panel = Vec::new(&env);
        for slot in 0..panel_size {
            let pick = env
                .prng()
                .gen_range::<u64>(slot as u64..available as u64) as u32;
            let chosen = candidates.get_unchecked(pick);
            if pick != slot {
                candidates.set(pick, candidates.get_unchecked(slot));
                candidates.set(slot, chosen.clone());
            }
            Self::take_seat(&env, &chosen)?;
            panel.push_back(chosen);
        }

        PanelSelected {
            action_id,
            claimant,
            panel: panel.clone(),
        }
        .publish(&env);
        log!(&env, "panel of {} drawn from {}", panel_size, available);

        Ok(panel)
    }

    /// Burns `bps` of the verifier's bond and returns the amount taken.
    pub fn slash(env: Env, verifier: Address, bps: u32) -> Result<i128, PoolError> {
        let config = Self::load_config(&env)?;
        Self::require_claims_engine(&env, &config)?;
        if bps > BPS_DENOMINATOR {
            return Err(PoolError::InvalidRate);
        }

        let mut record = Self::load_verifier(&env, &verifier)?;
        let amount = record
            .bond
            .checked_mul(bps as i128)
            .map(|scaled| scaled / BPS_DENOMINATOR as i128)
            .ok_or(PoolError::Overflow)?;
        record.bond -= amount;
        record.inaccurate_votes = record.inaccurate_votes.saturating_add(1);

        if amount > 0 {
            if let Some(treasury) =
                resolve(&env, &config.registry, config.community_id, modules::TREASURY)
            {
                token::Client::new(&env, &config.bond_token).transfer(
                    &env.current_contract_address(),
                    &treasury,
                    &amount,
                );
            }
        }

        if record.registered && record.bond < config.min_bond {
            record.registered = false;
            Self::remove_member(&env, &verifier);
            VerifierDeregistered {
                verifier: verifier.clone(),
                bond: record.bond,
            }
            .publish(&env);
        }
        let remaining = record.bond;
        Self::save_verifier(&env, &record);

        VerifierSlashed {
            verifier,
            amount,
            remaining,
        }
        .publish(&env);
        Ok(amount)
    }

    /// Credits reputation for a vote that matched the outcome.
    pub fn reward(env: Env, verifier: Address, amount: u32) -> Result<(), PoolError> {
        let config = Self::load_config(&env)?;
        Self::require_claims_engine(&env, &config)?;

        let mut record = Self::load_verifier(&env, &verifier)?;
        record.reputation = record.reputation.saturating_add(amount);
        record.accurate_votes = record.accurate_votes.saturating_add(1);
        Self::save_verifier(&env, &record);
        Ok(())
    }

    pub fn record_absence(env: Env, verifier: Address) -> Result<(), PoolError> {
        let config = Self::load_config(&env)?;
        Self::require_claims_engine(&env, &config)?;

        let mut record = Self::load_verifier(&env, &verifier)?;
        record.reputation = record.reputation.saturating_sub(ABSENCE_PENALTY);
        record.missed_votes = record.missed_votes.saturating_add(1);
        Self::save_verifier(&env, &record);
        Ok(())
    }

    /// Frees a seat taken by `select_panel` once its claim is closed.
    pub fn release_seat(env: Env, verifier: Address) -> Result<(), PoolError> {
        let config = Self::load_config(&env)?;
        Self::require_claims_engine(&env, &config)?;

        let mut record = Self::load_verifier(&env, &verifier)?;
        record.open_seats = record.open_seats.saturating_sub(1);
        Self::save_verifier(&env, &record);
        Ok(())
    }

    /// Leaves the pool and returns the whole bond minus the community's
    /// withdrawal fee, which goes to the treasury. The bond stays locked
    /// while the verifier sits on any unsettled panel.
    pub fn withdraw_bond(env: Env, verifier: Address) -> Result<i128, PoolError> {
        let config = Self::load_config(&env)?;
        verifier.require_auth();

        let mut record = Self::load_verifier(&env, &verifier)?;
        if record.open_seats > 0 {
            return Err(PoolError::SeatsOpen);
        }
        if record.bond <= 0 {
            return Err(PoolError::InvalidAmount);
        }

        let community = match DirectoryClient::new(&env, &config.registry)
            .try_community(&config.community_id)
        {
            Ok(Ok(community)) => community,
            _ => return Err(PoolError::CommunityNotFound),
        };
        let treasury = resolve(&env, &config.registry, config.community_id, modules::TREASURY);
        let fee = match treasury {
            Some(_) => record
                .bond
                .checked_mul(community.params.withdrawal_fee_bps as i128)
                .map(|scaled| scaled / BPS_DENOMINATOR as i128)
                .ok_or(PoolError::Overflow)?,
            None => 0,
        };
        let paid_out = record.bond - fee;

        let bond_token = token::Client::new(&env, &config.bond_token);
        let this = env.current_contract_address();
        if let Some(treasury) = treasury.filter(|_| fee > 0) {
            bond_token.transfer(&this, &treasury, &fee);
        }
        if paid_out > 0 {
            bond_token.transfer(&this, &verifier, &paid_out);
        }

        if record.registered {
            Self::remove_member(&env, &verifier);
        }
        record.bond = 0;
        record.registered = false;
        Self::save_verifier(&env, &record);

        BondWithdrawn {
            verifier,
            paid_out,
            fee,
        }
        .publish(&env);
        Ok(paid_out)
    }

    pub fn verifier(env: Env, verifier: Address) -> Result<Verifier, PoolError> {
        Self::load_verifier(&env, &verifier)
    }

    pub fn active_verifiers(env: Env) -> Vec<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Members)
            .unwrap_or(Vec::new(&env))
    }

    pub fn eligible_count(env: Env) -> Result<u32, PoolError> {
        let config = Self::load_config(&env)?;
        Ok(Self::eligible(&env, &config, None).len())
    }

    pub fn config(env: Env) -> Result<PoolConfig, PoolError> {
        Self::load_config(&env)
    }
}

impl VerifierPool {
    fn load_config(env: &Env) -> Result<PoolConfig, PoolError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(PoolError::NotInitialized)
    }

    fn require_claims_engine(env: &Env, config: &PoolConfig) -> Result<(), PoolError> {
        authorize(
            env,
            &config.registry,
            config.community_id,
            Capability::ClaimsEngine,
        )
        .map(|_| ())
        .ok_or(PoolError::NotClaimsEngine)
    }

    fn eligible(env: &Env, config: &PoolConfig, exclude: Option<&Address>) -> Vec<Address> {
        let mut eligible = Vec::new(env);
        for member in Self::active_verifiers(env.clone()).iter() {
            if exclude == Some(&member) {
                continue;
            }
            let bonded = Self::load_verifier(env, &member)
                .map(|record| record.registered && record.bond >= config.min_bond)
                .unwrap_or(false);
            if bonded {
                eligible.push_back(member);
            }
        }
        eligible
    }

    fn load_verifier(env: &Env, verifier: &Address) -> Result<Verifier, PoolError> {
        env.storage()
            .persistent()
            .get(&DataKey::Verifier(verifier.clone()))
            .ok_or(PoolError::VerifierNotFound)
    }

    fn take_seat(env: &Env, verifier: &Address) -> Result<(), PoolError> {
        let mut record = Self::load_verifier(env, verifier)?;
        record.open_seats = record.open_seats.checked_add(1).ok_or(PoolError::Overflow)?;
        Self::save_verifier(env, &record);
        Ok(())
    }

    fn save_verifier(env: &Env, record: &Verifier) {
        let key = DataKey::Verifier(record.address.clone());
        env.storage().persistent().set(&key, record);
        bump_persistent(env, &key);
    }

    fn remove_member(env: &Env, verifier: &Address) {
        let mut members = Self::active_verifiers(env.clone());
        if let Some(index) = members.first_index_of(verifier) {
            members.remove(index);
            Self::save_members(env, &members);
        }
    }

    fn save_members(env: &Env, members: &Vec<Address>) {
        env.storage().persistent().set(&DataKey::Members, members);
        bump_persistent(env, &DataKey::Members);
    }
}
