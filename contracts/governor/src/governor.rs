use common::{
    bump_instance, bump_persistent, list_len, list_page, list_push, modules, resolve, CallBundle,
    Community, DirectoryClient, VotesClient, BPS_DENOMINATOR,
};
use soroban_sdk::{
    contract, contractimpl, log, token, Address, BytesN, Env, String, Val, Vec,
};

use crate::errors::GovernorError;
use crate::types::{
    DataKey, GovernorConfig, Proposal, ProposalCanceled, ProposalCreated, ProposalExecuted,
    ProposalQueued, ProposalStatus, ProposalTallied, VoteCast, VoteReceipt, BINARY_OPTIONS,
    MAX_OPTIONS, OPTION_AGAINST, OPTION_FOR,
};

#[contract]
pub struct Governor;

#[contractimpl]
impl Governor {
    pub fn initialize(env: Env, config: GovernorConfig) -> Result<(), GovernorError> {
        if env.storage().instance().has(&DataKey::Config) {
            return Err(GovernorError::AlreadyInitialized);
        }
        config.guardian.require_auth();
        if config.quorum_bps > BPS_DENOMINATOR {
            return Err(GovernorError::InvalidConfig);
        }

        env.storage().instance().set(&DataKey::Config, &config);
        bump_instance(&env);
        Ok(())
    }

    /// Opens a proposal for `bundle`. The id is the hash of the bundle and
    /// the description, so the same action cannot be proposed twice.
    pub fn propose(
        env: Env,
        proposer: Address,
        bundle: CallBundle,
        description: String,
        multi_choice: bool,
        num_options: u32,
    ) -> Result<BytesN<32>, GovernorError> {
        let config = Self::load_config(&env)?;
        proposer.require_auth();

        if !bundle.is_well_formed() {
            return Err(GovernorError::InvalidBundle);
        }
        let num_options = if multi_choice {
            if !(2..=MAX_OPTIONS).contains(&num_options) {
                return Err(GovernorError::InvalidOption);
            }
            num_options
        } else {
            BINARY_OPTIONS
        };

        let community = Self::load_community(&env, &config)?;
        if !community.active {
            return Err(GovernorError::CommunityInactive);
        }

        let now = env.ledger().timestamp();
        let power = Self::votes(&env, &config)?.votes_at(&proposer, &now);
        if power < community.params.proposal_threshold {
            return Err(GovernorError::BelowProposalThreshold);
        }

        let description_hash = common::description_hash(&env, &description);
        let proposal_id = common::proposal_hash(&env, &bundle, &description_hash);
        let key = DataKey::Proposal(proposal_id.clone());
        if env.storage().persistent().has(&key) {
            return Err(GovernorError::DuplicateProposal);
        }

        let snapshot = now
            .checked_add(community.params.debate_window)
            .ok_or(GovernorError::Overflow)?;
        let deadline = snapshot
            .checked_add(community.params.vote_window)
            .ok_or(GovernorError::Overflow)?;

        let mut tallies = Vec::new(&env);
        for _ in 0..num_options {
            tallies.push_back(0i128);
        }

        let proposal = Proposal {
            id: proposal_id.clone(),
            proposer: proposer.clone(),
            description_hash,
            bundle,
            multi_choice,
            num_options,
            created_at: now,
            snapshot,
            deadline,
            eta: 0,
            status: ProposalStatus::Pending,
            tallies,
            winning_option: None,
        };
        Self::save_proposal(&env, &proposal);

        list_push(&env, &DataKey::ProposalCount, DataKey::ProposalAt, &proposal_id);

        ProposalCreated {
            proposal_id: proposal_id.clone(),
            proposer,
            snapshot,
            deadline,
        }
        .publish(&env);
        log!(&env, "proposal created, voting opens at {}", snapshot);

        Ok(proposal_id)
    }

    /// Records a ballot weighted by the voter's power at the snapshot and
    /// returns that weight.
    pub fn cast_vote(
        env: Env,
        voter: Address,
        proposal_id: BytesN<32>,
        option: u32,
    ) -> Result<i128, GovernorError> {
        let config = Self::load_config(&env)?;
        voter.require_auth();

        let mut proposal = Self::load_proposal(&env, &proposal_id)?;
        let now = env.ledger().timestamp();
        match proposal.status_at(now, config.grace_period) {
            ProposalStatus::Pending => return Err(GovernorError::VotingNotStarted),
            ProposalStatus::Active => {}
            _ => return Err(GovernorError::InvalidState),
        }
        if now > proposal.deadline {
            return Err(GovernorError::VotingClosed);
        }
        if option >= proposal.num_options {
            return Err(GovernorError::InvalidOption);
        }

        let receipt_key = DataKey::Receipt(proposal_id.clone(), voter.clone());
        if env.storage().persistent().has(&receipt_key) {
            return Err(GovernorError::AlreadyVoted);
        }

        let weight = Self::votes(&env, &config)?.votes_at(&voter, &proposal.snapshot);
        if weight <= 0 {
            return Err(GovernorError::NoVotingPower);
        }

        let tally = proposal
            .tallies
            .get(option)
            .unwrap_or(0)
            .checked_add(weight)
            .ok_or(GovernorError::Overflow)?;
        proposal.tallies.set(option, tally);
        proposal.status = ProposalStatus::Active;
        Self::save_proposal(&env, &proposal);

        env.storage()
            .persistent()
            .set(&receipt_key, &VoteReceipt { option, weight });
        bump_persistent(&env, &receipt_key);

        VoteCast {
            proposal_id,
            voter,
            option,
            weight,
        }
        .publish(&env);

        Ok(weight)
    }

    /// Closes the vote once the deadline has passed and fixes the outcome.
    pub fn tally(env: Env, proposal_id: BytesN<32>) -> Result<ProposalStatus, GovernorError> {
        let config = Self::load_config(&env)?;
        let mut proposal = Self::load_proposal(&env, &proposal_id)?;
        let now = env.ledger().timestamp();

        match proposal.status_at(now, config.grace_period) {
            ProposalStatus::Pending | ProposalStatus::Active => {}
            _ => return Err(GovernorError::InvalidState),
        }
        if now <= proposal.deadline {
            return Err(GovernorError::VotingOpen);
        }

        let quorum = Self::quorum_for(&env, &config, &proposal)?;
        let (status, winning_option) = outcome(&proposal, quorum);
        proposal.status = status;
        proposal.winning_option = winning_option;
        Self::save_proposal(&env, &proposal);

        ProposalTallied {
            proposal_id,
            status,
            winning_option,
        }
        .publish(&env);

        Ok(status)
    }

    /// Moves a succeeded proposal into the timelock and returns its eta.
    pub fn queue(env: Env, proposal_id: BytesN<32>) -> Result<u64, GovernorError> {
        let config = Self::load_config(&env)?;
        let mut proposal = Self::load_proposal(&env, &proposal_id)?;
        let now = env.ledger().timestamp();

        if proposal.status_at(now, config.grace_period) != ProposalStatus::Succeeded {
            return Err(GovernorError::InvalidState);
        }

        let community = Self::load_community(&env, &config)?;
        let eta = now
            .checked_add(community.params.execution_delay)
            .ok_or(GovernorError::Overflow)?;
        proposal.eta = eta;
        proposal.status = ProposalStatus::Queued;
        Self::save_proposal(&env, &proposal);

        ProposalQueued { proposal_id, eta }.publish(&env);
        Ok(eta)
    }

    /// Runs every call of a queued proposal. Any failing call aborts the
    /// whole execution and the proposal stays queued.
    pub fn execute(
        env: Env,
        proposal_id: BytesN<32>,
        bundle: CallBundle,
        description_hash: BytesN<32>,
    ) -> Result<(), GovernorError> {
        let config = Self::load_config(&env)?;
        let mut proposal = Self::load_proposal(&env, &proposal_id)?;
        let now = env.ledger().timestamp();

        match proposal.status_at(now, config.grace_period) {
            ProposalStatus::Queued => {}
            ProposalStatus::Executed => return Err(GovernorError::AlreadyExecuted),
            ProposalStatus::Expired => return Err(GovernorError::ProposalExpired),
            _ => return Err(GovernorError::InvalidState),
        }
        if now < proposal.eta {
            return Err(GovernorError::TimelockPending);
        }
        if common::proposal_hash(&env, &bundle, &description_hash) != proposal_id {
            return Err(GovernorError::BundleMismatch);
        }

        proposal.status = ProposalStatus::Executed;
        Self::save_proposal(&env, &proposal);

        Self::dispatch(&env, &config, &bundle)?;

        ProposalExecuted { proposal_id }.publish(&env);
        log!(&env, "proposal executed with {} calls", bundle.len());
        Ok(())
    }

    /// The proposer may withdraw a proposal before voting opens; the
    /// guardian may cancel anything that has not reached a terminal state.
    pub fn cancel(env: Env, caller: Address, proposal_id: BytesN<32>) -> Result<(), GovernorError> {
        let config = Self::load_config(&env)?;
        caller.require_auth();

        let mut proposal = Self::load_proposal(&env, &proposal_id)?;
        let status = proposal.status_at(env.ledger().timestamp(), config.grace_period);
        match status {
            ProposalStatus::Pending
            | ProposalStatus::Active
            | ProposalStatus::Succeeded
            | ProposalStatus::Queued => {}
            _ => return Err(GovernorError::InvalidState),
        }

        let allowed = caller == config.guardian
            || (caller == proposal.proposer && status == ProposalStatus::Pending);
        if !allowed {
            return Err(GovernorError::Unauthorized);
        }

        proposal.status = ProposalStatus::Canceled;
        Self::save_proposal(&env, &proposal);

        ProposalCanceled {
            proposal_id,
            canceled_by: caller,
        }
        .publish(&env);
        Ok(())
    }

    pub fn state(env: Env, proposal_id: BytesN<32>) -> Result<ProposalStatus, GovernorError> {
        let config = Self::load_config(&env)?;
        let proposal = Self::load_proposal(&env, &proposal_id)?;
        Ok(proposal.status_at(env.ledger().timestamp(), config.grace_period))
    }

    pub fn proposal(env: Env, proposal_id: BytesN<32>) -> Result<Proposal, GovernorError> {
        Self::load_proposal(&env, &proposal_id)
    }

    pub fn receipt(env: Env, proposal_id: BytesN<32>, voter: Address) -> Option<VoteReceipt> {
        env.storage()
            .persistent()
            .get(&DataKey::Receipt(proposal_id, voter))
    }

    /// Proposal ids in creation order, one page at a time.
    pub fn proposals(env: Env, start: u32, limit: u32) -> Vec<BytesN<32>> {
        list_page(&env, &DataKey::ProposalCount, DataKey::ProposalAt, start, limit)
    }

    pub fn proposal_count(env: Env) -> u32 {
        list_len(&env, &DataKey::ProposalCount)
    }

    pub fn quorum(env: Env, proposal_id: BytesN<32>) -> Result<i128, GovernorError> {
        let config = Self::load_config(&env)?;
        let proposal = Self::load_proposal(&env, &proposal_id)?;
        Self::quorum_for(&env, &config, &proposal)
    }

    pub fn hash_proposal(env: Env, bundle: CallBundle, description_hash: BytesN<32>) -> BytesN<32> {
        common::proposal_hash(&env, &bundle, &description_hash)
    }

    pub fn config(env: Env) -> Result<GovernorConfig, GovernorError> {
        Self::load_config(&env)
    }
}

impl Governor {
    fn load_config(env: &Env) -> Result<GovernorConfig, GovernorError> {
        env.storage()
            .instance()
            .get(&DataKey::Config)
            .ok_or(GovernorError::NotInitialized)
    }

    fn load_community(env: &Env, config: &GovernorConfig) -> Result<Community, GovernorError> {
        match DirectoryClient::new(env, &config.registry).try_community(&config.community_id) {
            Ok(Ok(community)) => Ok(community),
            _ => Err(GovernorError::CommunityNotFound),
        }
    }

    fn votes<'a>(env: &'a Env, config: &GovernorConfig) -> Result<VotesClient<'a>, GovernorError> {
        let source = resolve(env, &config.registry, config.community_id, modules::VOTING_POWER)
            .ok_or(GovernorError::VotesNotConfigured)?;
        Ok(VotesClient::new(env, &source))
    }

    fn quorum_for(
        env: &Env,
        config: &GovernorConfig,
        proposal: &Proposal,
    ) -> Result<i128, GovernorError> {
        let supply = Self::votes(env, config)?.total_supply_at(&proposal.snapshot);
        supply
            .checked_mul(config.quorum_bps as i128)
            .map(|scaled| scaled / BPS_DENOMINATOR as i128)
            .ok_or(GovernorError::Overflow)
    }

    fn load_proposal(env: &Env, proposal_id: &BytesN<32>) -> Result<Proposal, GovernorError> {
        env.storage()
            .persistent()
            .get(&DataKey::Proposal(proposal_id.clone()))
            .ok_or(GovernorError::ProposalNotFound)
    }

    fn save_proposal(env: &Env, proposal: &Proposal) {
        let key = DataKey::Proposal(proposal.id.clone());
        env.storage().persistent().set(&key, proposal);
        bump_persistent(env, &key);
    }

    fn dispatch(env: &Env, config: &GovernorConfig, bundle: &CallBundle) -> Result<(), GovernorError> {
        let treasury = token::Client::new(env, &config.treasury_token);
        let this = env.current_contract_address();

        for index in 0..bundle.len() {
            let target = bundle.targets.get_unchecked(index);
            let value = bundle.values.get_unchecked(index);
            let payload = bundle.payloads.get_unchecked(index);

            if value > 0 && !matches!(treasury.try_transfer(&this, &target, &value), Ok(Ok(()))) {
                log!(env, "value transfer for call {} failed", index);
                return Err(GovernorError::CallFailed);
            }

            let result = env.try_invoke_contract::<Val, GovernorError>(
                &target,
                &payload.function,
                payload.args,
            );
            if !matches!(result, Ok(Ok(_))) {
                log!(env, "call {} failed", index);
                return Err(GovernorError::CallFailed);
            }
        }
        Ok(())
    }
}

/// Decides a closed vote. Binary proposals need more for than against and
/// for-votes reaching quorum; multi-choice proposals need the summed turnout
/// to reach quorum and a single option strictly ahead of every other.
pub(crate) fn outcome(proposal: &Proposal, quorum: i128) -> (ProposalStatus, Option<u32>) {
    if !proposal.multi_choice {
        let against = proposal.tallies.get(OPTION_AGAINST).unwrap_or(0);
        let in_favor = proposal.tallies.get(OPTION_FOR).unwrap_or(0);
        if in_favor > against && in_favor >= quorum {
            return (ProposalStatus::Succeeded, Some(OPTION_FOR));
        }
        return (ProposalStatus::Defeated, None);
    }

    let mut turnout = 0i128;
    let mut leader: Option<u32> = None;
    let mut leading_votes = 0i128;
    let mut tied = false;
    for (index, votes) in proposal.tallies.iter().enumerate() {
        turnout = turnout.saturating_add(votes);
        if votes > leading_votes {
            leader = Some(index as u32);
            leading_votes = votes;
            tied = false;
        } else if votes > 0 && votes == leading_votes {
            tied = true;
        }
    }

    match leader {
        Some(option) if !tied && turnout >= quorum => (ProposalStatus::Succeeded, Some(option)),
        _ => (ProposalStatus::Defeated, None),
    }
}
