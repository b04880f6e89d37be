use common::{bump_instance, bump_persistent, list_len, list_push};
use soroban_sdk::{contract, contractimpl, log, Address, Env};

use crate::errors::VotingPowerError;
use crate::types::{Checkpoint, DataKey, History, VotesChanged};

/// Non-transferable membership weight with a timestamped history, so the
/// governor can read anyone's weight as it stood at a proposal snapshot.
#[contract]
pub struct VotingPower;

#[contractimpl]
impl VotingPower {
    pub fn initialize(env: Env, admin: Address) -> Result<(), VotingPowerError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(VotingPowerError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        bump_instance(&env);
        Ok(())
    }

    /// Usually called once to hand minting rights to the community governor.
    pub fn set_admin(env: Env, new_admin: Address) -> Result<(), VotingPowerError> {
        let admin = Self::require_admin(&env)?;
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &new_admin);
        bump_instance(&env);
        Ok(())
    }

    pub fn mint(env: Env, to: Address, amount: i128) -> Result<(), VotingPowerError> {
        let admin = Self::require_admin(&env)?;
        admin.require_auth();
        if amount <= 0 {
            return Err(VotingPowerError::InvalidAmount);
        }

        Self::write(&env, &to, amount)?;
        log!(&env, "minted {} votes", amount);
        Ok(())
    }

    pub fn burn(env: Env, from: Address, amount: i128) -> Result<(), VotingPowerError> {
        let admin = Self::require_admin(&env)?;
        admin.require_auth();
        if amount <= 0 {
            return Err(VotingPowerError::InvalidAmount);
        }

        Self::write(&env, &from, -amount)
    }

    pub fn votes(env: Env, account: Address) -> i128 {
        latest(&env, &History::Account(account))
    }

    /// Weight held by `account` strictly before `timestamp`.
    pub fn votes_at(env: Env, account: Address, timestamp: u64) -> i128 {
        value_before(&env, &History::Account(account), timestamp)
    }

    pub fn total_supply(env: Env) -> i128 {
        latest(&env, &History::Supply)
    }

    pub fn total_supply_at(env: Env, timestamp: u64) -> i128 {
        value_before(&env, &History::Supply, timestamp)
    }

    pub fn checkpoint_count(env: Env, account: Address) -> u32 {
        list_len(&env, &History::Account(account).len_key())
    }

    pub fn admin(env: Env) -> Result<Address, VotingPowerError> {
        Self::require_admin(&env)
    }
}

impl VotingPower {
    fn require_admin(env: &Env) -> Result<Address, VotingPowerError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(VotingPowerError::NotInitialized)
    }

    fn write(env: &Env, account: &Address, delta: i128) -> Result<(), VotingPowerError> {
        let previous = push(env, &History::Account(account.clone()), delta)?;
        push(env, &History::Supply, delta)?;

        VotesChanged {
            account: account.clone(),
            previous,
            current: previous + delta,
        }
        .publish(env);
        Ok(())
    }
}

fn checkpoint_at(env: &Env, history: &History, position: u32) -> Option<Checkpoint> {
    env.storage().persistent().get(&history.item_key(position))
}

fn last(env: &Env, history: &History) -> Option<(u32, Checkpoint)> {
    let len = list_len(env, &history.len_key());
    if len == 0 {
        return None;
    }
    checkpoint_at(env, history, len - 1).map(|checkpoint| (len - 1, checkpoint))
}

fn latest(env: &Env, history: &History) -> i128 {
    last(env, history)
        .map(|(_, checkpoint)| checkpoint.votes)
        .unwrap_or(0)
}

/// Appends a checkpoint, or folds into the last one when it was written in
/// the same second. Returns the value before the change.
fn push(env: &Env, history: &History, delta: i128) -> Result<i128, VotingPowerError> {
    let tail = last(env, history);
    let previous = tail
        .as_ref()
        .map(|(_, checkpoint)| checkpoint.votes)
        .unwrap_or(0);
    let current = previous
        .checked_add(delta)
        .ok_or(VotingPowerError::InvalidAmount)?;
    if current < 0 {
        return Err(VotingPowerError::InsufficientVotes);
    }

    let now = env.ledger().timestamp();
    let checkpoint = Checkpoint {
        timestamp: now,
        votes: current,
    };
    match tail {
        Some((position, last)) if last.timestamp == now => {
            let key = history.item_key(position);
            env.storage().persistent().set(&key, &checkpoint);
            bump_persistent(env, &key);
        }
        _ => {
            list_push(
                env,
                &history.len_key(),
                |position| history.item_key(position),
                &checkpoint,
            );
        }
    }
    Ok(previous)
}

/// Binary search for the last checkpoint written strictly before `timestamp`.
fn value_before(env: &Env, history: &History, timestamp: u64) -> i128 {
    let mut low = 0u32;
    let mut high = list_len(env, &history.len_key());
    while low < high {
        let mid = low + (high - low) / 2;
        let before = checkpoint_at(env, history, mid)
            .map(|checkpoint| checkpoint.timestamp < timestamp)
            .unwrap_or(false);
        if before {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    if low == 0 {
        0
    } else {
        checkpoint_at(env, history, low - 1)
            .map(|checkpoint| checkpoint.votes)
            .unwrap_or(0)
    }
}
