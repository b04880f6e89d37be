use soroban_sdk::{contractevent, contracttype, Address};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    CheckpointCount(Address),
    Checkpoint(Address, u32),
    SupplyCheckpointCount,
    SupplyCheckpoint(u32),
}

/// One checkpoint history, stored one entry per checkpoint.
#[derive(Clone)]
pub enum History {
    Account(Address),
    Supply,
}

impl History {
    pub fn len_key(&self) -> DataKey {
        match self {
            History::Account(account) => DataKey::CheckpointCount(account.clone()),
            History::Supply => DataKey::SupplyCheckpointCount,
        }
    }

    pub fn item_key(&self, position: u32) -> DataKey {
        match self {
            History::Account(account) => DataKey::Checkpoint(account.clone(), position),
            History::Supply => DataKey::SupplyCheckpoint(position),
        }
    }
}

/// Voting weight in effect from `timestamp` onwards.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub timestamp: u64,
    pub votes: i128,
}

#[contractevent]
pub struct VotesChanged {
    #[topic]
    pub account: Address,
    pub previous: i128,
    pub current: i128,
}
