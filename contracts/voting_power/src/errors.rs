use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VotingPowerError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InsufficientVotes = 40,
    InvalidAmount = 50,
}
