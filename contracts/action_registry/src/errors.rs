use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ActionRegistryError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    ActionNotFound = 3,
    GovernorNotConfigured = 4,
    // state
    AlreadyActive = 20,
    Deprecated = 21,
    // integrity
    RefAlreadyUsed = 50,
    InvalidJurorCount = 51,
    InvalidSlashRate = 52,
    InvalidWindow = 53,
    InvalidReward = 54,
    InvalidTranches = 55,
    InvalidConcurrency = 56,
}
