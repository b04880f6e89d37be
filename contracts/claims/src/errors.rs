use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ClaimsError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    ClaimNotFound = 3,
    ActionNotFound = 4,
    ModuleNotConfigured = 5,
    // authorization
    NotPanelist = 10,
    NotGovernor = 11,
    // state
    ActionInactive = 20,
    NotPending = 21,
    AlreadyVoted = 22,
    NotApproved = 23,
    NotRevocable = 24,
    RewardTransferFailed = 25,
    PoolCallFailed = 26,
    // temporal
    CooldownActive = 30,
    VerifyWindowClosed = 31,
    VerifyWindowOpen = 32,
    TrancheNotDue = 33,
    // capacity
    TooManyPending = 40,
    InsufficientJurors = 41,
    AllTranchesPaid = 42,
    // integrity
    RefAlreadyUsed = 50,
    Overflow = 60,
}
