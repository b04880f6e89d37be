use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum PoolError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    VerifierNotFound = 3,
    CommunityNotFound = 4,
    // authorization
    NotClaimsEngine = 10,
    // state
    NotRegistered = 20,
    SeatsOpen = 21,
    // capacity
    InsufficientBond = 40,
    InsufficientVerifiers = 41,
    // validation
    InvalidAmount = 50,
    InvalidPanelSize = 51,
    InvalidRate = 52,
    Overflow = 60,
}
