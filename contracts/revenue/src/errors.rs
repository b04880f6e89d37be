use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RevenueError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    CohortNotFound = 3,
    CommunityNotFound = 4,
    ModuleNotConfigured = 5,
    // authorization
    NotGovernor = 10,
    // state
    CohortClosed = 20,
    DuplicatePayment = 21,
    // capacity
    CohortFull = 40,
    // validation
    InvalidAmount = 50,
    InvalidCohortParams = 51,
    Overflow = 60,
}
