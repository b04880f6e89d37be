use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    CommunityNotFound = 3,
    ModuleNotFound = 4,
    // authorization
    Unauthorized = 10,
    // state
    AlreadyBootstrapped = 20,
    GovernorNotConfigured = 21,
    // validation
    InvalidParams = 50,
    InvalidModuleName = 51,
}
