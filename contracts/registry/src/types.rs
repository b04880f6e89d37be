use soroban_sdk::{contractevent, contracttype, Address, BytesN, String};

pub const MAX_MODULE_NAME_LEN: u32 = 32;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    CommunityCount,
    Community(u64),
    Module(u64, BytesN<32>),
    ModuleNames(u64),
}

#[contractevent]
pub struct CommunityCreated {
    #[topic]
    pub community_id: u64,
    pub name: String,
}

#[contractevent]
pub struct ModuleBound {
    #[topic]
    pub community_id: u64,
    pub name: String,
    pub address: Option<Address>,
}

#[contractevent]
pub struct BootstrapCompleted {
    #[topic]
    pub community_id: u64,
    pub governor: Address,
}

#[contractevent]
pub struct CommunityUpdated {
    #[topic]
    pub community_id: u64,
    pub active: bool,
}
