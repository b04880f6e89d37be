use soroban_sdk::{contractevent, contracttype, BytesN};

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Registry,
    ActionCount,
    Action(u64),
    CommunityActionCount(u64),
    CommunityAction(u64, u32),
    UsedRef(BytesN<32>),
}

#[contractevent]
pub struct ActionProposed {
    #[topic]
    pub action_id: u64,
    #[topic]
    pub community_id: u64,
    pub governance_ref: BytesN<32>,
}

#[contractevent]
pub struct ActionActivated {
    #[topic]
    pub action_id: u64,
    pub governance_ref: BytesN<32>,
}

#[contractevent]
pub struct ActionDeprecated {
    #[topic]
    pub action_id: u64,
    pub governance_ref: BytesN<32>,
}
