use soroban_sdk::{Address, Env, String};

use crate::interfaces::DirectoryClient;

pub const GOVERNOR: &str = "governor";
pub const TIMELOCK: &str = "timelock";
pub const REQUEST_HUB: &str = "request_hub";
pub const DRAFT_MANAGER: &str = "draft_manager";
pub const ACTION_REGISTRY: &str = "action_registry";
pub const CLAIMS: &str = "claims";
pub const VERIFIER_POOL: &str = "verifier_pool";
pub const COHORT_REGISTRY: &str = "cohort_registry";
pub const REVENUE_ROUTER: &str = "revenue_router";
pub const VOTING_POWER: &str = "voting_power";
pub const TREASURY: &str = "treasury";
pub const WORKER_POOL: &str = "worker_pool";

/// Looks up a module binding. `None` means "not configured" and must never
/// be used as a destination.
pub fn resolve(env: &Env, registry: &Address, community_id: u64, name: &str) -> Option<Address> {
    DirectoryClient::new(env, registry).module(&community_id, &String::from_str(env, name))
}

/// Roles that gate privileged entry points. Each role is held by whatever
/// module the community currently binds under the matching name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Capability {
    Governance,
    ClaimsEngine,
}

impl Capability {
    pub fn module_name(self) -> &'static str {
        match self {
            Capability::Governance => GOVERNOR,
            Capability::ClaimsEngine => CLAIMS,
        }
    }
}

/// Resolves the holder of `capability` and demands its authorization.
///
/// Returns `None` when the community binds nobody to that role.
pub fn authorize(
    env: &Env,
    registry: &Address,
    community_id: u64,
    capability: Capability,
) -> Option<Address> {
    let holder = resolve(env, registry, community_id, capability.module_name())?;
    holder.require_auth();
    Some(holder)
}
