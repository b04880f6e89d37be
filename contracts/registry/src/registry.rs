use common::{bump_instance, bump_persistent, modules, Community, CommunityParams};
use soroban_sdk::{contract, contractimpl, log, Address, BytesN, Env, String, Vec};

use crate::errors::RegistryError;
use crate::types::{
    BootstrapCompleted, CommunityCreated, CommunityUpdated, DataKey, ModuleBound,
    MAX_MODULE_NAME_LEN,
};

#[contract]
pub struct CommunityRegistry;

#[contractimpl]
impl CommunityRegistry {
    pub fn initialize(env: Env, admin: Address) -> Result<(), RegistryError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(RegistryError::AlreadyInitialized);
        }
        admin.require_auth();

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::CommunityCount, &0u64);
        bump_instance(&env);
        Ok(())
    }

    /// Registers a new community. Until `complete_bootstrap` is called the
    /// registry admin may wire its modules.
    pub fn create_community(
        env: Env,
        name: String,
        params: CommunityParams,
    ) -> Result<u64, RegistryError> {
        let admin = Self::require_admin(&env)?;
        admin.require_auth();

        if name.len() == 0 || !params.is_valid() {
            return Err(RegistryError::InvalidParams);
        }

        let community_id = env
            .storage()
            .instance()
            .get::<_, u64>(&DataKey::CommunityCount)
            .unwrap_or(0)
            + 1;
        env.storage()
            .instance()
            .set(&DataKey::CommunityCount, &community_id);

        let community = Community {
            id: community_id,
            name: name.clone(),
            active: true,
            bootstrapped: false,
            created_at: env.ledger().timestamp(),
            params,
        };
        Self::save_community(&env, &community);
        bump_instance(&env);

        CommunityCreated { community_id, name }.publish(&env);
        log!(&env, "community {} created", community_id);

        Ok(community_id)
    }

    pub fn set_module(
        env: Env,
        caller: Address,
        community_id: u64,
        name: String,
        address: Address,
    ) -> Result<(), RegistryError> {
        let community = Self::load_community(&env, community_id)?;
        Self::require_writer(&env, &community, &caller)?;
        Self::validate_name(&name)?;

        let key = DataKey::Module(community_id, common::module_key(&env, &name));
        env.storage().persistent().set(&key, &address);
        bump_persistent(&env, &key);

        let mut names = Self::module_names(env.clone(), community_id);
        if !names.contains(&name) {
            names.push_back(name.clone());
            let names_key = DataKey::ModuleNames(community_id);
            env.storage().persistent().set(&names_key, &names);
            bump_persistent(&env, &names_key);
        }

        ModuleBound {
            community_id,
            name,
            address: Some(address),
        }
        .publish(&env);
        Ok(())
    }

    pub fn remove_module(
        env: Env,
        caller: Address,
        community_id: u64,
        name: String,
    ) -> Result<(), RegistryError> {
        let community = Self::load_community(&env, community_id)?;
        Self::require_writer(&env, &community, &caller)?;

        let key = DataKey::Module(community_id, common::module_key(&env, &name));
        if !env.storage().persistent().has(&key) {
            return Err(RegistryError::ModuleNotFound);
        }
        env.storage().persistent().remove(&key);

        let mut names = Self::module_names(env.clone(), community_id);
        if let Some(index) = names.first_index_of(&name) {
            names.remove(index);
            let names_key = DataKey::ModuleNames(community_id);
            env.storage().persistent().set(&names_key, &names);
            bump_persistent(&env, &names_key);
        }

        ModuleBound {
            community_id,
            name,
            address: None,
        }
        .publish(&env);
        Ok(())
    }

    /// Hands write authority over the community to its governor binding.
    pub fn complete_bootstrap(env: Env, community_id: u64) -> Result<(), RegistryError> {
        let admin = Self::require_admin(&env)?;
        admin.require_auth();

        let mut community = Self::load_community(&env, community_id)?;
        if community.bootstrapped {
            return Err(RegistryError::AlreadyBootstrapped);
        }
        let governor_name = String::from_str(&env, modules::GOVERNOR);
        let governor = Self::module(env.clone(), community_id, governor_name)
            .ok_or(RegistryError::GovernorNotConfigured)?;

        community.bootstrapped = true;
        Self::save_community(&env, &community);

        BootstrapCompleted {
            community_id,
            governor,
        }
        .publish(&env);
        log!(&env, "community {} bootstrapped", community_id);
        Ok(())
    }

    pub fn update_params(
        env: Env,
        caller: Address,
        community_id: u64,
        params: CommunityParams,
    ) -> Result<(), RegistryError> {
        let mut community = Self::load_community(&env, community_id)?;
        Self::require_writer(&env, &community, &caller)?;
        if !params.is_valid() {
            return Err(RegistryError::InvalidParams);
        }

        community.params = params;
        Self::save_community(&env, &community);

        CommunityUpdated {
            community_id,
            active: community.active,
        }
        .publish(&env);
        Ok(())
    }

    pub fn set_active(
        env: Env,
        caller: Address,
        community_id: u64,
        active: bool,
    ) -> Result<(), RegistryError> {
        let mut community = Self::load_community(&env, community_id)?;
        Self::require_writer(&env, &community, &caller)?;

        community.active = active;
        Self::save_community(&env, &community);

        CommunityUpdated {
            community_id,
            active,
        }
        .publish(&env);
        Ok(())
    }

    pub fn community(env: Env, community_id: u64) -> Result<Community, RegistryError> {
        Self::load_community(&env, community_id)
    }

    pub fn module(env: Env, community_id: u64, name: String) -> Option<Address> {
        env.storage()
            .persistent()
            .get(&DataKey::Module(community_id, common::module_key(&env, &name)))
    }

    pub fn module_names(env: Env, community_id: u64) -> Vec<String> {
        env.storage()
            .persistent()
            .get(&DataKey::ModuleNames(community_id))
            .unwrap_or(Vec::new(&env))
    }

    pub fn module_key(env: Env, name: String) -> BytesN<32> {
        common::module_key(&env, &name)
    }

    pub fn community_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::CommunityCount)
            .unwrap_or(0)
    }

    pub fn admin(env: Env) -> Result<Address, RegistryError> {
        Self::require_admin(&env)
    }
}

impl CommunityRegistry {
    fn require_admin(env: &Env) -> Result<Address, RegistryError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(RegistryError::NotInitialized)
    }

    /// The admin writes while a community is bootstrapping; afterwards only
    /// the community's governor does.
    fn require_writer(
        env: &Env,
        community: &Community,
        caller: &Address,
    ) -> Result<(), RegistryError> {
        caller.require_auth();

        let writer = if community.bootstrapped {
            Self::module(
                env.clone(),
                community.id,
                String::from_str(env, modules::GOVERNOR),
            )
            .ok_or(RegistryError::GovernorNotConfigured)?
        } else {
            Self::require_admin(env)?
        };

        if &writer != caller {
            return Err(RegistryError::Unauthorized);
        }
        Ok(())
    }

    fn validate_name(name: &String) -> Result<(), RegistryError> {
        if name.len() == 0 || name.len() > MAX_MODULE_NAME_LEN {
            return Err(RegistryError::InvalidModuleName);
        }
        Ok(())
    }

    fn load_community(env: &Env, community_id: u64) -> Result<Community, RegistryError> {
        Self::require_admin(env)?;
        env.storage()
            .persistent()
            .get(&DataKey::Community(community_id))
            .ok_or(RegistryError::CommunityNotFound)
    }

    fn save_community(env: &Env, community: &Community) {
        let key = DataKey::Community(community.id);
        env.storage().persistent().set(&key, community);
        bump_persistent(env, &key);
    }
}
