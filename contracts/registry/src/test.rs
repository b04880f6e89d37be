#![cfg(test)]

use super::*;
use common::{modules, CommunityParams, RevenueSplit};
use soroban_sdk::{testutils::Address as _, Address, Env, String};

fn default_params() -> CommunityParams {
    CommunityParams {
        debate_window: 3600,
        vote_window: 86_400,
        execution_delay: 7200,
        proposal_threshold: 10,
        revenue_split: RevenueSplit {
            workers_bps: 5000,
            treasury_bps: 2000,
            investors_bps: 3000,
        },
        withdrawal_fee_bps: 100,
    }
}

fn setup(env: &Env) -> (CommunityRegistryClient<'_>, Address, u64) {
    env.mock_all_auths();
    let contract_id = env.register(CommunityRegistry, ());
    let client = CommunityRegistryClient::new(env, &contract_id);

    let admin = Address::generate(env);
    client.initialize(&admin);
    let community_id = client.create_community(&String::from_str(env, "Riverside Co-op"), &default_params());
    (client, admin, community_id)
}

#[test]
fn test_create_community() {
    let env = Env::default();
    let (client, admin, community_id) = setup(&env);

    assert_eq!(community_id, 1);
    assert_eq!(client.community_count(), 1);
    assert_eq!(client.admin(), admin);

    let community = client.community(&community_id);
    assert!(community.active);
    assert!(!community.bootstrapped);
    assert_eq!(community.params, default_params());
}

#[test]
#[should_panic(expected = "Error(Contract, #2)")]
fn test_initialize_twice() {
    let env = Env::default();
    let (client, admin, _) = setup(&env);
    client.initialize(&admin);
}

#[test]
fn test_invalid_revenue_split_rejected() {
    let env = Env::default();
    let (client, _, _) = setup(&env);

    let mut params = default_params();
    params.revenue_split.workers_bps = 6000;
    let result = client.try_create_community(&String::from_str(&env, "Broken"), &params);
    assert_eq!(result, Err(Ok(RegistryError::InvalidParams)));
}

#[test]
fn test_module_binding_and_lookup() {
    let env = Env::default();
    let (client, admin, community_id) = setup(&env);

    let claims = Address::generate(&env);
    let name = String::from_str(&env, modules::CLAIMS);
    client.set_module(&admin, &community_id, &name, &claims);

    assert_eq!(client.module(&community_id, &name), Some(claims));
    assert_eq!(
        client.module(&community_id, &String::from_str(&env, modules::TREASURY)),
        None
    );
    assert_eq!(client.module_names(&community_id).len(), 1);
    assert_eq!(client.module_key(&name), common::module_key(&env, &name));
}

#[test]
fn test_remove_module() {
    let env = Env::default();
    let (client, admin, community_id) = setup(&env);

    let name = String::from_str(&env, modules::TREASURY);
    client.set_module(&admin, &community_id, &name, &Address::generate(&env));
    client.remove_module(&admin, &community_id, &name);

    assert_eq!(client.module(&community_id, &name), None);
    assert_eq!(client.module_names(&community_id).len(), 0);
    assert_eq!(
        client.try_remove_module(&admin, &community_id, &name),
        Err(Ok(RegistryError::ModuleNotFound))
    );
}

#[test]
fn test_bootstrap_requires_governor() {
    let env = Env::default();
    let (client, _, community_id) = setup(&env);

    assert_eq!(
        client.try_complete_bootstrap(&community_id),
        Err(Ok(RegistryError::GovernorNotConfigured))
    );
}

#[test]
fn test_governor_owns_community_after_bootstrap() {
    let env = Env::default();
    let (client, admin, community_id) = setup(&env);

    let governor = Address::generate(&env);
    client.set_module(
        &admin,
        &community_id,
        &String::from_str(&env, modules::GOVERNOR),
        &governor,
    );
    client.complete_bootstrap(&community_id);
    assert!(client.community(&community_id).bootstrapped);

    let treasury = String::from_str(&env, modules::TREASURY);
    let result = client.try_set_module(&admin, &community_id, &treasury, &Address::generate(&env));
    assert_eq!(result, Err(Ok(RegistryError::Unauthorized)));

    let vault = Address::generate(&env);
    client.set_module(&governor, &community_id, &treasury, &vault);
    assert_eq!(client.module(&community_id, &treasury), Some(vault));

    let mut params = default_params();
    params.execution_delay = 1;
    client.update_params(&governor, &community_id, &params);
    assert_eq!(client.community(&community_id).params.execution_delay, 1);

    client.set_active(&governor, &community_id, &false);
    assert!(!client.community(&community_id).active);

    assert_eq!(
        client.try_complete_bootstrap(&community_id),
        Err(Ok(RegistryError::AlreadyBootstrapped))
    );
}

#[test]
fn test_unknown_community() {
    let env = Env::default();
    let (client, _, _) = setup(&env);
    assert_eq!(client.try_community(&9), Err(Ok(RegistryError::CommunityNotFound)));
}
