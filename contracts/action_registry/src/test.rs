#![cfg(test)]

use super::*;
use common::{modules, ActionParams, CommunityParams, RevenueSplit, RewardSpec};
use registry::{CommunityRegistry, CommunityRegistryClient};
use soroban_sdk::{testutils::Address as _, vec, Address, BytesN, Env, String};

struct Setup<'a> {
    client: ActionRegistryClient<'a>,
    directory: CommunityRegistryClient<'a>,
    admin: Address,
    community_id: u64,
}

fn setup(env: &Env) -> Setup<'_> {
    env.mock_all_auths();

    let directory = CommunityRegistryClient::new(env, &env.register(CommunityRegistry, ()));
    let admin = Address::generate(env);
    directory.initialize(&admin);
    let community_id = directory.create_community(
        &String::from_str(env, "Harbor Makers"),
        &CommunityParams {
            debate_window: 0,
            vote_window: 100,
            execution_delay: 10,
            proposal_threshold: 0,
            revenue_split: RevenueSplit {
                workers_bps: 5000,
                treasury_bps: 5000,
                investors_bps: 0,
            },
            withdrawal_fee_bps: 0,
        },
    );
    directory.set_module(
        &admin,
        &community_id,
        &String::from_str(env, modules::GOVERNOR),
        &Address::generate(env),
    );

    let client = ActionRegistryClient::new(env, &env.register(ActionRegistry, ()));
    client.initialize(&admin, &directory.address);

    Setup {
        client,
        directory,
        admin,
        community_id,
    }
}

fn params(env: &Env) -> ActionParams {
    ActionParams {
        rewards: vec![
            env,
            RewardSpec {
                token: Address::generate(env),
                amount: 500,
            },
        ],
        jurors_min: 2,
        panel_size: 3,
        verify_window: 3600,
        cooldown: 600,
        max_concurrent: 1,
        verifier_reward_weight: 10,
        slash_bps: 1000,
        revocable: true,
        reward_tranches: 1,
        tranche_interval: 0,
    }
}

fn nonce(env: &Env, seed: u8) -> BytesN<32> {
    BytesN::from_array(env, &[seed; 32])
}

#[test]
fn test_two_step_activation() {
    let env = Env::default();
    let s = setup(&env);

    let action_id = s
        .client
        .propose_valuable_action(&s.community_id, &params(&env), &nonce(&env, 1));
    assert_eq!(action_id, 1);

    let action = s.client.action(&action_id);
    assert!(!action.active);
    assert_eq!(action.community_id, s.community_id);
    assert_eq!(
        s.client.actions_for_community(&s.community_id, &0, &10),
        vec![&env, 1u64]
    );

    s.client.activate_from_governance(&action_id, &nonce(&env, 2));
    assert!(s.client.action(&action_id).active);
    assert!(s.client.is_ref_used(&nonce(&env, 2)));

    assert_eq!(
        s.client.try_activate_from_governance(&action_id, &nonce(&env, 3)),
        Err(Ok(ActionRegistryError::AlreadyActive))
    );
}

#[test]
fn test_governance_ref_cannot_be_replayed() {
    let env = Env::default();
    let s = setup(&env);

    let action_id = s
        .client
        .propose_valuable_action(&s.community_id, &params(&env), &nonce(&env, 7));
    assert_eq!(
        s.client.try_activate_from_governance(&action_id, &nonce(&env, 7)),
        Err(Ok(ActionRegistryError::RefAlreadyUsed))
    );
    assert_eq!(
        s.client
            .try_propose_valuable_action(&s.community_id, &params(&env), &nonce(&env, 7)),
        Err(Ok(ActionRegistryError::RefAlreadyUsed))
    );
}

#[test]
fn test_parameter_validation() {
    let env = Env::default();
    let s = setup(&env);

    let mut bad = params(&env);
    bad.jurors_min = 4;
    assert_eq!(
        s.client.try_propose_valuable_action(&s.community_id, &bad, &nonce(&env, 1)),
        Err(Ok(ActionRegistryError::InvalidJurorCount))
    );

    let mut bad = params(&env);
    bad.jurors_min = 0;
    assert_eq!(
        s.client.try_propose_valuable_action(&s.community_id, &bad, &nonce(&env, 2)),
        Err(Ok(ActionRegistryError::InvalidJurorCount))
    );

    let mut bad = params(&env);
    bad.slash_bps = 10_001;
    assert_eq!(
        s.client.try_propose_valuable_action(&s.community_id, &bad, &nonce(&env, 3)),
        Err(Ok(ActionRegistryError::InvalidSlashRate))
    );

    let mut bad = params(&env);
    bad.verify_window = 0;
    assert_eq!(
        s.client.try_propose_valuable_action(&s.community_id, &bad, &nonce(&env, 4)),
        Err(Ok(ActionRegistryError::InvalidWindow))
    );

    let mut bad = params(&env);
    bad.reward_tranches = 3;
    assert_eq!(
        s.client.try_propose_valuable_action(&s.community_id, &bad, &nonce(&env, 5)),
        Err(Ok(ActionRegistryError::InvalidTranches))
    );
}

#[test]
fn test_deprecated_action_cannot_return() {
    let env = Env::default();
    let s = setup(&env);

    let action_id = s
        .client
        .propose_valuable_action(&s.community_id, &params(&env), &nonce(&env, 1));
    s.client.activate_from_governance(&action_id, &nonce(&env, 2));
    s.client.deprecate(&action_id, &nonce(&env, 3));

    let action = s.client.action(&action_id);
    assert!(!action.active);
    assert!(action.deprecated);

    assert_eq!(
        s.client.try_activate_from_governance(&action_id, &nonce(&env, 4)),
        Err(Ok(ActionRegistryError::Deprecated))
    );
    assert_eq!(
        s.client.try_deprecate(&action_id, &nonce(&env, 5)),
        Err(Ok(ActionRegistryError::Deprecated))
    );
}

#[test]
fn test_requires_governor_binding() {
    let env = Env::default();
    let s = setup(&env);

    s.directory.remove_module(
        &s.admin,
        &s.community_id,
        &String::from_str(&env, modules::GOVERNOR),
    );
    assert_eq!(
        s.client
            .try_propose_valuable_action(&s.community_id, &params(&env), &nonce(&env, 1)),
        Err(Ok(ActionRegistryError::GovernorNotConfigured))
    );
    assert_eq!(s.client.try_action(&42), Err(Ok(ActionRegistryError::ActionNotFound)));
}

#[test]
fn test_community_index_pages() {
    let env = Env::default();
    let s = setup(&env);

    for seed in 1..=5u8 {
        s.client
            .propose_valuable_action(&s.community_id, &params(&env), &nonce(&env, seed));
    }
    assert_eq!(s.client.action_count(&s.community_id), 5);
    assert_eq!(
        s.client.actions_for_community(&s.community_id, &0, &2),
        vec![&env, 1u64, 2]
    );
    assert_eq!(
        s.client.actions_for_community(&s.community_id, &3, &10),
        vec![&env, 4u64, 5]
    );
    assert_eq!(
        s.client.actions_for_community(&s.community_id, &7, &10).len(),
        0
    );
    assert_eq!(s.client.action_count(&(s.community_id + 1)), 0);
}

#[test]
fn test_double_initialize() {
    let env = Env::default();
    let s = setup(&env);
    assert_eq!(
        s.client.try_initialize(&s.admin, &s.directory.address),
        Err(Ok(ActionRegistryError::AlreadyInitialized))
    );
}
