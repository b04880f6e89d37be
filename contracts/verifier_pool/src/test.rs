#![cfg(test)]

use super::*;
use common::{codes, modules, CommunityParams, RevenueSplit};
use registry::{CommunityRegistry, CommunityRegistryClient};
use soroban_sdk::{testutils::Address as _, token, Address, Env, String, Vec};

struct Setup<'a> {
    env: Env,
    pool: VerifierPoolClient<'a>,
    directory: CommunityRegistryClient<'a>,
    token: token::Client<'a>,
    minter: token::StellarAssetClient<'a>,
    admin: Address,
    treasury: Address,
    community_id: u64,
}

const MIN_BOND: i128 = 100;

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let directory = CommunityRegistryClient::new(&env, &env.register(CommunityRegistry, ()));
    directory.initialize(&admin);
    let community_id = directory.create_community(
        &String::from_str(&env, "Quarry Guild"),
        &CommunityParams {
            debate_window: 0,
            vote_window: 60,
            execution_delay: 0,
            proposal_threshold: 0,
            revenue_split: RevenueSplit {
                workers_bps: 10_000,
                treasury_bps: 0,
                investors_bps: 0,
            },
            withdrawal_fee_bps: 500,
        },
    );

    let asset = env.register_stellar_asset_contract_v2(admin.clone()).address();
    let pool = VerifierPoolClient::new(&env, &env.register(VerifierPool, ()));
    pool.initialize(
        &admin,
        &PoolConfig {
            registry: directory.address.clone(),
            community_id,
            bond_token: asset.clone(),
            min_bond: MIN_BOND,
        },
    );

    let treasury = Address::generate(&env);
    for (name, address) in [
        (modules::CLAIMS, Address::generate(&env)),
        (modules::VERIFIER_POOL, pool.address.clone()),
        (modules::TREASURY, treasury.clone()),
    ] {
        directory.set_module(
            &admin,
            &community_id,
            &String::from_str(&env, name),
            &address,
        );
    }

    Setup {
        token: token::Client::new(&env, &asset),
        minter: token::StellarAssetClient::new(&env, &asset),
        env,
        pool,
        directory,
        admin,
        treasury,
        community_id,
    }
}

fn bonded(s: &Setup, bond: i128) -> Address {
    let verifier = Address::generate(&s.env);
    s.minter.mint(&verifier, &1_000);
    s.pool.register_verifier(&verifier, &bond);
    verifier
}

#[test]
fn test_register_is_idempotent() {
    let s = setup();
    let verifier = bonded(&s, 150);

    assert_eq!(s.token.balance(&verifier), 850);
    assert_eq!(s.token.balance(&s.pool.address), 150);

    s.pool.register_verifier(&verifier, &300);
    assert_eq!(s.token.balance(&verifier), 850);
    assert_eq!(s.pool.verifier(&verifier).bond, 150);
    assert_eq!(s.pool.active_verifiers().len(), 1);
}

#[test]
fn test_register_below_minimum() {
    let s = setup();
    let verifier = Address::generate(&s.env);
    s.minter.mint(&verifier, &1_000);

    assert_eq!(
        s.pool.try_register_verifier(&verifier, &(MIN_BOND - 1)),
        Err(Ok(PoolError::InsufficientBond))
    );
    assert_eq!(
        s.pool.try_register_verifier(&verifier, &0),
        Err(Ok(PoolError::InvalidAmount))
    );
    assert_eq!(s.pool.eligible_count(), 0);
}

#[test]
fn test_panel_is_distinct_and_excludes_claimant() {
    let s = setup();
    let mut everyone = Vec::new(&s.env);
    for _ in 0..5 {
        everyone.push_back(bonded(&s, MIN_BOND));
    }
    let claimant = everyone.get_unchecked(0);

    let panel = s.pool.select_panel(&1, &claimant, &4);
    assert_eq!(panel.len(), 4);
    assert!(!panel.contains(&claimant));
    for (index, juror) in panel.iter().enumerate() {
        assert!(everyone.contains(&juror));
        assert_eq!(panel.first_index_of(&juror), Some(index as u32));
    }
}

#[test]
fn test_panel_needs_enough_verifiers() {
    let s = setup();
    let claimant = bonded(&s, MIN_BOND);
    bonded(&s, MIN_BOND);
    bonded(&s, MIN_BOND);

    assert_eq!(
        s.pool.try_select_panel(&1, &claimant, &3),
        Err(Ok(PoolError::InsufficientVerifiers))
    );
    assert_eq!(
        PoolError::InsufficientVerifiers as u32,
        codes::verifier_pool::INSUFFICIENT_VERIFIERS
    );
    assert_eq!(
        s.pool.try_select_panel(&1, &claimant, &0),
        Err(Ok(PoolError::InvalidPanelSize))
    );
    assert_eq!(s.pool.select_panel(&1, &claimant, &2).len(), 2);
}

#[test]
fn test_slash_deregisters_below_minimum() {
    let s = setup();
    let verifier = bonded(&s, 120);

    assert_eq!(s.pool.slash(&verifier, &1000), 12);
    let record = s.pool.verifier(&verifier);
    assert_eq!(record.bond, 108);
    assert!(record.registered);
    assert_eq!(s.token.balance(&s.treasury), 12);

    assert_eq!(s.pool.slash(&verifier, &1000), 10);
    let record = s.pool.verifier(&verifier);
    assert_eq!(record.bond, 98);
    assert!(!record.registered);
    assert_eq!(record.inaccurate_votes, 2);
    assert_eq!(s.pool.active_verifiers().len(), 0);

    // Re-bonding on top of the remainder brings the verifier back.
    s.pool.register_verifier(&verifier, &2);
    assert!(s.pool.verifier(&verifier).registered);
    assert_eq!(s.pool.verifier(&verifier).bond, 100);
}

#[test]
fn test_slash_without_treasury_keeps_funds() {
    let s = setup();
    let verifier = bonded(&s, 200);
    s.directory.remove_module(
        &s.admin,
        &s.community_id,
        &String::from_str(&s.env, modules::TREASURY),
    );

    assert_eq!(s.pool.slash(&verifier, &2500), 50);
    assert_eq!(s.token.balance(&s.pool.address), 200);
    assert_eq!(
        s.pool.try_slash(&verifier, &10_001),
        Err(Ok(PoolError::InvalidRate))
    );
}

#[test]
fn test_reputation_bookkeeping() {
    let s = setup();
    let verifier = bonded(&s, MIN_BOND);

    s.pool.reward(&verifier, &7);
    s.pool.record_absence(&verifier);
    let record = s.pool.verifier(&verifier);
    assert_eq!(record.reputation, 7 - ABSENCE_PENALTY);
    assert_eq!(record.accurate_votes, 1);
    assert_eq!(record.missed_votes, 1);

    assert_eq!(
        s.pool.try_reward(&Address::generate(&s.env), &1),
        Err(Ok(PoolError::VerifierNotFound))
    );
}

#[test]
fn test_withdraw_charges_fee() {
    let s = setup();
    let verifier = bonded(&s, 200);

    assert_eq!(s.pool.withdraw_bond(&verifier), 190);
    assert_eq!(s.token.balance(&verifier), 990);
    assert_eq!(s.token.balance(&s.treasury), 10);
    assert!(!s.pool.verifier(&verifier).registered);
    assert_eq!(s.pool.eligible_count(), 0);
    assert_eq!(
        s.pool.try_withdraw_bond(&verifier),
        Err(Ok(PoolError::InvalidAmount))
    );
}

#[test]
fn test_bond_locked_while_seated() {
    let s = setup();
    let claimant = bonded(&s, MIN_BOND);
    let juror = bonded(&s, MIN_BOND);

    assert_eq!(
        s.pool.select_panel(&1, &claimant, &1),
        Vec::from_array(&s.env, [juror.clone()])
    );
    s.pool.select_panel(&2, &claimant, &1);
    assert_eq!(s.pool.verifier(&juror).open_seats, 2);
    assert_eq!(
        s.pool.try_withdraw_bond(&juror),
        Err(Ok(PoolError::SeatsOpen))
    );

    s.pool.release_seat(&juror);
    assert_eq!(
        s.pool.try_withdraw_bond(&juror),
        Err(Ok(PoolError::SeatsOpen))
    );
    s.pool.release_seat(&juror);
    assert_eq!(s.pool.withdraw_bond(&juror), 95);
    assert_eq!(s.pool.verifier(&juror).open_seats, 0);
}

#[test]
fn test_claims_capability_required() {
    let s = setup();
    let verifier = bonded(&s, MIN_BOND);
    s.directory.remove_module(
        &s.admin,
        &s.community_id,
        &String::from_str(&s.env, modules::CLAIMS),
    );

    assert_eq!(
        s.pool.try_slash(&verifier, &100),
        Err(Ok(PoolError::NotClaimsEngine))
    );
    assert_eq!(
        s.pool.try_select_panel(&1, &Address::generate(&s.env), &1),
        Err(Ok(PoolError::NotClaimsEngine))
    );
    assert_eq!(
        s.pool.try_release_seat(&verifier),
        Err(Ok(PoolError::NotClaimsEngine))
    );
}

#[test]
fn test_double_initialize() {
    let s = setup();
    assert_eq!(
        s.pool.try_initialize(&s.admin, &s.pool.config()),
        Err(Ok(PoolError::AlreadyInitialized))
    );
}
