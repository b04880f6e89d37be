#![cfg(test)]

use super::*;
use common::{modules, CallBundle, CommunityParams, Payload, RevenueSplit};
use governor::{Governor, GovernorClient, GovernorConfig, ProposalStatus};
use registry::{CommunityRegistry, CommunityRegistryClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    vec, Address, Env, String, Symbol, Vec,
};
use voting_power::{VotingPower, VotingPowerClient};

struct Setup<'a> {
    env: Env,
    hub: EscalationClient<'a>,
    directory: CommunityRegistryClient<'a>,
    governor: GovernorClient<'a>,
    votes: VotingPowerClient<'a>,
    admin: Address,
    community_id: u64,
    author: Address,
}

fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let admin = Address::generate(&env);
    let directory = CommunityRegistryClient::new(&env, &env.register(CommunityRegistry, ()));
    directory.initialize(&admin);
    let community_id = directory.create_community(
        &String::from_str(&env, "Orchard Commons"),
        &CommunityParams {
            debate_window: 60,
            vote_window: 600,
            execution_delay: 60,
            proposal_threshold: 10,
            revenue_split: RevenueSplit {
                workers_bps: 5000,
                treasury_bps: 5000,
                investors_bps: 0,
            },
            withdrawal_fee_bps: 0,
        },
    );

    let votes = VotingPowerClient::new(&env, &env.register(VotingPower, ()));
    votes.initialize(&admin);
    let governor = GovernorClient::new(&env, &env.register(Governor, ()));
    governor.initialize(&GovernorConfig {
        registry: directory.address.clone(),
        community_id,
        guardian: admin.clone(),
        treasury_token: env.register_stellar_asset_contract_v2(admin.clone()).address(),
        quorum_bps: 1000,
        grace_period: 3_600,
    });
    for (name, address) in [
        (modules::GOVERNOR, &governor.address),
        (modules::VOTING_POWER, &votes.address),
    ] {
        directory.set_module(
            &admin,
            &community_id,
            &String::from_str(&env, name),
            address,
        );
    }

    let hub = EscalationClient::new(&env, &env.register(Escalation, ()));
    hub.initialize(
        &admin,
        &directory.address,
        &ReviewPolicy {
            min_reviews: 2,
            min_support_bps: 5000,
        },
    );

    let author = Address::generate(&env);
    env.ledger().set_timestamp(1_000);
    votes.mint(&author, &50);
    env.ledger().set_timestamp(2_000);

    Setup {
        env,
        hub,
        directory,
        governor,
        votes,
        admin,
        community_id,
        author,
    }
}

fn bundle(s: &Setup) -> CallBundle {
    CallBundle {
        targets: vec![&s.env, s.votes.address.clone()],
        values: vec![&s.env, 0i128],
        payloads: vec![
            &s.env,
            Payload {
                function: Symbol::new(&s.env, "total_supply"),
                args: Vec::new(&s.env),
            },
        ],
    }
}

fn text(s: &Setup, value: &str) -> String {
    String::from_str(&s.env, value)
}

/// Opens a request with one draft on it and returns both ids.
fn draft(s: &Setup) -> (u64, u64) {
    let request_id = s
        .hub
        .create_request(&s.author, &s.community_id, &text(s, "Fund a tool library"));
    let draft_id = s.hub.create_draft(&s.author, &request_id, &bundle(s));
    (request_id, draft_id)
}

fn review(s: &Setup, draft_id: u64, support: bool) -> Address {
    let reviewer = Address::generate(&s.env);
    s.hub
        .submit_review(&reviewer, &draft_id, &support, &text(s, "read it"));
    reviewer
}

#[test]
fn test_request_to_proposal() {
    let s = setup();
    let (request_id, draft_id) = draft(&s);

    let first = s
        .hub
        .post_comment(&s.author, &request_id, &text(&s, "budget attached"), &None);
    let reply = s.hub.post_comment(
        &Address::generate(&s.env),
        &request_id,
        &text(&s, "looks fine"),
        &Some(first),
    );
    assert_eq!(s.hub.comment(&reply).parent, Some(first));
    assert_eq!(
        s.hub.comments_for_request(&request_id, &0, &10),
        vec![&s.env, first, reply]
    );
    assert_eq!(
        s.hub.comments_for_request(&request_id, &1, &1),
        vec![&s.env, reply]
    );
    assert_eq!(
        s.hub.drafts_for_request(&request_id, &0, &10),
        vec![&s.env, draft_id]
    );

    review(&s, draft_id, true);
    review(&s, draft_id, false);
    s.hub.finalize_for_proposal(&s.author, &draft_id);
    assert_eq!(s.hub.request(&request_id).status, RequestStatus::Frozen);
    assert_eq!(s.hub.draft(&draft_id).status, DraftStatus::Finalized);

    let description = text(&s, "Tool library, round one");
    let proposal_id =
        s.hub
            .escalate_to_proposal(&s.author, &draft_id, &false, &0, &description);

    let expected = s.governor.hash_proposal(
        &bundle(&s),
        &common::description_hash(&s.env, &description),
    );
    assert_eq!(proposal_id, expected);
    assert_eq!(s.governor.proposal(&proposal_id).proposer, s.author);
    assert_eq!(s.governor.state(&proposal_id), ProposalStatus::Pending);

    let stored = s.hub.draft(&draft_id);
    assert_eq!(stored.status, DraftStatus::Escalated);
    assert_eq!(stored.proposal_id, Some(proposal_id));

    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&s.author, &draft_id, &false, &0, &description),
        Err(Ok(EscalationError::AlreadyEscalated))
    );
    assert_eq!(
        s.hub
            .try_post_comment(&s.author, &request_id, &text(&s, "late"), &None),
        Err(Ok(EscalationError::RequestClosed))
    );
}

#[test]
fn test_review_rules() {
    let s = setup();
    let (_, draft_id) = draft(&s);

    assert_eq!(
        s.hub
            .try_submit_review(&s.author, &draft_id, &true, &text(&s, "mine")),
        Err(Ok(EscalationError::SelfReview))
    );

    let reviewer = review(&s, draft_id, true);
    assert_eq!(
        s.hub
            .try_submit_review(&reviewer, &draft_id, &false, &text(&s, "changed my mind")),
        Err(Ok(EscalationError::AlreadyReviewed))
    );
    assert!(s.hub.review(&draft_id, &reviewer).unwrap().support);
    assert_eq!(s.hub.reviewers_for_draft(&draft_id, &0, &10), vec![&s.env, reviewer]);
}

#[test]
fn test_policy_gates_finalization() {
    let s = setup();
    let (_, draft_id) = draft(&s);

    review(&s, draft_id, true);
    assert_eq!(
        s.hub.try_finalize_for_proposal(&s.author, &draft_id),
        Err(Ok(EscalationError::PolicyNotMet))
    );

    review(&s, draft_id, false);
    review(&s, draft_id, false);
    assert_eq!(
        s.hub.try_finalize_for_proposal(&s.author, &draft_id),
        Err(Ok(EscalationError::PolicyNotMet))
    );

    s.hub.set_review_policy(&ReviewPolicy {
        min_reviews: 3,
        min_support_bps: 3000,
    });
    assert_eq!(
        s.hub
            .try_finalize_for_proposal(&Address::generate(&s.env), &draft_id),
        Err(Ok(EscalationError::Unauthorized))
    );
    s.hub.finalize_for_proposal(&s.author, &draft_id);

    assert_eq!(
        s.hub.try_set_review_policy(&ReviewPolicy {
            min_reviews: 1,
            min_support_bps: 10_001,
        }),
        Err(Ok(EscalationError::InvalidPolicy))
    );
}

#[test]
fn test_escalation_requires_finalized_draft() {
    let s = setup();
    let (_, draft_id) = draft(&s);

    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&s.author, &draft_id, &false, &0, &text(&s, "early")),
        Err(Ok(EscalationError::NotFinalized))
    );
    assert_eq!(
        s.hub.try_create_draft(
            &s.author,
            &draft_id,
            &CallBundle {
                targets: Vec::new(&s.env),
                values: Vec::new(&s.env),
                payloads: Vec::new(&s.env),
            },
        ),
        Err(Ok(EscalationError::InvalidBundle))
    );
}

#[test]
fn test_governor_rejection_surfaces() {
    let s = setup();
    let outsider = Address::generate(&s.env);
    let request_id = s
        .hub
        .create_request(&outsider, &s.community_id, &text(&s, "Paint the hall"));
    let draft_id = s.hub.create_draft(&outsider, &request_id, &bundle(&s));
    review(&s, draft_id, true);
    review(&s, draft_id, true);
    s.hub.finalize_for_proposal(&outsider, &draft_id);

    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&outsider, &draft_id, &false, &0, &text(&s, "paint")),
        Err(Ok(EscalationError::BelowProposalThreshold))
    );
    assert_eq!(s.hub.draft(&draft_id).status, DraftStatus::Finalized);

    s.directory.remove_module(
        &s.admin,
        &s.community_id,
        &String::from_str(&s.env, modules::GOVERNOR),
    );
    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&outsider, &draft_id, &false, &0, &text(&s, "paint")),
        Err(Ok(EscalationError::GovernorNotConfigured))
    );
}

/// Finalizes a fresh draft of the shared bundle with two supporting reviews.
fn finalized_draft(s: &Setup) -> u64 {
    let (_, draft_id) = draft(s);
    review(s, draft_id, true);
    review(s, draft_id, true);
    s.hub.finalize_for_proposal(&s.author, &draft_id);
    draft_id
}

#[test]
fn test_governor_refusals_keep_their_kind() {
    let s = setup();
    let first = finalized_draft(&s);
    let second = finalized_draft(&s);
    let description = text(&s, "Tool library");

    s.hub
        .escalate_to_proposal(&s.author, &first, &false, &0, &description);
    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&s.author, &second, &false, &0, &description),
        Err(Ok(EscalationError::DuplicateProposal))
    );
    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&s.author, &second, &true, &1, &text(&s, "ranked")),
        Err(Ok(EscalationError::InvalidOption))
    );

    s.directory.set_active(&s.admin, &s.community_id, &false);
    assert_eq!(
        s.hub
            .try_escalate_to_proposal(&s.author, &second, &false, &0, &text(&s, "retry")),
        Err(Ok(EscalationError::CommunityInactive))
    );
    assert_eq!(s.hub.draft(&second).status, DraftStatus::Finalized);
}

#[test]
fn test_archive_and_threading() {
    let s = setup();
    let (request_id, _) = draft(&s);
    let other = s
        .hub
        .create_request(&s.author, &s.community_id, &text(&s, "Second topic"));
    let foreign = s
        .hub
        .post_comment(&s.author, &other, &text(&s, "elsewhere"), &None);

    assert_eq!(
        s.hub
            .try_post_comment(&s.author, &request_id, &text(&s, "reply"), &Some(foreign)),
        Err(Ok(EscalationError::InvalidParent))
    );
    assert_eq!(
        s.hub
            .try_post_comment(&s.author, &request_id, &text(&s, ""), &None),
        Err(Ok(EscalationError::EmptyContent))
    );

    assert_eq!(
        s.hub.try_archive_request(&Address::generate(&s.env), &request_id),
        Err(Ok(EscalationError::Unauthorized))
    );
    s.hub.archive_request(&s.admin, &request_id);
    assert_eq!(s.hub.request(&request_id).status, RequestStatus::Archived);
    assert_eq!(
        s.hub
            .try_create_draft(&s.author, &request_id, &bundle(&s)),
        Err(Ok(EscalationError::RequestClosed))
    );
    assert_eq!(
        s.hub.requests_for_community(&s.community_id, &0, &10),
        vec![&s.env, request_id, other]
    );
    assert_eq!(
        s.hub
            .try_create_request(&s.author, &99, &text(&s, "nowhere")),
        Err(Ok(EscalationError::CommunityNotFound))
    );
}
