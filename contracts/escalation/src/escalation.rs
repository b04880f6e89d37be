use common::{
    bump_instance, bump_persistent, codes, is_contract_error, list_page, list_push, modules,
    resolve, CallBundle, DirectoryClient, ProposerClient,
};
use soroban_sdk::{contract, contractimpl, log, Address, BytesN, Env, Error, String, Vec};

use crate::errors::EscalationError;
use crate::types::{
    Comment, CommentPosted, DataKey, Draft, DraftCreated, DraftEscalated, DraftFinalized,
    DraftStatus, Request, RequestCreated, RequestStatus, RequestStatusChanged, Review,
    ReviewPolicy, ReviewSubmitted,
};

/// Request hub and draft manager: the path from an open discussion to a
/// governor proposal.
#[contract]
pub struct Escalation;

#[contractimpl]
impl Escalation {
    pub fn initialize(
        env: Env,
        admin: Address,
        registry: Address,
        policy: ReviewPolicy,
    ) -> Result<(), EscalationError> {
        if env.storage().instance().has(&DataKey::Admin) {
            return Err(EscalationError::AlreadyInitialized);
        }
        admin.require_auth();
        if !policy.is_valid() {
            return Err(EscalationError::InvalidPolicy);
        }

        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Registry, &registry);
        env.storage().instance().set(&DataKey::Policy, &policy);
        bump_instance(&env);
        Ok(())
    }

    pub fn set_review_policy(env: Env, policy: ReviewPolicy) -> Result<(), EscalationError> {
        Self::load_admin(&env)?.require_auth();
        if !policy.is_valid() {
            return Err(EscalationError::InvalidPolicy);
        }
        env.storage().instance().set(&DataKey::Policy, &policy);
        bump_instance(&env);
        Ok(())
    }

    pub fn create_request(
        env: Env,
        author: Address,
        community_id: u64,
        content: String,
    ) -> Result<u64, EscalationError> {
        let registry = Self::load_registry(&env)?;
        author.require_auth();
        if content.len() == 0 {
            return Err(EscalationError::EmptyContent);
        }

        match DirectoryClient::new(&env, &registry).try_community(&community_id) {
            Ok(Ok(community)) if community.active => {}
            Ok(Ok(_)) => return Err(EscalationError::CommunityInactive),
            _ => return Err(EscalationError::CommunityNotFound),
        }

        let request_id = next_id(&env, &DataKey::RequestCount);
        let request = Request {
            id: request_id,
            community_id,
            author: author.clone(),
            content,
            status: RequestStatus::OpenDebate,
            created_at: env.ledger().timestamp(),
        };
        Self::save_request(&env, &request);
        list_push(
            &env,
            &DataKey::CommunityRequestCount(community_id),
            |position| DataKey::CommunityRequest(community_id, position),
            &request_id,
        );

        RequestCreated {
            request_id,
            community_id,
            author,
        }
        .publish(&env);
        Ok(request_id)
    }

    /// Adds a comment, optionally as a reply to another comment on the same
    /// request.
    pub fn post_comment(
        env: Env,
        author: Address,
        request_id: u64,
        content: String,
        parent: Option<u64>,
    ) -> Result<u64, EscalationError> {
        Self::load_registry(&env)?;
        author.require_auth();
        if content.len() == 0 {
            return Err(EscalationError::EmptyContent);
        }

        let request = Self::load_request(&env, request_id)?;
        if request.status != RequestStatus::OpenDebate {
            return Err(EscalationError::RequestClosed);
        }
        if let Some(parent_id) = parent {
            let parent_comment = Self::comment(env.clone(), parent_id)
                .map_err(|_| EscalationError::InvalidParent)?;
            if parent_comment.request_id != request_id {
                return Err(EscalationError::InvalidParent);
            }
        }

        let comment_id = next_id(&env, &DataKey::CommentCount);
        let key = DataKey::Comment(comment_id);
        env.storage().persistent().set(
            &key,
            &Comment {
                id: comment_id,
                request_id,
                author,
                content,
                parent,
                created_at: env.ledger().timestamp(),
            },
        );
        bump_persistent(&env, &key);
        list_push(
            &env,
            &DataKey::RequestCommentCount(request_id),
            |position| DataKey::RequestComment(request_id, position),
            &comment_id,
        );

        CommentPosted {
            request_id,
            comment_id,
            parent,
        }
        .publish(&env);
        Ok(comment_id)
    }

    /// Closes a request still under debate. The author or the admin may do so.
    pub fn archive_request(
        env: Env,
        caller: Address,
        request_id: u64,
    ) -> Result<(), EscalationError> {
        let admin = Self::load_admin(&env)?;
        caller.require_auth();

        let mut request = Self::load_request(&env, request_id)?;
        if caller != request.author && caller != admin {
            return Err(EscalationError::Unauthorized);
        }
        if request.status != RequestStatus::OpenDebate {
            return Err(EscalationError::RequestClosed);
        }

        request.status = RequestStatus::Archived;
        Self::save_request(&env, &request);
        RequestStatusChanged {
            request_id,
            status: request.status,
        }
        .publish(&env);
        Ok(())
    }

    pub fn create_draft(
        env: Env,
        author: Address,
        request_id: u64,
        bundle: CallBundle,
    ) -> Result<u64, EscalationError> {
        Self::load_registry(&env)?;
        author.require_auth();

        let request = Self::load_request(&env, request_id)?;
        if request.status != RequestStatus::OpenDebate {
            return Err(EscalationError::RequestClosed);
        }
        if !bundle.is_well_formed() {
            return Err(EscalationError::InvalidBundle);
        }

        let draft_id = next_id(&env, &DataKey::DraftCount);
        let draft = Draft {
            id: draft_id,
            request_id,
            community_id: request.community_id,
            author: author.clone(),
            bundle,
            status: DraftStatus::Open,
            created_at: env.ledger().timestamp(),
            review_count: 0,
            support_count: 0,
            proposal_id: None,
        };
        Self::save_draft(&env, &draft);
        list_push(
            &env,
            &DataKey::RequestDraftCount(request_id),
            |position| DataKey::RequestDraft(request_id, position),
            &draft_id,
        );

        DraftCreated {
            draft_id,
            request_id,
            author,
        }
        .publish(&env);
        Ok(draft_id)
    }

    pub fn submit_review(
        env: Env,
        reviewer: Address,
        draft_id: u64,
        support: bool,
        rationale: String,
    ) -> Result<(), EscalationError> {
        Self::load_registry(&env)?;
        reviewer.require_auth();

        let mut draft = Self::load_draft(&env, draft_id)?;
        if draft.status != DraftStatus::Open {
            return Err(EscalationError::DraftNotOpen);
        }
        if reviewer == draft.author {
            return Err(EscalationError::SelfReview);
        }
        let key = DataKey::Review(draft_id, reviewer.clone());
        if env.storage().persistent().has(&key) {
            return Err(EscalationError::AlreadyReviewed);
        }

        env.storage().persistent().set(
            &key,
            &Review {
                support,
                rationale,
                created_at: env.ledger().timestamp(),
            },
        );
        bump_persistent(&env, &key);

        list_push(
            &env,
            &DataKey::DraftReviewerCount(draft_id),
            |position| DataKey::DraftReviewer(draft_id, position),
            &reviewer,
        );

        draft.review_count += 1;
        if support {
            draft.support_count += 1;
        }
        Self::save_draft(&env, &draft);

        ReviewSubmitted {
            draft_id,
            reviewer,
            support,
        }
        .publish(&env);
        Ok(())
    }

    /// Locks a reviewed draft for escalation and freezes its source request.
    pub fn finalize_for_proposal(
        env: Env,
        caller: Address,
        draft_id: u64,
    ) -> Result<(), EscalationError> {
        let policy = Self::review_policy(env.clone())?;
        caller.require_auth();

        let mut draft = Self::load_draft(&env, draft_id)?;
        if caller != draft.author {
            return Err(EscalationError::Unauthorized);
        }
        if draft.status != DraftStatus::Open {
            return Err(EscalationError::DraftNotOpen);
        }
        if !policy.is_met(draft.review_count, draft.support_count) {
            return Err(EscalationError::PolicyNotMet);
        }

        let mut request = Self::load_request(&env, draft.request_id)?;
        match request.status {
            RequestStatus::OpenDebate => {
                request.status = RequestStatus::Frozen;
                Self::save_request(&env, &request);
                RequestStatusChanged {
                    request_id: request.id,
                    status: request.status,
                }
                .publish(&env);
            }
            RequestStatus::Frozen => {}
            RequestStatus::Archived => return Err(EscalationError::RequestClosed),
        }

        draft.status = DraftStatus::Finalized;
        Self::save_draft(&env, &draft);

        DraftFinalized {
            draft_id,
            review_count: draft.review_count,
            support_count: draft.support_count,
        }
        .publish(&env);
        Ok(())
    }

    /// Submits the finalized draft's bundle to the community governor as is
    /// and records the proposal id. A draft escalates at most once.
    pub fn escalate_to_proposal(
        env: Env,
        caller: Address,
        draft_id: u64,
        multi_choice: bool,
        num_options: u32,
        description: String,
    ) -> Result<BytesN<32>, EscalationError> {
        let registry = Self::load_registry(&env)?;
        caller.require_auth();

        let mut draft = Self::load_draft(&env, draft_id)?;
        if caller != draft.author {
            return Err(EscalationError::Unauthorized);
        }
        match draft.status {
            DraftStatus::Finalized => {}
            DraftStatus::Escalated => return Err(EscalationError::AlreadyEscalated),
            DraftStatus::Open => return Err(EscalationError::NotFinalized),
        }

        let governor = resolve(&env, &registry, draft.community_id, modules::GOVERNOR)
            .ok_or(EscalationError::GovernorNotConfigured)?;
        let proposal_id = match ProposerClient::new(&env, &governor).try_propose(
            &caller,
            &draft.bundle,
            &description,
            &multi_choice,
            &num_options,
        ) {
            Ok(Ok(proposal_id)) => proposal_id,
            Err(Ok(error)) => return Err(governor_rejection(&error)),
            _ => return Err(EscalationError::ProposalRejected),
        };

        draft.status = DraftStatus::Escalated;
        draft.proposal_id = Some(proposal_id.clone());
        Self::save_draft(&env, &draft);

        DraftEscalated {
            draft_id,
            proposal_id: proposal_id.clone(),
        }
        .publish(&env);
        log!(&env, "draft {} escalated", draft_id);

        Ok(proposal_id)
    }

    pub fn request(env: Env, request_id: u64) -> Result<Request, EscalationError> {
        Self::load_request(&env, request_id)
    }

    pub fn comment(env: Env, comment_id: u64) -> Result<Comment, EscalationError> {
        env.storage()
            .persistent()
            .get(&DataKey::Comment(comment_id))
            .ok_or(EscalationError::CommentNotFound)
    }

    pub fn draft(env: Env, draft_id: u64) -> Result<Draft, EscalationError> {
        Self::load_draft(&env, draft_id)
    }

    pub fn review(env: Env, draft_id: u64, reviewer: Address) -> Option<Review> {
        env.storage()
            .persistent()
            .get(&DataKey::Review(draft_id, reviewer))
    }

    /// The index readers below page through ids in creation order.
    pub fn requests_for_community(env: Env, community_id: u64, start: u32, limit: u32) -> Vec<u64> {
        list_page(
            &env,
            &DataKey::CommunityRequestCount(community_id),
            |position| DataKey::CommunityRequest(community_id, position),
            start,
            limit,
        )
    }

    pub fn comments_for_request(env: Env, request_id: u64, start: u32, limit: u32) -> Vec<u64> {
        list_page(
            &env,
            &DataKey::RequestCommentCount(request_id),
            |position| DataKey::RequestComment(request_id, position),
            start,
            limit,
        )
    }

    pub fn drafts_for_request(env: Env, request_id: u64, start: u32, limit: u32) -> Vec<u64> {
        list_page(
            &env,
            &DataKey::RequestDraftCount(request_id),
            |position| DataKey::RequestDraft(request_id, position),
            start,
            limit,
        )
    }

    pub fn reviewers_for_draft(env: Env, draft_id: u64, start: u32, limit: u32) -> Vec<Address> {
        list_page(
            &env,
            &DataKey::DraftReviewerCount(draft_id),
            |position| DataKey::DraftReviewer(draft_id, position),
            start,
            limit,
        )
    }

    pub fn review_policy(env: Env) -> Result<ReviewPolicy, EscalationError> {
        env.storage()
            .instance()
            .get(&DataKey::Policy)
            .ok_or(EscalationError::NotInitialized)
    }
}

impl Escalation {
    fn load_admin(env: &Env) -> Result<Address, EscalationError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)
            .ok_or(EscalationError::NotInitialized)
    }

    fn load_registry(env: &Env) -> Result<Address, EscalationError> {
        env.storage()
            .instance()
            .get(&DataKey::Registry)
            .ok_or(EscalationError::NotInitialized)
    }

    fn load_request(env: &Env, request_id: u64) -> Result<Request, EscalationError> {
        env.storage()
            .persistent()
            .get(&DataKey::Request(request_id))
            .ok_or(EscalationError::RequestNotFound)
    }

    fn save_request(env: &Env, request: &Request) {
        let key = DataKey::Request(request.id);
        env.storage().persistent().set(&key, request);
        bump_persistent(env, &key);
    }

    fn load_draft(env: &Env, draft_id: u64) -> Result<Draft, EscalationError> {
        env.storage()
            .persistent()
            .get(&DataKey::Draft(draft_id))
            .ok_or(EscalationError::DraftNotFound)
    }

    fn save_draft(env: &Env, draft: &Draft) {
        let key = DataKey::Draft(draft.id);
        env.storage().persistent().set(&key, draft);
        bump_persistent(env, &key);
    }
}

/// Maps a governor refusal onto this contract's error kinds.
fn governor_rejection(error: &Error) -> EscalationError {
    [
        (
            codes::governor::BELOW_PROPOSAL_THRESHOLD,
            EscalationError::BelowProposalThreshold,
        ),
        (
            codes::governor::DUPLICATE_PROPOSAL,
            EscalationError::DuplicateProposal,
        ),
        (
            codes::governor::COMMUNITY_INACTIVE,
            EscalationError::CommunityInactive,
        ),
        (codes::governor::INVALID_OPTION, EscalationError::InvalidOption),
        (codes::governor::INVALID_BUNDLE, EscalationError::InvalidBundle),
        (
            codes::governor::VOTES_NOT_CONFIGURED,
            EscalationError::VotesNotConfigured,
        ),
    ]
    .into_iter()
    .find(|(code, _)| is_contract_error(error, *code))
    .map(|(_, kind)| kind)
    .unwrap_or(EscalationError::ProposalRejected)
}

fn next_id(env: &Env, counter: &DataKey) -> u64 {
    let id = env
        .storage()
        .instance()
        .get::<_, u64>(counter)
        .unwrap_or(0)
        + 1;
    env.storage().instance().set(counter, &id);
    bump_instance(env);
    id
}
