use common::{CallBundle, BPS_DENOMINATOR};
use soroban_sdk::{contractevent, contracttype, Address, BytesN, String};

/// Minimum review a draft needs before it may become a proposal.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReviewPolicy {
    pub min_reviews: u32,
    /// Share of supporting reviews required, in basis points.
    pub min_support_bps: u32,
}

impl ReviewPolicy {
    pub fn is_valid(&self) -> bool {
        self.min_support_bps <= BPS_DENOMINATOR
    }

    pub fn is_met(&self, reviews: u32, support: u32) -> bool {
        reviews >= self.min_reviews
            && support as u64 * BPS_DENOMINATOR as u64
                >= self.min_support_bps as u64 * reviews as u64
    }
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Registry,
    Policy,
    RequestCount,
    Request(u64),
    CommunityRequestCount(u64),
    CommunityRequest(u64, u32),
    CommentCount,
    Comment(u64),
    RequestCommentCount(u64),
    RequestComment(u64, u32),
    DraftCount,
    Draft(u64),
    RequestDraftCount(u64),
    RequestDraft(u64, u32),
    Review(u64, Address),
    DraftReviewerCount(u64),
    DraftReviewer(u64, u32),
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RequestStatus {
    OpenDebate = 0,
    Frozen = 1,
    Archived = 2,
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum DraftStatus {
    Open = 0,
    Finalized = 1,
    Escalated = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Request {
    pub id: u64,
    pub community_id: u64,
    pub author: Address,
    pub content: String,
    pub status: RequestStatus,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub id: u64,
    pub request_id: u64,
    pub author: Address,
    pub content: String,
    pub parent: Option<u64>,
    pub created_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Draft {
    pub id: u64,
    pub request_id: u64,
    pub community_id: u64,
    pub author: Address,
    pub bundle: CallBundle,
    pub status: DraftStatus,
    pub created_at: u64,
    pub review_count: u32,
    pub support_count: u32,
    pub proposal_id: Option<BytesN<32>>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Review {
    pub support: bool,
    pub rationale: String,
    pub created_at: u64,
}

#[contractevent]
pub struct RequestCreated {
    #[topic]
    pub request_id: u64,
    #[topic]
    pub community_id: u64,
    pub author: Address,
}

#[contractevent]
pub struct CommentPosted {
    #[topic]
    pub request_id: u64,
    pub comment_id: u64,
    pub parent: Option<u64>,
}

#[contractevent]
pub struct RequestStatusChanged {
    #[topic]
    pub request_id: u64,
    pub status: RequestStatus,
}

#[contractevent]
pub struct DraftCreated {
    #[topic]
    pub draft_id: u64,
    #[topic]
    pub request_id: u64,
    pub author: Address,
}

#[contractevent]
pub struct ReviewSubmitted {
    #[topic]
    pub draft_id: u64,
    #[topic]
    pub reviewer: Address,
    pub support: bool,
}

#[contractevent]
pub struct DraftFinalized {
    #[topic]
    pub draft_id: u64,
    pub review_count: u32,
    pub support_count: u32,
}

#[contractevent]
pub struct DraftEscalated {
    #[topic]
    pub draft_id: u64,
    pub proposal_id: BytesN<32>,
}
