use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum EscalationError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    RequestNotFound = 3,
    CommentNotFound = 4,
    DraftNotFound = 5,
    CommunityNotFound = 6,
    GovernorNotConfigured = 7,
    VotesNotConfigured = 8,
    // authorization
    Unauthorized = 10,
    SelfReview = 11,
    BelowProposalThreshold = 12,
    // state
    RequestClosed = 20,
    DraftNotOpen = 21,
    AlreadyReviewed = 22,
    PolicyNotMet = 23,
    NotFinalized = 24,
    AlreadyEscalated = 25,
    CommunityInactive = 26,
    ProposalRejected = 27,
    DuplicateProposal = 28,
    // validation
    EmptyContent = 50,
    InvalidParent = 51,
    InvalidBundle = 52,
    InvalidPolicy = 53,
    InvalidOption = 54,
}
