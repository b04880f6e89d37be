use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum GovernorError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    ProposalNotFound = 3,
    CommunityNotFound = 4,
    VotesNotConfigured = 5,
    // authorization
    Unauthorized = 10,
    BelowProposalThreshold = 11,
    NoVotingPower = 12,
    // state
    InvalidState = 20,
    DuplicateProposal = 21,
    AlreadyVoted = 22,
    AlreadyExecuted = 23,
    CommunityInactive = 24,
    CallFailed = 25,
    // temporal
    VotingNotStarted = 30,
    VotingClosed = 31,
    VotingOpen = 32,
    TimelockPending = 33,
    ProposalExpired = 34,
    // integrity
    BundleMismatch = 50,
    InvalidBundle = 51,
    InvalidOption = 52,
    InvalidConfig = 53,
    Overflow = 60,
}
