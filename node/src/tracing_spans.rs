//! Pre-built [`tracing::Span`] constructors, one per thread role (§5) plus
//! the per-block processing span. Using consistent span names across the
//! codebase makes it easy to filter and correlate traces by role.

use tracing::{info_span, Span};

pub fn ledger_writer_span() -> Span {
    info_span!("ledger_writer")
}

pub fn election_loop_span() -> Span {
    info_span!("election_loop")
}

pub fn vote_processor_span() -> Span {
    info_span!("vote_processor")
}

pub fn wallet_actions_span() -> Span {
    info_span!("wallet_actions")
}

pub fn confirmation_height_span() -> Span {
    info_span!("confirmation_height")
}

/// Span covering the full block-processing pipeline for a single block.
pub fn block_process_span(block_hash: &str) -> Span {
    info_span!("block_process", hash = %block_hash)
}

/// Span covering a single consensus vote against an election.
pub fn vote_span(candidate_hash: &str) -> Span {
    info_span!("vote", candidate = %candidate_hash)
}
