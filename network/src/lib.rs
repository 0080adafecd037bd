//! P2P networking — named-interface boundary only.
//!
//! Peer discovery, TCP transport, SYN-cookie authentication, bandwidth
//! throttling, clock synchronization, and bootstrap/sync are deliberately
//! not implemented here; an embedder supplies its own transport and wires
//! it to the node crate's `Broadcaster` and `BootstrapHint` traits. This
//! crate exists only to give that future transport a shared error type to
//! report through.

pub mod error;

pub use error::NetworkError;
