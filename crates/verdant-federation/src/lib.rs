//! Federation layer for the Verdant platform.
//!
//! Keeps an in-memory registry of serving nodes, each advertising the agent
//! types it can answer, and routes queries to the best one. Local
//! (on-premises, data-sovereign) nodes are preferred over cloud nodes.
//! Queries routed to another local node are forwarded over HTTP; queries
//! routed to a cloud node are answered by this process's own agents.
//!
//! Membership is not persisted and there is no consensus between nodes.
//! Liveness is derived at read time from the last heartbeat.
//!
//! Node credentials are real Ed25519 key pairs, but no transport verifies
//! them yet. The certificate fingerprint travels as a plain header.

pub mod credentials;
pub mod error;
pub mod manager;
pub mod transport;

pub use credentials::{certificate_fingerprint, generate_node_credentials};
pub use error::FederationError;
pub use manager::{FederationManager, DEFAULT_FORWARD_TIMEOUT};
pub use transport::{HttpTransport, CERTIFICATE_FINGERPRINT_HEADER, SOURCE_NODE_HEADER};
