//! Session management for callsim.
//!
//! One training call is one [`ConversationSession`]: an append-only
//! transcript, a one-way lifecycle (`Preparing → Active → Analyzing →
//! Complete`), and the artifacts derived from analysis. Sessions are
//! persisted whole through the [`SessionStore`] in a storage shape that
//! stays backward compatible with previously saved records.

pub mod record;
pub mod session;
pub mod store;
pub mod transcript;

pub use record::{ConversationRecord, StoredMessage};
pub use session::{ConversationSession, SessionPhase};
pub use store::SessionStore;
pub use transcript::{ConversationTurn, Speaker, Transcript};
