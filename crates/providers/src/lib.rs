//! Text-completion capability for callsim.
//!
//! The core never talks to a model vendor directly: all requests go through
//! a backend chat proxy that holds the credentials. [`CompletionClient`] is
//! the seam the analysis pipeline depends on; [`ChatProxyClient`] is the
//! HTTP adapter for the proxy's OpenAI-shaped contract.

pub mod proxy;
pub mod traits;

mod util;

pub use proxy::ChatProxyClient;
pub use traits::{ChatMessage, CompletionClient, CompletionRequest, Role};
