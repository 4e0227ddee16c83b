//! HTTP oracle adapter
//!
//! Talks to an OpenAI-compatible `/chat/completions` endpoint and exposes
//! it through the [`LlmGateway`](ecogroup_application::LlmGateway) port.

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;

pub use error::OracleError;
pub use gateway::{HttpGatewayConfig, HttpLlmGateway};
pub use session::HttpSession;
