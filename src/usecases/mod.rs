//! Application use cases. Orchestrate domain logic via ports.

pub mod bot_service;
pub mod normalizer;
pub mod relay_service;

pub use bot_service::BotService;
pub use normalizer::RequestNormalizer;
pub use relay_service::RelayService;
