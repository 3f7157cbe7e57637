//! Remote service integration for the Tutor client.

pub mod http_gateway;

pub use http_gateway::HttpChatGateway;
