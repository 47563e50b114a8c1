pub mod error;
pub mod local_client;
pub mod ports;
pub mod service;
pub mod strategy;

pub use error::DomainError;
pub use service::Service;

#[cfg(test)]
mod service_test;
