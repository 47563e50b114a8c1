pub mod error;
pub mod local_client;
pub mod repo;
pub mod service;
pub mod validation;

pub use error::DomainError;
pub use service::Service;

#[cfg(test)]
mod service_test;
