pub mod logger;
pub mod settings;

pub mod app;

pub mod application_impl;
pub mod application_port;
pub mod domain;
pub mod domain_model;
pub mod domain_port;
pub mod infra_http;
pub mod infra_local;

#[cfg(test)]
mod test_support;
