//! HTTP client for the document-classifier job service.
//!
//! Provides the REST API wrapper, configuration loading, a headless
//! view model, the job session controller and the fixed-cadence poll
//! task used to follow a job until it finishes.

pub mod api;
pub mod config;
pub mod error;
pub mod poller;
pub mod session;
pub mod view;
