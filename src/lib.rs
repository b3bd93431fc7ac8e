//! Client core of the GRAMS resource request workflow: status buckets, the
//! budget ledger, pre-submission checks and a typed client for the backend.

pub mod api;
pub mod auth;
pub mod completion;
pub mod config;
pub mod draft;
pub mod error;
pub mod http;
pub mod ledger;
pub mod request;
pub mod review;
pub mod service;
pub mod status;
pub mod utils;
pub mod view;
