//! Directory integration tests
//!
//! Account management, authentication and grant decisions through the public
//! `Directory` API.

mod accounts;
mod concurrency;
