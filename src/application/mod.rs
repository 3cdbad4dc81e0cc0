//! Application layer containing the business-rule orchestration.
//!
//! This module defines the `PaymentService`, the entry point every inbound
//! interface calls. It holds a repository chosen at the boundary and never
//! learns which backend it was given.

pub mod service;
