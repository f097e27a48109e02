//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract used by the subscription service.
//! - Isolate SQLite query details from request handling.
//!
//! # Invariants
//! - Every statement binds user input as parameters; SQL text is fixed.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod subscription_repo;
