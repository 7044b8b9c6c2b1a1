#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

//! Pseudonym resolution and caching for federated identity.
//!
//! Each user has one durable *polymorphic pseudonym* (PP) and, per relying
//! service, one *encrypted pseudonym* (EP) derived on demand from the PP
//! through a remote pseudonym provider. A third operation re-randomizes a
//! pseudonym without changing the identity it represents.
//!
//! The crate owns the get-or-create resolution workflow and its caching; the
//! pseudonym mathematics itself is injected through the [`PseudonymCrypto`]
//! and [`PseudonymCodec`] capability traits. Queries are submitted through
//! [`QueryDispatcher`], which runs each operation as its own Tokio task and
//! returns results as rectangular string tables.

mod config;
pub use config::*;

mod dispatcher;
pub use dispatcher::*;

mod error;
pub use error::*;

pub mod logger;

mod provider;
pub use provider::*;

mod pseudonym;
pub use pseudonym::*;

mod resolver;
pub use resolver::*;

pub mod store;

// private modules
mod http_request;
mod locks;
