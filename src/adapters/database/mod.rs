//! Database abstraction layer
//!
//! A trait-based seam between the live processor and the relational
//! database, so processors can be tested against in-memory clients.

pub mod factory;
pub mod traits;

pub use factory::connect;
pub use traits::DatabaseClient;
