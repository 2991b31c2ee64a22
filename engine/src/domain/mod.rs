//! Behavioral query domain
//!
//! - `boundary` - Earliest meaningful timestamp of a team
//! - `identity` - Latest distinct id -> person association
//! - `stickiness` - Exact-count active bucket queries
//! - `elements` - Positional element predicates for volume queries
//! - `service` - Team-scoped entry points over the event store
//! - `demo` - Demo dataset generator

pub mod boundary;
pub mod demo;
pub mod elements;
pub mod error;
pub mod identity;
pub mod service;
pub mod stickiness;
pub mod team;

pub use boundary::{Clock, FixedClock, SystemClock};
pub use elements::{VolumeRequest, parse_volume_request};
pub use error::QueryError;
pub use identity::IdentityArena;
pub use service::QueryService;
pub use stickiness::{StickinessQuery, StickinessRange};
pub use team::TeamId;
