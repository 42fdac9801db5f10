//! Session handling for rustb2.
//!
//! Every B2 call is authorized by a token obtained from
//! `b2_authorize_account`. This crate owns that token:
//!
//! - [`Session`] is the cached authorization plus its derived expiry.
//! - [`SessionStore`] persists sessions between invocations, either in
//!   memory ([`InMemoryStore`]) or in a JSON file ([`DiskStore`]).
//! - [`SessionManager`] hands out fresh session snapshots, refreshing through
//!   an [`Authorizer`] when the cached one is missing or expired. Concurrent
//!   refreshes collapse into a single authorization call.

pub mod clock;
pub mod manager;
pub mod session;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use manager::{Authorizer, SessionManager};
pub use session::{SESSION_KEY, Session};
pub use store::{DiskStore, InMemoryStore, SessionStore};
