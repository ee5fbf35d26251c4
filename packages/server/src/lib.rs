// Tour Package Booking - API Core
//
// Serves tour packages and bookings as schemaless JSON documents stored in
// Postgres, plus the like/unlike toggle over a tour's `likedBy` set.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
