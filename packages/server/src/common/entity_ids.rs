//! Typed ID definitions for the stored collections.
//!
//! ```rust
//! use tour_core::common::{BookingId, TourId};
//!
//! let tour_id = TourId::new();
//! let booking_id = BookingId::new();
//! assert_ne!(tour_id.into_uuid(), booking_id.into_uuid());
//! ```

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for tour packages (the `tours` collection).
pub struct Tour;

/// Marker type for bookings placed against a tour package.
pub struct Booking;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

pub type TourId = Id<Tour>;

pub type BookingId = Id<Booking>;
