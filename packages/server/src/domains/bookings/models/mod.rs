pub mod booking;

pub use booking::{Booking, STATUS_COMPLETED};
