pub mod models;

pub use models::{Booking, STATUS_COMPLETED};
