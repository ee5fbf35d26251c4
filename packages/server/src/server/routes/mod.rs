// HTTP routes
pub mod bookings;
pub mod health;
pub mod likes;
pub mod tours;

pub use bookings::*;
pub use health::*;
pub use likes::*;
pub use tours::*;
