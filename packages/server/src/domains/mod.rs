// Business domains
pub mod bookings;
pub mod tours;
