pub mod bookings;
pub mod businesses;
pub mod health;
pub mod listings;
pub mod search;
pub mod users;
