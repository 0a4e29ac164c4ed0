mod booking;
mod business;
mod listing;
mod user;

pub use booking::*;
pub use business::*;
pub use listing::*;
pub use user::*;
