pub mod booking;
pub mod business;
pub mod listing;
pub mod search;
pub mod user;

pub(crate) fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_else(|| "-".into())
}
