pub mod auth;
pub mod booking;

pub use auth::AuthService;
pub use booking::{BookingError, BookingService};
