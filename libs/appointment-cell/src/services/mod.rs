pub mod booking;
pub mod calendar;

pub use booking::BookingService;
