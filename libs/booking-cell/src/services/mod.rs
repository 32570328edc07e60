pub mod booking;
pub mod catalog;
pub mod payment;

pub use booking::BookingService;
pub use catalog::CatalogService;
