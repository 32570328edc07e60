pub mod availability;
pub mod provider;

pub use availability::AvailabilityService;
pub use provider::ProviderService;
