pub mod lifecycle;
pub mod models;
pub mod store;
pub mod sweep;

pub use lifecycle::{cancellation_guard, CancelOrigin, LifecycleError, RequestLifecycle};
pub use models::{PaymentStatus, RequestStatus, VendorRequest, MAX_PEOPLE};
pub use store::VendorRequestStore;
pub use sweep::SweepReport;

#[cfg(test)]
pub(crate) mod test_support;
