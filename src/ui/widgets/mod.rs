pub mod tracking;

pub use tracking::{Focus, PendingLookup, TrackingWidget};
