//! Millguard monitoring engine.
//!
//! Two independent state machines share one [`StateStore`]:
//!
//! - [`DecisionCore`] turns a sensor reading into a classification and,
//!   when a fault's cooldown has elapsed, a fault alert.
//! - [`MaintenanceScheduler`] tracks preventive maintenance and sends
//!   suppression-gated "maintenance due" reminders.
//!
//! Both take their collaborators (store, classifier, dispatcher) as
//! constructor arguments and keep no state between calls.
//!
//! [`StateStore`]: millguard_db::StateStore

pub mod classifier;
mod claim;
pub mod config;
pub mod decision;
pub mod error;
pub mod maintenance;

pub use classifier::{ClassifierError, ModelPipeline, ScaleAndClassify};
pub use config::{MonitorConfig, StoreFailurePolicy};
pub use decision::{AlertBookkeeping, DecisionCore, Evaluation};
pub use error::MonitorError;
pub use maintenance::{MaintenanceScheduler, MaintenanceStatus};
