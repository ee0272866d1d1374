pub mod admission;
pub mod notifications;
pub mod registry;
pub mod targets;
