pub mod metrics;
pub mod naming;
pub mod provisioner;
pub mod railway;
pub mod recorder;
pub mod resolver;
pub mod secrets;
