use lazy_static::lazy_static;
use prometheus::{register_counter, register_counter_vec, Counter, CounterVec};

lazy_static! {
    pub static ref PROVISION_RUNS_COUNTER: CounterVec = register_counter_vec!(
        "provisioning_runs_total",
        "Provisioning runs by outcome",
        &["outcome"]
    ).unwrap();

    pub static ref STEP_FAILURES_COUNTER: CounterVec = register_counter_vec!(
        "provisioning_step_failures_total",
        "Deployment provider failures by step",
        &["step"]
    ).unwrap();

    pub static ref PERSISTENCE_FAILURES_COUNTER: Counter = register_counter!(
        "provisioning_persistence_failures_total",
        "Deployments whose endpoint could not be written back"
    ).unwrap();
}
