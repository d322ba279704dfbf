pub mod company;
pub mod deployment;
