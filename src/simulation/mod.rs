//! Random scenario generation for stress testing the settlement path.

pub mod scenario;
