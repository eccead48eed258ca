mod client;

pub use client::{CubeClient, FetchOutcome};
