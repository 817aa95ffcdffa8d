//! The learned policy: the [`TrainablePolicy`] seam used by the training
//! loop, the Burn network behind it, and the board encoding it consumes.

mod agent;
pub mod algorithms;
pub mod networks;
pub mod state_encoding;

pub use agent::TrainablePolicy;
pub use algorithms::PolicyAgent;
pub use networks::{PolicyNetwork, PolicyNetworkConfig};

#[cfg(test)]
pub(crate) use agent::testing;
