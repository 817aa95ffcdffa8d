mod policy_network;

pub use policy_network::{record_specs, PolicyNetwork, PolicyNetworkConfig, PolicyNetworkRecord};
