mod self_imitation;

pub use self_imitation::PolicyAgent;
