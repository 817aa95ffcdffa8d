use std::path::Path;

use burn::module::AutodiffModule;
use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::{Adam, AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::record::{DefaultRecorder, Recorder};
use burn::tensor::activation::log_softmax;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::TensorData;

use crate::ai::agent::TrainablePolicy;
use crate::ai::networks::{record_specs, PolicyNetwork, PolicyNetworkConfig, PolicyNetworkRecord};
use crate::ai::state_encoding::encode_state;
use crate::checkpoint::{merge_parameters, MergeReport, ParamSpec};
use crate::error::CheckpointError;
use crate::game::GameState;

/// Weights file stem inside an artifact directory; the recorder adds the extension.
const WEIGHTS_FILE: &str = "policy_network";

/// Policy agent trained by self-imitation.
///
/// Each update is a cross-entropy step toward the move the agent itself
/// just sampled, independent of how the game ends. This reinforces
/// whatever it already tends to play; it is not a reward-weighted
/// policy-gradient objective.
pub struct PolicyAgent<B: AutodiffBackend> {
    network: PolicyNetwork<B>,
    optimizer: OptimizerAdaptor<Adam, PolicyNetwork<B>, B>,
    board_size: usize,
    learning_rate: f64,
    device: B::Device,
    step_count: usize,
}

impl<B: AutodiffBackend> PolicyAgent<B> {
    /// Fresh agent on an explicit device.
    pub fn new(board_size: usize, learning_rate: f64, device: &B::Device) -> Self {
        Self::with_network(PolicyNetworkConfig::new(board_size), learning_rate, device)
    }

    pub fn with_network(config: PolicyNetworkConfig, learning_rate: f64, device: &B::Device) -> Self {
        let network: PolicyNetwork<B> = config.init(device);
        let optimizer = AdamConfig::new().init();

        PolicyAgent {
            network,
            optimizer,
            board_size: config.board_size,
            learning_rate,
            device: device.clone(),
            step_count: 0,
        }
    }

    fn cells(&self) -> usize {
        self.board_size * self.board_size
    }
}

impl<B: AutodiffBackend> TrainablePolicy for PolicyAgent<B> {
    fn name(&self) -> &str {
        "SelfImitation"
    }

    fn board_size(&self) -> usize {
        self.board_size
    }

    fn evaluate(&self, state: &GameState) -> Vec<f32> {
        let input = encode_state::<B::InnerBackend>(state, &self.device).unsqueeze::<4>();
        let scores = self.network.valid().forward(input);
        scores
            .into_data()
            .convert::<f32>()
            .to_vec()
            .expect("float tensor converts to f32")
    }

    fn imitate(&mut self, state: &GameState, action: usize) -> f32 {
        let cells = self.cells();
        let input = encode_state::<B>(state, &self.device).unsqueeze::<4>(); // [1, 3, N, N]
        let scores = self.network.forward(input); // [1, N*N]
        let log_probs = log_softmax(scores, 1);

        let mut target = vec![0.0f32; cells];
        target[action] = 1.0;
        let target_tensor =
            Tensor::<B, 1>::from_data(TensorData::from(target.as_slice()), &self.device)
                .reshape([1, cells as i32]);

        // Cross-entropy against the sampled cell: -log p(action | state)
        let loss = -(log_probs * target_tensor).sum();
        let loss_value = loss
            .clone()
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .expect("float tensor converts to f32")[0];

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optimizer
            .step(self.learning_rate, self.network.clone(), grads);
        self.step_count += 1;

        loss_value
    }

    fn step_count(&self) -> usize {
        self.step_count
    }

    fn param_specs(&self) -> Vec<ParamSpec> {
        self.network.param_specs()
    }

    fn save_weights(&self, dir: &Path) -> Result<(), CheckpointError> {
        let recorder = DefaultRecorder::default();
        self.network
            .clone()
            .valid()
            .save_file(dir.join(WEIGHTS_FILE), &recorder)
            .map_err(|e| CheckpointError::ModelSave(e.to_string()))
    }

    fn load_weights(&mut self, dir: &Path) -> Result<MergeReport, CheckpointError> {
        let path = dir.join(WEIGHTS_FILE);
        let recorder = DefaultRecorder::default();
        let record: PolicyNetworkRecord<B> =
            recorder
                .load(path.clone(), &self.device)
                .map_err(|e| CheckpointError::Corrupt {
                    path,
                    reason: e.to_string(),
                })?;

        let report = merge_parameters(&self.network.param_specs(), &record_specs(&record));
        self.network = self.network.clone().merge_record(record, &report);
        // Adam moments are keyed by parameter id; start them over for the new tensors.
        self.optimizer = AdamConfig::new().init();
        Ok(report)
    }
}
