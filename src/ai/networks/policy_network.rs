use burn::module::Param;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Linear, LinearConfig, PaddingConfig2d, Relu};
use burn::prelude::*;

use crate::ai::state_encoding::INPUT_CHANNELS;
use crate::checkpoint::{MergeReport, ParamSpec};

/// Channels produced by the policy convolution before the dense head.
const POLICY_CHANNELS: usize = 2;

/// Policy network for an N x N gobang board.
///
/// The convolutional trunk is independent of N; only the dense head is
/// sized by the board, so artifacts from another board size merge the
/// trunk and skip the head.
/// ```text
/// Input:       [batch, 3, N, N]
/// Conv1:       3 -> C channels, 3x3, same padding
/// ReLU
/// Conv2:       C -> C channels, 3x3, same padding
/// ReLU
/// PolicyConv:  C -> 2 channels, 1x1
/// ReLU
/// Flatten:     2*N*N
/// PolicyHead:  2*N*N -> N*N  (one score per cell)
/// ```
#[derive(Module, Debug)]
pub struct PolicyNetwork<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    policy_conv: Conv2d<B>,
    policy_head: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct PolicyNetworkConfig {
    pub board_size: usize,
    #[config(default = 32)]
    pub channels: usize,
}

impl PolicyNetworkConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> PolicyNetwork<B> {
        let cells = self.board_size * self.board_size;
        PolicyNetwork {
            conv1: Conv2dConfig::new([INPUT_CHANNELS, self.channels], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            conv2: Conv2dConfig::new([self.channels, self.channels], [3, 3])
                .with_padding(PaddingConfig2d::Same)
                .init(device),
            policy_conv: Conv2dConfig::new([self.channels, POLICY_CHANNELS], [1, 1]).init(device),
            policy_head: LinearConfig::new(POLICY_CHANNELS * cells, cells).init(device),
            relu: Relu::new(),
        }
    }
}

impl<B: Backend> PolicyNetwork<B> {
    /// Forward pass: input [batch, 3, N, N] -> scores [batch, N*N].
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, _, rows, cols] = input.dims();

        let x = self.relu.forward(self.conv1.forward(input));
        let x = self.relu.forward(self.conv2.forward(x));
        let x = self.relu.forward(self.policy_conv.forward(x));
        let x = x.reshape([batch_size as i32, (POLICY_CHANNELS * rows * cols) as i32]);
        self.policy_head.forward(x)
    }

    /// Name and dimensions of every parameter, in a fixed order.
    pub fn param_specs(&self) -> Vec<ParamSpec> {
        let mut out = Vec::with_capacity(8);
        layer_specs(&mut out, "conv1", &self.conv1.weight, self.conv1.bias.as_ref());
        layer_specs(&mut out, "conv2", &self.conv2.weight, self.conv2.bias.as_ref());
        layer_specs(
            &mut out,
            "policy_conv",
            &self.policy_conv.weight,
            self.policy_conv.bias.as_ref(),
        );
        layer_specs(
            &mut out,
            "policy_head",
            &self.policy_head.weight,
            self.policy_head.bias.as_ref(),
        );
        out
    }

    /// Install the tensors of `record` that `report` accepts. Everything
    /// else keeps its current value.
    pub fn merge_record(mut self, record: PolicyNetworkRecord<B>, report: &MergeReport) -> Self {
        merge_layer(
            report,
            "conv1",
            (&mut self.conv1.weight, &mut self.conv1.bias),
            (record.conv1.weight, record.conv1.bias),
        );
        merge_layer(
            report,
            "conv2",
            (&mut self.conv2.weight, &mut self.conv2.bias),
            (record.conv2.weight, record.conv2.bias),
        );
        merge_layer(
            report,
            "policy_conv",
            (&mut self.policy_conv.weight, &mut self.policy_conv.bias),
            (record.policy_conv.weight, record.policy_conv.bias),
        );
        merge_layer(
            report,
            "policy_head",
            (&mut self.policy_head.weight, &mut self.policy_head.bias),
            (record.policy_head.weight, record.policy_head.bias),
        );
        self
    }
}

/// Parameter names and dimensions held by a loaded record, in the same
/// order as [`PolicyNetwork::param_specs`].
pub fn record_specs<B: Backend>(record: &PolicyNetworkRecord<B>) -> Vec<ParamSpec> {
    let mut out = Vec::with_capacity(8);
    layer_specs(&mut out, "conv1", &record.conv1.weight, record.conv1.bias.as_ref());
    layer_specs(&mut out, "conv2", &record.conv2.weight, record.conv2.bias.as_ref());
    layer_specs(
        &mut out,
        "policy_conv",
        &record.policy_conv.weight,
        record.policy_conv.bias.as_ref(),
    );
    layer_specs(
        &mut out,
        "policy_head",
        &record.policy_head.weight,
        record.policy_head.bias.as_ref(),
    );
    out
}

fn layer_specs<B: Backend, const D: usize>(
    out: &mut Vec<ParamSpec>,
    prefix: &str,
    weight: &Param<Tensor<B, D>>,
    bias: Option<&Param<Tensor<B, 1>>>,
) {
    out.push(ParamSpec::new(format!("{prefix}.weight"), &weight.dims()));
    if let Some(bias) = bias {
        out.push(ParamSpec::new(format!("{prefix}.bias"), &bias.dims()));
    }
}

type LayerParams<'a, B, const D: usize> = (
    &'a mut Param<Tensor<B, D>>,
    &'a mut Option<Param<Tensor<B, 1>>>,
);

fn merge_layer<B: Backend, const D: usize>(
    report: &MergeReport,
    prefix: &str,
    (weight, bias): LayerParams<'_, B, D>,
    (loaded_weight, loaded_bias): (Param<Tensor<B, D>>, Option<Param<Tensor<B, 1>>>),
) {
    if report.accepts(&format!("{prefix}.weight")) {
        *weight = loaded_weight;
    }
    if let (Some(bias), Some(loaded)) = (bias.as_mut(), loaded_bias) {
        if report.accepts(&format!("{prefix}.bias")) {
            *bias = loaded;
        }
    }
}
