use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::{Cell, GameState};

/// Number of planes produced by [`encode_state`].
pub const INPUT_CHANNELS: usize = 3;

/// Encode a game state as a tensor of shape [3, N, N] (player-relative).
///
/// Channel 0: Current player's stones (1.0 where placed)
/// Channel 1: Opponent's stones (1.0 where placed)
/// Channel 2: Empty cells (1.0 where a move is legal)
pub fn encode_state<B: Backend>(state: &GameState, device: &B::Device) -> Tensor<B, 3> {
    let n = state.board_size() as i32;
    let data = encode_state_flat(state);
    Tensor::<B, 1>::from_data(TensorData::from(data.as_slice()), device)
        .reshape([INPUT_CHANNELS as i32, n, n])
}

/// Produce the flat [3 * N * N] f32 vector for a single state encoding.
pub fn encode_state_flat(state: &GameState) -> Vec<f32> {
    let cells = state.board().cells();
    let plane = cells.len();
    let current_cell = state.current_player().to_cell();

    let mut data = vec![0.0f32; INPUT_CHANNELS * plane];
    for (idx, &cell) in cells.iter().enumerate() {
        let channel = if cell == Cell::Empty {
            2
        } else if cell == current_cell {
            0
        } else {
            1
        };
        data[channel * plane + idx] = 1.0;
    }
    data
}
