use burn::tensor::{backend::Backend, Distribution, Tensor, TensorData};

/// Multiplies a chain of square matrices in order.
///
/// Adjacent factors are paired each round, so the contraction depth is
/// logarithmic in the chain length instead of linear.
/// `[batch, n, d, d]` -> `[batch, d, d]`
pub fn contract_chain<B: Backend>(matrices: Tensor<B, 4>) -> Tensor<B, 3> {
    let [batch, mut len, d, _] = matrices.dims();
    let mut chain = matrices;

    while len > 1 {
        let pairs = len / 2;
        let tail = if len % 2 == 1 {
            Some(chain.clone().slice([0..batch, len - 1..len, 0..d, 0..d]))
        } else {
            None
        };

        let paired = chain
            .slice([0..batch, 0..pairs * 2, 0..d, 0..d])
            .reshape([batch, pairs, 2, d, d]);
        let lhs = paired
            .clone()
            .slice([0..batch, 0..pairs, 0..1, 0..d, 0..d])
            .reshape([batch, pairs, d, d]);
        let rhs = paired
            .slice([0..batch, 0..pairs, 1..2, 0..d, 0..d])
            .reshape([batch, pairs, d, d]);

        let mut merged = lhs.matmul(rhs);
        if let Some(tail) = tail {
            merged = Tensor::cat(vec![merged, tail], 1);
        }

        chain = merged;
        len = chain.dims()[1];
    }

    chain.reshape([batch, d, d])
}

/// Identity matrix as a tensor.
pub fn identity_matrix<B: Backend>(size: usize, device: &B::Device) -> Tensor<B, 2> {
    let mut values = vec![0.0f32; size * size];
    for i in 0..size {
        values[i * size + i] = 1.0;
    }
    Tensor::from_floats(TensorData::new(values, [size, size]), device)
}

/// Site tensors close to the identity, so long chain products neither vanish
/// nor blow up at initialization. `[sites, phys, bond, bond]`
pub fn near_identity_sites<B: Backend>(
    sites: usize,
    phys: usize,
    bond: usize,
    device: &B::Device,
) -> Tensor<B, 4> {
    let noise = Tensor::random(
        [sites, phys, bond, bond],
        Distribution::Normal(0.0, 0.1),
        device,
    );
    identity_matrix::<B>(bond, device).unsqueeze::<4>() + noise
}
