use burn::{
    prelude::*,
    tensor::{backend::Backend, ElementConversion, Tensor},
};

/// Binary cross-entropy on probabilities, averaged over every element.
#[derive(Module, Debug)]
pub struct BceLoss<B: Backend> {
    log_clamp_min: f64,
    _phantom: std::marker::PhantomData<B>,
}

#[derive(Config, Debug)]
pub struct BceLossConfig {
    /// Lower bound of the log terms, keeping saturated predictions finite.
    #[config(default = "-100.0")]
    pub log_clamp_min: f64,
}

impl BceLossConfig {
    pub const fn init<B: Backend>(&self) -> BceLoss<B> {
        BceLoss {
            log_clamp_min: self.log_clamp_min,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> BceLoss<B> {
    /// `-(t * log(p) + (1 - t) * log(1 - p))`, averaged.
    ///
    /// # Shapes
    ///   - input: `[...]`, probabilities in `[0, 1]`
    ///   - target: same shape as `input`, labels in `[0, 1]`
    ///   - output: `[1]`
    pub fn forward<const D: usize>(
        &self,
        input: Tensor<B, D>,
        target: Tensor<B, D>,
    ) -> Tensor<B, 1> {
        assert_eq!(
            input.shape(),
            target.shape(),
            "Input and target must have the same shape. Got input: {:?}, target: {:?}",
            input.shape(),
            target.shape()
        );

        let clamp_min = self.log_clamp_min.elem::<B::FloatElem>();
        let log_input = input.clone().log().clamp_min(clamp_min);
        let log_one_minus_input = input.neg().add_scalar(1.0).log().clamp_min(clamp_min);

        let one_minus_target = target.clone().neg().add_scalar(1.0);
        let loss = (target * log_input + one_minus_target * log_one_minus_input).neg();

        loss.mean()
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::TensorData;

    use super::*;
    use crate::tests::TestBackend;

    fn tensor(values: Vec<f32>) -> Tensor<TestBackend, 2> {
        let len = values.len();
        Tensor::from_data(TensorData::new(values, [1, len]), &Default::default())
    }

    #[test]
    fn matches_hand_computed_value() {
        let loss = BceLossConfig::new().init::<TestBackend>();
        let value = loss
            .forward(tensor(vec![0.8, 0.3]), tensor(vec![1.0, 0.0]))
            .into_scalar()
            .elem::<f64>();

        let expected = -(0.8_f64.ln() + 0.7_f64.ln()) / 2.0;
        assert!((value - expected).abs() < 1e-5);
    }

    #[test]
    fn saturated_wrong_prediction_is_clamped() {
        let loss = BceLossConfig::new().init::<TestBackend>();
        let value = loss
            .forward(tensor(vec![0.0]), tensor(vec![1.0]))
            .into_scalar()
            .elem::<f64>();

        assert!((value - 100.0).abs() < 1e-3);
    }

    #[test]
    fn perfect_prediction_has_zero_loss() {
        let loss = BceLossConfig::new().init::<TestBackend>();
        let value = loss
            .forward(tensor(vec![1.0, 0.0, 1.0]), tensor(vec![1.0, 0.0, 1.0]))
            .into_scalar()
            .elem::<f64>();

        assert!(value.abs() < 1e-6);
    }
}
