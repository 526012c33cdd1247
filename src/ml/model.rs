use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig},
        loss::{MseLoss, Reduction},
        Dropout, DropoutConfig, Linear, LinearConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

// Convolutional steering regressor: one 3×H×W YCbCr frame in, one
// steering value in [-1, 1] out. Five valid (unpadded) convolutions
// collapse the frame into 64 feature maps, a fully connected head
// regresses the value, tanh keeps it inside the calibrated range.
//
// Feature map sizes for the default 66×200 input:
//   conv 5×5 /2   3 → 24    31×98
//   conv 5×5 /2  24 → 36    14×47
//   conv 5×5 /2  36 → 48     5×22
//   conv 3×3     48 → 64     3×20
//   conv 3×3     64 → 64     1×18
//   flatten 1152 → 100 → 50 → 10 → 1
//
// Reference: Bojarski et al. (2016) End to End Learning for
//            Self-Driving Cars

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SteeringNetConfig {
    pub input_height: usize,
    pub input_width: usize,
    pub dropout: f64,
}

/// Kernel size and stride of each convolution stage, in order.
const CONV_STAGES: [(usize, usize); 5] = [(5, 2), (5, 2), (5, 2), (3, 1), (3, 1)];

/// Output size of a valid (unpadded) convolution along one axis.
fn conv_out(size: usize, kernel: usize, stride: usize) -> usize {
    (size - kernel) / stride + 1
}

impl SteeringNetConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SteeringNet<B> {
        let conv1 = Conv2dConfig::new([3, 24], [5, 5]).with_stride([2, 2]).init(device);
        let conv2 = Conv2dConfig::new([24, 36], [5, 5]).with_stride([2, 2]).init(device);
        let conv3 = Conv2dConfig::new([36, 48], [5, 5]).with_stride([2, 2]).init(device);
        let conv4 = Conv2dConfig::new([48, 64], [3, 3]).init(device);
        let conv5 = Conv2dConfig::new([64, 64], [3, 3]).init(device);

        // Track the frame size through the convolution stack to size
        // the first linear layer.
        let (mut height, mut width) = (self.input_height, self.input_width);
        for (kernel, stride) in CONV_STAGES {
            height = conv_out(height, kernel, stride);
            width = conv_out(width, kernel, stride);
        }
        let flattened = 64 * height * width;

        let fc1 = LinearConfig::new(flattened, 100).init(device);
        let fc2 = LinearConfig::new(100, 50).init(device);
        let fc3 = LinearConfig::new(50, 10).init(device);
        let head = LinearConfig::new(10, 1).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();

        SteeringNet {
            conv1,
            conv2,
            conv3,
            conv4,
            conv5,
            fc1,
            fc2,
            fc3,
            head,
            dropout,
        }
    }
}

#[derive(Module, Debug)]
pub struct SteeringNet<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
    pub conv4: Conv2d<B>,
    pub conv5: Conv2d<B>,
    pub fc1: Linear<B>,
    pub fc2: Linear<B>,
    pub fc3: Linear<B>,
    pub head: Linear<B>,
    pub dropout: Dropout,
}

impl<B: Backend> SteeringNet<B> {
    /// images: [batch, 3, H, W] → steering estimates: [batch, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        use burn::tensor::activation::{relu, tanh};

        let x = relu(self.conv1.forward(images));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x));
        let x = relu(self.conv4.forward(x));
        let x = relu(self.conv5.forward(x));

        let x = x.flatten::<2>(1, 3); // [batch, 64·h·w]

        let x = self.dropout.forward(relu(self.fc1.forward(x)));
        let x = self.dropout.forward(relu(self.fc2.forward(x)));
        let x = relu(self.fc3.forward(x));

        tanh(self.head.forward(x))
    }

    /// Forward pass plus MSE loss against the logged steering values.
    pub fn forward_loss(
        &self,
        images: Tensor<B, 4>,
        steering: Tensor<B, 2>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>)
    where
        B: AutodiffBackend,
    {
        let output = self.forward(images);
        let loss = MseLoss::new().forward(output.clone(), steering, Reduction::Mean);
        (loss, output)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conv_stack_collapses_the_default_input() {
        let (mut height, mut width) = (66usize, 200usize);
        for (kernel, stride) in CONV_STAGES {
            height = conv_out(height, kernel, stride);
            width = conv_out(width, kernel, stride);
        }
        assert_eq!((height, width), (1, 18));
        assert_eq!(64 * height * width, 1152);
    }

    #[test]
    fn test_conv_out_floors_partial_strides() {
        // (200 - 5) / 2 + 1 = 98 (integer division drops the half step)
        assert_eq!(conv_out(200, 5, 2), 98);
        assert_eq!(conv_out(66, 5, 2), 31);
    }
}
