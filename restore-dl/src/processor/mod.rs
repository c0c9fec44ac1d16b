//! Data preprocessing building blocks.

pub mod augment;
pub mod random;
pub mod random_crop;
pub mod resize;
pub mod tensor;

pub use augment::*;
pub use random::*;
pub use random_crop::*;
pub use resize::*;
pub use tensor::*;

/// The height and width of every output tensor.
pub const OUTPUT_SIZE: usize = 512;
