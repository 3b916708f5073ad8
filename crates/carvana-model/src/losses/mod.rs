pub mod bce;

pub use bce::{BceLoss, BceLossConfig};
