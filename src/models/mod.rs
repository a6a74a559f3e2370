//! Fitted artifacts and network inference

pub mod inference;
pub mod loader;
pub mod network;

pub use inference::Predictor;
pub use loader::ArtifactStore;
pub use network::{Activation, DenseLayer, NetworkArtifact};
