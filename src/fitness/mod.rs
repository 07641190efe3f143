//! Model-driven analysis of the fitness landscape.

pub mod alphabet;
pub mod anneal;
pub mod encoding;
pub mod ensemble;
pub mod library;
pub mod model;
pub mod trajectory;
pub mod variants;

pub use encoding::{EncodedBatch, OneHotEncoder};
pub use ensemble::ModelEnsemble;
pub use model::{FitnessModel, LinearBackend, LinearModel, ModelBackend, ModelSession};
pub use variants::{CombinatorialLibrary, Mutation};
