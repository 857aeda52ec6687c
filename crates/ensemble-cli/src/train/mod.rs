pub mod input;
pub mod trainer;

pub use input::{load_train_config, EnsembleMember, TrainConfig};
pub use trainer::{run_training, TrainReport};
