mod build;
mod builders;

pub use build::{BuildOptions, cmd_build};
pub use builders::cmd_builders;
