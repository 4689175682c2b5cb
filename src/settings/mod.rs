mod cli;
pub use clap::Parser;
pub use cli::*;

mod duration;
pub use duration::*;

mod settings;
pub use settings::*;
