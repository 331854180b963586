pub mod demo_command;
pub mod epoch_command;
pub mod epoch_file;
pub mod keygen_command;

pub use self::{demo_command::*, epoch_command::*, epoch_file::*, keygen_command::*};
