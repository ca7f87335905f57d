//! Command implementations

mod interpret;
mod prompts;
mod serve;

pub use interpret::cmd_interpret;
pub use prompts::{cmd_prompts_list, cmd_prompts_path, cmd_prompts_show};
pub use serve::cmd_serve;
