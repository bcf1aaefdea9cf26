/// batch runner of task files and examples
pub mod cli_main;
