/// reading and writing JSON task files
pub mod load_from_file;
/// terminal logger
pub mod logger;
/// prettytable output of networks, trajectories and equilibria
pub mod output;
