/// network construction and mass-action kinetics
pub mod kinetics_examples;
/// equilibrium by gradient and Newton methods
pub mod equilibrium_examples;
