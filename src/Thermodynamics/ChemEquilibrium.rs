/// residual, Jacobian and line search in the space of reaction extents, shared by all methods
pub mod EquilibriumEquations;
///module for equilibrium concentrations of a network of reversible reactions
/// # Examples
/// ```
/// use KiReact::Kinetics::User_reactions::{Reaction, ReactionSpecies};
/// use KiReact::Kinetics::stoichiometry_analyzer::Network;
/// use KiReact::Thermodynamics::ChemEquilibrium::EquilibriumSolver::{
///     EquilibriumMethod, EquilibriumSolver, SolverParams,
/// };
/// use KiReact::Thermodynamics::User_substances::Compound;
/// use approx::assert_relative_eq;
/// // A <=> B with K = 3: equilibrium is [0.25, 0.75]
/// let a = ReactionSpecies::reactant(Compound::new("A").unwrap()).concentration(1.0);
/// let b = ReactionSpecies::product(Compound::new("B").unwrap());
/// let reaction = Reaction::new(vec![a], vec![b]).with_equilibrium_constant(3.0);
/// let network = Network::build(vec![reaction], 298.15).unwrap();
/// let method: EquilibriumMethod = "newton".parse().unwrap();
/// let params = SolverParams::default_for(&method);
/// let mut solver = EquilibriumSolver::new(method);
/// solver.fit(&network);
/// let c = solver.solve(&params).unwrap();
/// assert_relative_eq!(c[0], 0.25, epsilon = 1e-6);
/// assert_relative_eq!(c[1], 0.75, epsilon = 1e-6);
/// ```
pub mod EquilibriumSolver;
mod EquilibriumSolver_tests;
