/// Validated clause lists handed to the solver
pub mod cnf;
/// DIMACS CNF reader
pub mod parser;
