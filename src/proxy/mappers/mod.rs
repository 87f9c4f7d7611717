// Mapper module
// Responsible for Artemis envelope unwrapping

pub mod artemis;

pub use artemis::*;
