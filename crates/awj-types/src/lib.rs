pub mod errors;
pub mod parameters;
pub mod outcome;

pub use errors::*;
pub use parameters::*;
pub use outcome::*;
