pub mod angle;
pub mod error;
pub mod geo;
pub mod validation;

pub use angle::*;
pub use error::*;
pub use geo::*;
pub use validation::*;
