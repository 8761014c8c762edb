// Chain data model. The canonical rendering used for block hashes lives in
// its own module so it can be checked independently of the model.

pub mod canonical;
pub mod chain;

pub use chain::*;
