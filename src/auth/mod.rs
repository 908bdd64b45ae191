pub mod handlers;
pub mod model;
pub mod verifier;

pub use handlers::*;
pub use model::*;
pub use verifier::*;

#[cfg(test)]
mod tests;
