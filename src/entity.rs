mod candidate;
mod diagnostic;
mod error;
mod plan;
mod record;
mod violation;

pub use candidate::*;
pub use diagnostic::*;
pub use error::*;
pub use plan::*;
pub use record::*;
pub use violation::*;
