// Observer system: writes run through ordered rings of observers

pub mod context;
pub mod error;
pub mod implementations;
pub mod pipeline;
pub mod traits;

pub use context::ObserverContext;
pub use error::{ObserverError, ObserverResult, ObserverWarning};
pub use pipeline::ObserverPipeline;
pub use traits::{Observer, ObserverRing};
