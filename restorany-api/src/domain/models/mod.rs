mod ids;
mod review;
mod venue;
mod visit;

pub use ids::*;
pub use review::*;
pub use venue::*;
pub use visit::*;
