pub mod backoff;
pub mod gate;
pub mod ids;
pub mod model;
pub mod reasoner;
pub mod risk;
pub mod time;

pub use backoff::*;
pub use gate::*;
pub use ids::*;
pub use model::*;
pub use reasoner::*;
pub use risk::*;
pub use time::*;
