pub mod covers;
pub mod gallery;
pub mod history;
pub mod model;
pub mod recommendations;

pub use covers::{Cover, CoverResolver, CoverSource, NO_COVER};
pub use model::{BruteForceIndex, RankedCandidates, RetrievalModel};
