mod process;
mod scratch;

pub use process::ProcessTransformer;
pub use scratch::{TempScratchSpace, TempScratchSpaceProvider};
