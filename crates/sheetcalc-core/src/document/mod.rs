mod io;
mod ops;
mod state;

pub use ops::FormatChange;
pub use state::{Document, FormatDefaults, ResolvedStyle};
