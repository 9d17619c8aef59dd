mod bounds;
mod level;
mod multi;

pub use bounds::{Bounds, Range};
pub use level::GridLevel;
pub use multi::{MultiGrid, MultiGridOptions, PatternAttributes};
