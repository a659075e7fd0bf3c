//! Path synthesis: selectors for one node, patterns for its siblings

mod builder;
mod generalize;
mod walk;

pub use builder::{PathBuilder, full_xpath};
pub use generalize::{relative_path, strip_positions};
pub use walk::{Boundary, IndexedStep, NthChildStep, StepFormat, ancestor_walk};
