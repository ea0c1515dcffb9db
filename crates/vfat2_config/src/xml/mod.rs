//! XML plumbing: read-side accessors over `roxmltree` and a write-side
//! element tree.

pub mod accessor;
mod element;

pub use element::Element;
