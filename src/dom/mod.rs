pub mod tree;
pub mod virtual_dom;

pub use tree::*;
pub use virtual_dom::*;
