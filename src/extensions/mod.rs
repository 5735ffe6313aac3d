/// Support for painting popups after their siblings.
mod deferrable;
pub use deferrable::*;
