mod icon;
pub use icon::*;

mod expand;
pub use expand::*;

pub mod select;
pub use select::{Select, SelectOption, SelectValue};
