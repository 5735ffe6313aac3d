mod instance;
pub use instance::*;

mod input_value;
pub use input_value::*;

mod animated;
pub use animated::*;

mod event;
pub use event::*;

pub mod input;
