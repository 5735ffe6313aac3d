mod provider;
pub use provider::*;

mod builtin;
pub use builtin::*;
