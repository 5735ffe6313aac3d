//! Form controls for gpui: a searchable single or multiple select, and
//! animated expand/collapse panels, built on a small set of headless state
//! machines that can be driven without a window.

pub mod primitives;

pub mod extensions;

pub mod views;

pub mod components;

pub mod theme;

pub mod locale;

mod error;
pub use error::*;

mod utils;
pub use utils::{ElementIdExt, PixelsExt};

mod assets;
pub use assets::*;

mod init;
pub use init::*;
