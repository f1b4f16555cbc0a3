pub mod debugger;
pub mod vm;

mod nibble;

pub use nibble::u4;
pub use vm::*;
