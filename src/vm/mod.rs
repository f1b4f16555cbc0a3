mod execute;
mod font;
mod instruction;
mod machine;
mod runner;
mod types;

pub use font::*;
pub use instruction::*;
pub use machine::*;
pub use runner::*;
pub use types::*;
