pub mod env;
pub mod error;
pub mod scan;
pub mod types;
pub mod value;

pub use env::*;
pub use error::WandScriptError;
pub use scan::*;
pub use types::*;
pub use value::*;
