mod error;
mod types;
mod bases;
mod nn_params;
mod hairpin;
mod dimer;
mod thermo;
mod complexity;
mod primer;
mod screener;

pub use error::*;
pub use types::*;
pub use bases::*;
pub use nn_params::*;
pub use hairpin::*;
pub use dimer::*;
pub use thermo::*;
pub use complexity::*;
pub use primer::*;
pub use screener::*;
