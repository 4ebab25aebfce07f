pub mod fixture;
pub mod macros;
pub mod team;
pub mod time;
pub mod tournament;

pub use fixture::*;
pub use team::*;
pub use time::*;
pub use tournament::*;
