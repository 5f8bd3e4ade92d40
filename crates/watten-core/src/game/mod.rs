pub mod env;
pub mod observation;
pub mod snapshot;
