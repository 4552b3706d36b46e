pub mod grid;
pub mod limits;
pub mod model;
pub mod notify;
pub mod observability;
pub mod replay;
pub mod session;
