pub mod export;
pub mod lifecycle;
pub mod results;
pub mod status;
pub mod voting;
