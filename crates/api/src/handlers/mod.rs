pub mod maintenance;
pub mod predict;
