pub mod dataflows;
pub mod systems;
