pub mod dataflows;
pub mod diagram;
pub mod export;
pub mod health;
pub mod statistics;
pub mod systems;
