pub mod capture_graph;
pub mod device_registry;
pub mod observer;
pub mod permission;
