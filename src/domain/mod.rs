// Domain layer: slot/group model, preview lifetimes and ports (interfaces) to the outside world.

pub mod model;
pub mod ports;
pub mod preview;
