// Domain layer: wire models and ports (interfaces). No HTTP code here.

pub mod model;
pub mod ports;
