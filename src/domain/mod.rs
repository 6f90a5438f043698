// Domain layer: table rows, result sets and the ports the loader is written against.

pub mod model;
pub mod ports;
