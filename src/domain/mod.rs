// Domain layer: value objects of the query language and the ports the client talks through.

pub mod model;
pub mod ports;
