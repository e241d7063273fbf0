pub mod error;
pub mod net;
pub mod otn;
pub mod routing;
pub mod topo;

#[cfg(test)]
mod test;
