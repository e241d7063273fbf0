mod aggregation;
mod network_topology;
