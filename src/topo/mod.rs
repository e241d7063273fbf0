//! 拓扑描述与构建

mod spec;

pub use spec::{
    BuiltNetwork, LinkSpec, NetworkSpec, NodeSpec, OtnNodeSpec, SCHEMA_VERSION, SignalSpec,
};
