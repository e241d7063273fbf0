//! 光层选路
//!
//! 读取 JSON 拓扑描述，计算 K 条最短路径或经过必经节点的路径。

use clap::Parser;
use otn_rs::net::{NodeId, RouteRole};
use otn_rs::routing::{KspOptions, Path};
use otn_rs::topo::{BuiltNetwork, NetworkSpec};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "otn_route", about = "光层选路：K 最短路径 / 必经节点路径")]
struct Args {
    /// 拓扑描述文件（JSON）
    #[arg(long)]
    topology: std::path::PathBuf,
    #[arg(long)]
    from: String,
    #[arg(long)]
    to: String,
    #[arg(short, long, default_value_t = 3)]
    k: usize,
    /// 必经节点（可重复）；指定后改为计算必经节点路径
    #[arg(long = "must-pass")]
    must_pass: Vec<String>,
    /// 禁止经过的节点（可重复）
    #[arg(long)]
    avoid: Vec<String>,
    /// 同一轮并行的偏离点搜索上限
    #[arg(long, default_value_t = 8)]
    parallelism: usize,
    /// 以 JSON 输出
    #[arg(long)]
    json: bool,
    /// 关闭日志输出
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Serialize)]
struct PathOut {
    cost: f64,
    nodes: Vec<String>,
}

fn describe(built: &BuiltNetwork, path: &Path) -> Result<PathOut, otn_rs::error::RoutingError> {
    let nodes = path
        .nodes(&built.net)?
        .into_iter()
        .map(|id| node_name(built, id))
        .collect();
    Ok(PathOut {
        cost: path.cost,
        nodes,
    })
}

fn node_name(built: &BuiltNetwork, id: NodeId) -> String {
    built
        .net
        .node(id)
        .map(|n| n.name().to_string())
        .unwrap_or_else(|| format!("{}", id.0))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化 tracing
    tracing_subscriber::fmt()
        .with_env_filter(if args.quiet {
            tracing_subscriber::EnvFilter::new("off")
        } else {
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
        })
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mut built = NetworkSpec::from_path(&args.topology)?.build()?;
    let source = built.node(&args.from)?;
    let target = built.node(&args.to)?;

    let mut marks = Vec::new();
    for name in &args.must_pass {
        marks.push((built.node(name)?, RouteRole::InRoute));
    }
    for name in &args.avoid {
        marks.push((built.node(name)?, RouteRole::OutRoute));
    }

    let opts = KspOptions {
        max_parallel_spurs: args.parallelism,
    };
    let must_pass = !args.must_pass.is_empty();
    let k = args.k;
    let paths = built.net.with_route_roles(&marks, |net| {
        if must_pass {
            net.find_must_pass_path(source, target).map(|p| vec![p])
        } else {
            net.find_k_shortest_paths_with(source, target, k, &opts)
        }
    })??;

    let out = paths
        .iter()
        .map(|p| describe(&built, p))
        .collect::<Result<Vec<_>, _>>()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (i, p) in out.iter().enumerate() {
            println!("path {} cost={:.3} nodes={}", i + 1, p.cost, p.nodes.join("->"));
        }
    }
    Ok(())
}
