use crate::error::{Error, TopologyError};
use crate::net::{LinkKind, NetNodeKind, Network, NodeId, RouteRole};
use crate::otn::{AggregationRule, OtnLevel};

fn three_nodes() -> (Network, NodeId, NodeId, NodeId) {
    let mut net = Network::default();
    let a = net.add_node("A", NetNodeKind::Terminal);
    let b = net.add_node("B", NetNodeKind::Roadm);
    let c = net.add_node("C", NetNodeKind::LineAmplifier);
    (net, a, b, c)
}

fn odu2_rules() -> Vec<AggregationRule> {
    vec![AggregationRule::new(OtnLevel::Odu0, OtnLevel::Odu2).expect("rule")]
}

#[test]
fn undirected_link_inserts_mutual_reverse_pair() {
    let (mut net, a, b, _) = three_nodes();
    let fwd = net
        .add_link(a, b, 12.5, LinkKind::Undirected)
        .expect("link");

    let rev = net.find_link(b, a).expect("reverse inserted");
    assert_eq!(net.find_link(a, b), Some(fwd));
    assert_eq!(net.link(fwd).and_then(|l| l.reverse()), Some(rev));
    assert_eq!(net.link(rev).and_then(|l| l.reverse()), Some(fwd));
    assert_eq!(net.link(rev).map(|l| l.length), Some(12.5));
    assert_eq!(net.links().len(), 2);
    assert_eq!(net.out_links(a), &[fwd]);
    assert_eq!(net.out_links(b), &[rev]);
}

#[test]
fn directed_link_has_no_reverse() {
    let (mut net, a, b, _) = three_nodes();
    let fwd = net.add_link(a, b, 1.0, LinkKind::Directed).expect("link");

    assert_eq!(net.link(fwd).and_then(|l| l.reverse()), None);
    assert_eq!(net.find_link(b, a), None);
    assert!(net.out_links(b).is_empty());

    // 另一方向仍可单独添加
    let back = net.add_link(b, a, 3.0, LinkKind::Directed).expect("back");
    assert_ne!(fwd, back);
    assert_eq!(net.link(back).and_then(|l| l.reverse()), None);
}

#[test]
fn add_link_rejects_bad_input() {
    let (mut net, a, b, c) = three_nodes();
    let fwd = net.add_link(a, b, 1.0, LinkKind::Undirected).expect("link");

    assert_eq!(
        net.add_link(a, b, 1.0, LinkKind::Directed),
        Err(TopologyError::DuplicateLink {
            from: a,
            to: b,
            existing: fwd
        })
    );
    // 无向链路的反方向已被占用
    net.add_link(c, a, 1.0, LinkKind::Directed).expect("c -> a");
    assert!(matches!(
        net.add_link(a, c, 1.0, LinkKind::Undirected),
        Err(TopologyError::DuplicateLink { .. })
    ));

    assert_eq!(
        net.add_link(a, a, 1.0, LinkKind::Undirected),
        Err(TopologyError::SelfLoop(a))
    );
    assert_eq!(
        net.add_link(b, c, 0.0, LinkKind::Undirected),
        Err(TopologyError::InvalidLength(0.0))
    );
    assert!(matches!(
        net.add_link(b, c, f64::NAN, LinkKind::Undirected),
        Err(TopologyError::InvalidLength(_))
    ));
    assert_eq!(
        net.add_link(b, NodeId(42), 1.0, LinkKind::Undirected),
        Err(TopologyError::UnknownNode(NodeId(42)))
    );

    // 失败不留下半条链路
    assert_eq!(net.links().len(), 3);
    assert_eq!(net.find_link(a, c), None);
}

#[test]
fn nodes_are_looked_up_by_name() {
    let (net, a, b, c) = three_nodes();
    assert_eq!(net.node_count(), 3);
    assert_eq!(net.node_by_name("B"), Some(b));
    assert_eq!(net.node_by_name("Z"), None);
    assert_eq!(net.node(a).map(|n| n.kind()), Some(NetNodeKind::Terminal));
    assert_eq!(
        net.node(c).map(|n| n.kind()),
        Some(NetNodeKind::LineAmplifier)
    );
    assert!(net.nodes().iter().all(|n| n.role() == RouteRole::Undefined));
}

#[test]
fn one_otn_node_per_net_node() {
    let (mut net, a, b, _) = three_nodes();
    let x = net.add_otn_node(a, odu2_rules(), 1).expect("otn at A");
    let y = net.add_otn_node(b, odu2_rules(), 1).expect("otn at B");

    assert_ne!(x, y);
    assert_eq!(net.otn_node_at(a), Some(x));
    assert_eq!(net.otn_node(x).and_then(|n| n.net_node()), Some(a));
    assert_eq!(net.otn_nodes().len(), 2);

    assert!(matches!(
        net.add_otn_node(a, odu2_rules(), 1),
        Err(Error::Topology(TopologyError::DuplicateOtnNode(n))) if n == a
    ));
    assert!(matches!(
        net.add_otn_node(NodeId(9), odu2_rules(), 1),
        Err(Error::Topology(TopologyError::UnknownNode(_)))
    ));
    assert_eq!(net.otn_nodes().len(), 2);
}

#[test]
fn invalid_rules_do_not_register_an_otn_node() {
    let (mut net, a, _, _) = three_nodes();
    assert!(matches!(
        net.add_otn_node(a, Vec::new(), 1),
        Err(Error::Otn(_))
    ));
    assert_eq!(net.otn_node_at(a), None);
    net.add_otn_node(a, odu2_rules(), 1).expect("retry");
}

#[test]
fn route_roles_are_scoped_to_the_closure() {
    let (mut net, a, b, c) = three_nodes();
    let seen = net
        .with_route_roles(&[(a, RouteRole::InRoute), (b, RouteRole::OutRoute)], |net| {
            (net.route_role(a), net.route_role(b), net.route_role(c))
        })
        .expect("marks");

    assert_eq!(
        seen,
        (
            Some(RouteRole::InRoute),
            Some(RouteRole::OutRoute),
            Some(RouteRole::Undefined)
        )
    );
    for id in [a, b, c] {
        assert_eq!(net.route_role(id), Some(RouteRole::Undefined));
    }
}

#[test]
fn route_role_marks_are_validated_up_front() {
    let (mut net, a, _, _) = three_nodes();
    let res = net.with_route_roles(&[(a, RouteRole::InRoute), (NodeId(7), RouteRole::OutRoute)], |_| ());
    assert_eq!(res, Err(TopologyError::UnknownNode(NodeId(7))));
    assert_eq!(net.route_role(a), Some(RouteRole::Undefined));

    net.set_route_role(a, RouteRole::OutRoute).expect("set");
    assert_eq!(net.route_role(a), Some(RouteRole::OutRoute));
    net.reset_route_roles();
    assert_eq!(net.route_role(a), Some(RouteRole::Undefined));
}
