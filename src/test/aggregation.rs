use crate::error::OtnError;
use crate::net::{OtnNodeId, SignalId};
use crate::otn::{
    AggregationRule, AggregationStrategy, OtnLevel, OtnNode, OtnSignal, Signal, SlotTable,
};

use OtnLevel::{Odu0, Odu1, Odu2, Odu3, Odu4};

fn rule(client: OtnLevel, container: OtnLevel) -> AggregationRule {
    AggregationRule::new(client, container).expect("valid rule")
}

fn baikal(capacity: usize) -> OtnNode {
    OtnNode::new(OtnNodeId(0), [rule(Odu0, Odu2), rule(Odu1, Odu2)], capacity).expect("baikal")
}

fn baikal_to_odu4() -> OtnNode {
    OtnNode::new(
        OtnNodeId(0),
        [rule(Odu0, Odu2), rule(Odu1, Odu2), rule(Odu2, Odu4)],
        1,
    )
    .expect("baikal + ODU4")
}

fn otn(level: OtnLevel) -> OtnSignal {
    Signal::new(OtnNodeId(0), OtnNodeId(1), level.expected_bandwidth_gbps())
        .to_otn()
        .expect("wrap")
}

fn gbe() -> OtnSignal {
    Signal::new(OtnNodeId(0), OtnNodeId(1), 1.0)
        .to_otn()
        .expect("wrap GbE")
}

/// 两个 ODU2 容器：较早的 A 剩 2 个时隙，较新的 B 剩 7 个时隙
fn two_containers() -> (OtnNode, SignalId, SignalId) {
    let mut node = baikal(2);
    let mut in_a = Vec::new();
    let mut a = None;
    for _ in 0..8 {
        let c = gbe();
        in_a.push(c.id);
        a = Some(node.try_aggregate(c, AggregationStrategy::NextFit).expect("fill A"));
    }
    let b = node
        .try_aggregate(gbe(), AggregationStrategy::NextFit)
        .expect("open B");
    let a = a.expect("A");
    assert_ne!(a, b);
    node.try_de_aggregate(in_a[0]).expect("free A");
    node.try_de_aggregate(in_a[1]).expect("free A");
    (node, a, b)
}

#[test]
fn baikal_fills_one_odu2_then_rejects_the_ninth_client() {
    let mut node = baikal(1);
    let mut clients = Vec::new();
    let mut container = None;

    for i in 0..8 {
        let c = gbe();
        clients.push(c.id);
        let got = node
            .try_aggregate(c, AggregationStrategy::NextFit)
            .expect("fits");
        if i == 0 {
            container = Some(got);
        } else {
            assert_eq!(container, Some(got));
        }
    }

    assert_eq!(node.signals().len(), 1);
    assert_eq!(node.signals()[0].level, Odu2);
    assert_eq!(node.signals()[0].children().len(), 8);
    let before = node.signals().to_vec();
    let count = node.signal_count();

    let err = node
        .try_aggregate(gbe(), AggregationStrategy::NextFit)
        .unwrap_err();
    assert!(matches!(err, OtnError::CapacityExceeded { level: Odu2, .. }));
    assert_eq!(node.signals(), before.as_slice());
    assert_eq!(node.signal_count(), count);

    for id in clients.iter().rev() {
        node.try_de_aggregate(*id).expect("de-aggregate");
    }
    assert!(node.signals().is_empty());
    assert_eq!(node.signal_count(), 0);
}

#[test]
fn de_aggregation_order_does_not_matter() {
    let mut node = baikal(1);
    let ids: Vec<SignalId> = (0..4)
        .map(|_| {
            let c = gbe();
            let id = c.id;
            node.try_aggregate(c, AggregationStrategy::FirstFit).expect("fits");
            id
        })
        .collect();

    for id in [ids[2], ids[0], ids[3], ids[1]] {
        node.try_de_aggregate(id).expect("de-aggregate");
    }
    assert!(node.signals().is_empty());
}

#[test]
fn mixed_clients_share_a_container_by_slot_count() {
    let mut node = baikal(1);
    // 3 x ODU1 (6 slots) + 2 x ODU0 (2 slots) = 8
    for level in [Odu1, Odu1, Odu1, Odu0, Odu0] {
        node.try_aggregate(otn(level), AggregationStrategy::NextFit)
            .expect("fits");
    }
    let top = &node.signals()[0];
    assert_eq!(top.used_slots(node.slot_policy()), 8);
    assert_eq!(top.free_slots(node.slot_policy()), 0);
    assert!(node.try_aggregate(otn(Odu0), AggregationStrategy::NextFit).is_err());
}

#[test]
fn transitive_aggregation_builds_a_two_level_nest() {
    let mut node = baikal_to_odu4();
    let client = gbe();
    let client_id = client.id;

    let top = node
        .try_aggregate(client, AggregationStrategy::NextFit)
        .expect("nest");

    assert_eq!(node.signals().len(), 1);
    let odu4 = &node.signals()[0];
    assert_eq!(odu4.id, top);
    assert_eq!(odu4.level, Odu4);
    assert_eq!(odu4.children().len(), 1);
    let odu2 = &odu4.children()[0];
    assert_eq!(odu2.level, Odu2);
    assert_eq!(odu2.children().len(), 1);
    assert_eq!(odu2.children()[0].id, client_id);
    assert_eq!(odu2.children()[0].level, Odu0);
    assert_eq!(node.signal_count(), 3);
}

#[test]
fn nested_containers_are_reused_before_new_ones_are_opened() {
    let mut node = baikal_to_odu4();
    let first = node
        .try_aggregate(gbe(), AggregationStrategy::NextFit)
        .expect("first");
    let second = node
        .try_aggregate(gbe(), AggregationStrategy::NextFit)
        .expect("second");

    let odu4 = &node.signals()[0];
    assert_eq!(first, odu4.id);
    // 第二个客户直接进入已有的 ODU2
    assert_eq!(second, odu4.children()[0].id);
    assert_eq!(odu4.children().len(), 1);
    assert_eq!(odu4.children()[0].children().len(), 2);
}

#[test]
fn nested_cascade_removes_emptied_ancestors() {
    let mut node = baikal_to_odu4();
    let a = gbe();
    let b = gbe();
    let (a_id, b_id) = (a.id, b.id);
    node.try_aggregate(a, AggregationStrategy::NextFit).expect("a");
    node.try_aggregate(b, AggregationStrategy::NextFit).expect("b");
    let odu2 = node.signals()[0].children()[0].id;

    // 父容器仍非空：返回直接父容器
    assert_eq!(node.try_de_aggregate(a_id), Ok(odu2));
    assert_eq!(node.signal_count(), 3);

    // 父容器变空：级联移除 ODU2 与 ODU4
    assert_eq!(node.try_de_aggregate(b_id), Ok(odu2));
    assert!(node.signals().is_empty());
    assert!(node.signal(odu2).is_none());
}

#[test]
fn de_aggregating_unknown_signal_fails() {
    let mut node = baikal(1);
    node.try_aggregate(gbe(), AggregationStrategy::NextFit).expect("fits");
    let missing = SignalId::fresh();
    assert_eq!(
        node.try_de_aggregate(missing),
        Err(OtnError::SignalNotFound(missing))
    );
    assert_eq!(node.signals().len(), 1);
}

#[test]
fn apex_level_client_is_admitted_once() {
    let mut node = baikal(1);
    let container = otn(Odu2);
    let id = container.id;

    assert_eq!(node.try_aggregate(container.clone(), AggregationStrategy::NextFit), Ok(id));
    assert_eq!(node.try_aggregate(container, AggregationStrategy::NextFit), Ok(id));
    assert_eq!(node.signals().len(), 1);

    let err = node
        .try_aggregate(otn(Odu2), AggregationStrategy::NextFit)
        .unwrap_err();
    assert_eq!(
        err,
        OtnError::CapacityExceeded {
            level: Odu2,
            capacity: 1
        }
    );

    // 顶层信号本身也可以被移除
    assert_eq!(node.try_de_aggregate(id), Ok(id));
    assert!(node.signals().is_empty());
}

#[test]
fn clients_at_or_above_the_apex_or_outside_rules_fail() {
    let mut node = baikal(1);
    for level in [Odu3, Odu4] {
        let err = node
            .try_aggregate(otn(level), AggregationStrategy::NextFit)
            .unwrap_err();
        assert!(matches!(err, OtnError::NoAggregationPath { .. }), "{level}");
    }
    assert!(node.signals().is_empty());

    // ODU2 容器不能装入同级的 ODU2
    let mut container = OtnSignal::container(Odu2, OtnNodeId(0), OtnNodeId(1));
    let same = otn(Odu2);
    assert!(!container.can_aggregate(&same, node.slot_policy()));
    assert!(container.embed(same, node.slot_policy()).is_err());
    assert!(container.is_empty());
}

#[test]
fn client_with_non_nominal_bandwidth_is_rejected() {
    let mut node = baikal(1);
    let mut client = otn(Odu0);
    client.bandwidth_gbps = 0.5;
    let err = node
        .try_aggregate(client, AggregationStrategy::NextFit)
        .unwrap_err();
    assert!(matches!(err, OtnError::LevelMismatch { .. }));
    assert!(node.signals().is_empty());
}

#[test]
fn failed_bubble_up_leaves_no_partial_state() {
    // 顶层容量为 1，且已被 ODU2 容器占用并装满
    let mut node = baikal_to_odu4();
    for _ in 0..10 {
        node.try_aggregate(otn(Odu2), AggregationStrategy::NextFit)
            .expect("ODU2 into ODU4");
    }
    let before = node.signals().to_vec();
    let err = node
        .try_aggregate(otn(Odu2), AggregationStrategy::NextFit)
        .unwrap_err();
    assert!(matches!(err, OtnError::CapacityExceeded { level: Odu4, .. }));
    assert_eq!(node.signals(), before.as_slice());

    // ODU0 需要新的 ODU2，而 ODU2 已经放不进 ODU4
    assert!(node.try_aggregate(gbe(), AggregationStrategy::NextFit).is_err());
    assert_eq!(node.signals(), before.as_slice());
}

#[test]
fn next_fit_prefers_the_newest_container() {
    let (mut node, _a, b) = two_containers();
    assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::NextFit), Ok(b));
}

#[test]
fn first_fit_prefers_the_oldest_container() {
    let (mut node, a, _b) = two_containers();
    assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::FirstFit), Ok(a));
}

#[test]
fn best_fit_packs_the_tightest_container() {
    let (mut node, a, _b) = two_containers();
    assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::BestFit), Ok(a));
    assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::BestFit), Ok(a));
    // A 已满
    let b = node.signals()[1].id;
    assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::BestFit), Ok(b));
}

#[test]
fn worst_fit_spreads_to_the_loosest_container() {
    let (mut node, _a, b) = two_containers();
    assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::WorstFit), Ok(b));
}

#[test]
fn odu1_clients_are_placed_by_their_slot_cost() {
    let (mut node, a, b) = two_containers();
    // ODU1 需要 2 个时隙：A 与 B 都能装下
    assert_eq!(node.try_aggregate(otn(Odu1), AggregationStrategy::BestFit), Ok(a));
    // A 已满，只剩 B
    assert_eq!(node.try_aggregate(otn(Odu1), AggregationStrategy::FirstFit), Ok(b));
}

#[test]
fn custom_slot_table_changes_container_budget() {
    let table = SlotTable {
        required: [1, 2, 8, 32, 80],
        available: [0, 2, 4, 32, 80],
    };
    let mut node = OtnNode::with_slots(
        OtnNodeId(0),
        [rule(Odu0, Odu2), rule(Odu1, Odu2)],
        Box::new(table),
        1,
    )
    .expect("custom slots");

    for _ in 0..4 {
        node.try_aggregate(gbe(), AggregationStrategy::NextFit)
            .expect("fits in 4 slots");
    }
    assert!(matches!(
        node.try_aggregate(gbe(), AggregationStrategy::NextFit),
        Err(OtnError::CapacityExceeded { .. })
    ));
}

#[test]
fn signal_lookup_covers_nested_levels() {
    let mut node = baikal_to_odu4();
    let c = gbe();
    let id = c.id;
    node.try_aggregate(c, AggregationStrategy::NextFit).expect("nest");

    assert!(node.contains(id));
    assert_eq!(node.signal(id).map(|s| s.level), Some(Odu0));
    assert_eq!(node.top_level_of(id).map(|s| s.level), Some(Odu4));
}

#[test]
fn wrapped_clients_never_host_other_clients() {
    let mut node = baikal_to_odu4();
    let ten_gbe = Signal::new(OtnNodeId(0), OtnNodeId(1), 10.0)
        .to_otn()
        .expect("wrap 10GbE");
    assert!(!ten_gbe.is_container());
    let ten_gbe_id = ten_gbe.id;
    node.try_aggregate(ten_gbe, AggregationStrategy::NextFit)
        .expect("10GbE into ODU4");

    let got = node
        .try_aggregate(gbe(), AggregationStrategy::NextFit)
        .expect("GbE");
    assert_ne!(got, ten_gbe_id);

    let odu4 = &node.signals()[0];
    assert!(odu4.is_container());
    assert_eq!(odu4.children().len(), 2);
    assert!(odu4.children()[0].is_empty());
    assert!(odu4.children()[1].is_container());
    assert_eq!(odu4.children()[1].children().len(), 1);
}

#[test]
fn admitted_apex_client_hosts_later_clients() {
    let mut node = OtnNode::new(OtnNodeId(0), [rule(Odu0, Odu2)], 1).expect("node");
    let ten_gbe = Signal::new(OtnNodeId(0), OtnNodeId(1), 10.0)
        .to_otn()
        .expect("wrap 10GbE");
    let host = ten_gbe.id;
    assert_eq!(node.try_aggregate(ten_gbe, AggregationStrategy::NextFit), Ok(host));
    assert!(node.signals()[0].is_container());

    for _ in 0..8 {
        assert_eq!(node.try_aggregate(gbe(), AggregationStrategy::NextFit), Ok(host));
    }
    assert!(matches!(
        node.try_aggregate(gbe(), AggregationStrategy::NextFit),
        Err(OtnError::CapacityExceeded { level: Odu2, capacity: 1 })
    ));
    assert_eq!(node.signal_count(), 9);
}
