// Severity rollup and diagnosis graph tests

use netdiag::models::*;
use netdiag::severity::{NodeIcon, diagnosis_graph, rollup};
use serde_json::json;

fn sus(level: SuspicionLevel) -> Suspicion {
    Suspicion::new(level, "")
}

#[test]
fn test_rollup_empty_is_info() {
    assert_eq!(rollup(&[]), SuspicionLevel::Info);
    assert_eq!(u8::from(rollup(&[])), 0);
}

#[test]
fn test_rollup_takes_max_level() {
    let list = vec![
        sus(SuspicionLevel::Warning),
        sus(SuspicionLevel::Fatal),
        sus(SuspicionLevel::Critical),
    ];
    let before = list.clone();
    assert_eq!(rollup(&list), SuspicionLevel::Fatal);
    assert_eq!(list, before);
}

#[test]
fn test_level_colors() {
    assert_eq!(SuspicionLevel::Info.color(), "#30BD61");
    assert_eq!(SuspicionLevel::Warning.color(), "#FFB369");
    assert_eq!(SuspicionLevel::Critical.color(), "#F76D76");
    assert_eq!(SuspicionLevel::Fatal.color(), "#F76D76");
}

#[test]
fn test_diagnosis_graph_rolls_up_nodes_links_and_cluster() {
    let data: DiagnosisResultData = serde_json::from_value(json!({
        "cluster": {"suspicions": [{"level": 1, "message": "dns slow"}]},
        "nodes": [
            {"id": "default/web", "type": "pod", "suspicions": [
                {"level": 1, "message": "a"}, {"level": 2, "message": "b"}
            ]},
            {"id": "node-1", "type": "node"},
            {"id": "svc", "type": "service"}
        ],
        "links": [
            {"id": "l1", "type": "pod_to_node", "source": "default/web", "destination": "node-1",
             "suspicions": [{"level": 3, "message": "drop"}]}
        ]
    }))
    .unwrap();

    let graph = diagnosis_graph(&data);
    let web = &graph.nodes[0];
    assert_eq!(web.severity, SuspicionLevel::Critical);
    assert_eq!(web.suspicion_count, 2);
    assert_eq!(web.color, "#F76D76");
    assert_eq!(web.icon, NodeIcon::Pod);

    let node = &graph.nodes[1];
    assert_eq!(node.severity, SuspicionLevel::Info);
    assert_eq!(node.suspicion_count, 0);
    assert_eq!(node.icon, NodeIcon::Node);
    assert_eq!(graph.nodes[2].icon, NodeIcon::Default);

    let link = &graph.edges[0];
    assert_eq!((link.source.as_str(), link.target.as_str()), ("default/web", "node-1"));
    assert_eq!(link.label, "pod_to_node");
    assert_eq!(link.severity, SuspicionLevel::Fatal);

    assert_eq!(graph.cluster_severity, SuspicionLevel::Fatal);
}

#[test]
fn test_empty_diagnosis_is_healthy() {
    let graph = diagnosis_graph(&DiagnosisResultData::default());
    assert!(graph.nodes.is_empty());
    assert_eq!(graph.cluster_severity, SuspicionLevel::Info);
}
