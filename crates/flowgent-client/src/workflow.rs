//! Workflow data model
//!
//! TigerStyle: Typed n8n wire shapes, explicit auto-connection.
//!
//! Node order is meaningful: it defines the default top-to-bottom layout
//! and drives linear auto-connection. The connection graph is keyed by
//! node NAME, not id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Default output/input port name on n8n nodes
pub const DEFAULT_PORT: &str = "main";

/// A single connection edge target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTarget {
    /// Target node name
    pub node: String,
    /// Target input port
    #[serde(rename = "type")]
    pub port: String,
    /// Target input index
    pub index: u32,
}

/// Connection graph: source node name -> output port -> slots -> targets
pub type Connections = BTreeMap<String, BTreeMap<String, Vec<Vec<ConnectionTarget>>>>;

/// A workflow node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique within a workflow, client-generated
    pub id: String,
    /// Unique within a workflow; the connection graph keys on this
    pub name: String,
    /// Capability identifier, e.g. "n8n-nodes-base.httpRequest"
    #[serde(rename = "type")]
    pub node_type: String,
    /// Node type version
    #[serde(rename = "typeVersion", default = "default_type_version")]
    pub type_version: u32,
    /// Canvas position
    #[serde(default)]
    pub position: [f64; 2],
    /// Free-form parameters, schema depends on node_type
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

fn default_type_version() -> u32 {
    1
}

/// An n8n workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    /// Server-assigned id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Connections,
    /// Server-assigned, read-only from this side
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Partial workflow update; `None` fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nodes: Option<Vec<Value>>,
    #[serde(default)]
    pub connections: Option<Value>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// A workflow execution record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "workflowId", default)]
    pub workflow_id: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(rename = "startedAt", default)]
    pub started_at: Option<String>,
    #[serde(rename = "finishedAt", default)]
    pub finished_at: Option<String>,
}

/// Synthesize a strictly linear connection chain over `nodes`
///
/// Connects node i's default output to node i+1's default input for
/// i = 0..n-2. Returns an empty graph for fewer than two nodes. Callers
/// must apply this only when no connections were supplied at all; it is
/// never merged with partial graphs.
pub fn linear_chain(nodes: &[Node]) -> Connections {
    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    linear_chain_names(&names)
}

/// Synthesize a linear chain from node names, in order
///
/// Used when nodes arrive as untyped JSON (e.g. generated by the agent)
/// and only their names are needed.
pub fn linear_chain_names(names: &[&str]) -> Connections {
    let mut connections = Connections::new();
    if names.len() < 2 {
        return connections;
    }

    for window in names.windows(2) {
        let target = ConnectionTarget {
            node: window[1].to_string(),
            port: DEFAULT_PORT.to_string(),
            index: 0,
        };
        connections.insert(
            window[0].to_string(),
            BTreeMap::from([(DEFAULT_PORT.to_string(), vec![vec![target]])]),
        );
    }

    connections
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn node(name: &str) -> Node {
        Node {
            id: format!("id-{name}"),
            name: name.to_string(),
            node_type: "n8n-nodes-base.noOp".to_string(),
            type_version: 1,
            position: [0.0, 0.0],
            parameters: Map::new(),
        }
    }

    #[test]
    fn test_linear_chain_exact_shape() {
        let nodes = vec![node("A"), node("B"), node("C")];
        let chain = linear_chain(&nodes);

        assert_eq!(chain.len(), 2);
        for (src, dst) in [("A", "B"), ("B", "C")] {
            let ports = chain.get(src).unwrap();
            assert_eq!(ports.len(), 1);
            let slots = ports.get(DEFAULT_PORT).unwrap();
            assert_eq!(slots.len(), 1);
            assert_eq!(
                slots[0],
                vec![ConnectionTarget {
                    node: dst.to_string(),
                    port: DEFAULT_PORT.to_string(),
                    index: 0,
                }]
            );
        }
        // Terminal node has no outgoing edges.
        assert!(!chain.contains_key("C"));
    }

    #[test]
    fn test_linear_chain_too_few_nodes() {
        assert!(linear_chain(&[]).is_empty());
        assert!(linear_chain(&[node("only")]).is_empty());
    }

    #[test]
    fn test_linear_chain_every_target_exists() {
        let nodes: Vec<Node> = (0..8).map(|i| node(&format!("n{i}"))).collect();
        let chain = linear_chain(&nodes);
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();

        for (src, ports) in &chain {
            assert!(names.contains(&src.as_str()));
            for slots in ports.values() {
                for slot in slots {
                    for target in slot {
                        assert!(names.contains(&target.node.as_str()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_connection_wire_shape() {
        let chain = linear_chain(&[node("A"), node("B")]);
        let wire = serde_json::to_value(&chain).unwrap();
        assert_eq!(
            wire,
            json!({"A": {"main": [[{"node": "B", "type": "main", "index": 0}]]}})
        );
    }

    #[test]
    fn test_node_wire_names() {
        let wire = serde_json::to_value(node("A")).unwrap();
        assert_eq!(wire["type"], "n8n-nodes-base.noOp");
        assert_eq!(wire["typeVersion"], 1);
        assert_eq!(wire["position"], json!([0.0, 0.0]));
    }

    #[test]
    fn test_workflow_roundtrip_preserves_node_order() {
        let workflow = Workflow {
            id: Some("wf-1".to_string()),
            name: "chain".to_string(),
            active: false,
            nodes: vec![node("first"), node("second"), node("third")],
            connections: Connections::new(),
            created_at: None,
            updated_at: None,
        };

        let wire = serde_json::to_value(&workflow).unwrap();
        let back: Workflow = serde_json::from_value(wire).unwrap();
        let names: Vec<&str> = back.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_execution_tolerates_missing_fields() {
        let execution: Execution = serde_json::from_value(json!({"id": "9"})).unwrap();
        assert_eq!(execution.id.as_deref(), Some("9"));
        assert!(!execution.success);
        assert!(execution.data.is_none());
    }
}
