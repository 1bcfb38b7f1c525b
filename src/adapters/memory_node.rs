//! In-memory Matter node: host simulation of the stack's endpoint tree.
//!
//! Implements [`MatterNodePort`] with plain vectors behind a `RefCell`.
//! It keeps the parts of the stack the bridge can observe: endpoint ids,
//! flags, parents, device types, attribute values, per-cluster data
//! versions, and the notifications a subscriber would receive. It does
//! not speak the Matter protocol.
//!
//! Used by the host build of the firmware and by the tests.

use core::cell::RefCell;

use crate::app::commands::BridgeCommand;
use crate::app::ports::MatterNodePort;
use crate::error::NodeError;
use crate::matter::{
    clusters, AttrValue, AttributeId, AttributePath, ClusterId, DeviceType, EndpointFlags,
    EndpointId, OnOffPluginUnitConfig, DEV_TYPE_AGGREGATOR, DEV_TYPE_BRIDGED_NODE,
    DEV_TYPE_ON_OFF_PLUGIN_UNIT, ROOT_ENDPOINT_ID,
};

/// Most endpoints the simulated node holds, root included.
pub const MAX_ENDPOINTS: usize = 32;

// ── Snapshot types ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub id: AttributeId,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: ClusterId,
    /// Bumped on every attribute change in this cluster.
    pub dataver: u32,
    pub attributes: Vec<Attribute>,
}

impl Cluster {
    fn new(id: ClusterId, attributes: Vec<Attribute>) -> Self {
        Self {
            id,
            dataver: 0,
            attributes,
        }
    }

    pub fn attribute(&self, id: AttributeId) -> Option<&AttrValue> {
        self.attributes.iter().find(|a| a.id == id).map(|a| &a.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub id: EndpointId,
    pub flags: EndpointFlags,
    pub parent: Option<EndpointId>,
    pub device_types: Vec<DeviceType>,
    pub clusters: Vec<Cluster>,
}

impl Endpoint {
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.id == id)
    }

    pub fn has_cluster(&self, id: ClusterId) -> bool {
        self.cluster(id).is_some()
    }

    pub fn has_device_type(&self, dtype: DeviceType) -> bool {
        self.device_types.contains(&dtype)
    }
}

/// One change a subscriber would be notified about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeReport {
    pub path: AttributePath,
    pub value: AttrValue,
    pub dataver: u32,
}

// ── InMemoryNode ──────────────────────────────────────────────

struct Tree {
    endpoints: Vec<Endpoint>,
    next_id: EndpointId,
    reports: Vec<AttributeReport>,
}

impl Tree {
    fn endpoint_mut(&mut self, id: EndpointId) -> Result<&mut Endpoint, NodeError> {
        self.endpoints
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(NodeError::EndpointNotFound(id))
    }

    fn cluster_mut(
        &mut self,
        endpoint: EndpointId,
        cluster: ClusterId,
    ) -> Result<&mut Cluster, NodeError> {
        self.endpoint_mut(endpoint)?
            .clusters
            .iter_mut()
            .find(|c| c.id == cluster)
            .ok_or(NodeError::ClusterNotFound { endpoint, cluster })
    }

    fn allocate(
        &mut self,
        flags: EndpointFlags,
        device_types: Vec<DeviceType>,
        clusters: Vec<Cluster>,
    ) -> Result<EndpointId, NodeError> {
        if self.endpoints.len() >= MAX_ENDPOINTS {
            return Err(NodeError::EndpointLimit);
        }
        let id = self.next_id;
        self.next_id = self.next_id.checked_add(1).ok_or(NodeError::EndpointLimit)?;
        self.endpoints.push(Endpoint {
            id,
            flags,
            parent: None,
            device_types,
            clusters,
        });
        Ok(id)
    }

    /// Store `value` at `path`. Returns the new data version if it changed.
    fn store(&mut self, path: AttributePath, value: AttrValue) -> Result<Option<u32>, NodeError> {
        let cluster = self.cluster_mut(path.endpoint, path.cluster)?;
        let attr = cluster
            .attributes
            .iter_mut()
            .find(|a| a.id == path.attribute)
            .ok_or(NodeError::AttributeNotFound(path))?;

        if !attr.value.same_type(&value) {
            return Err(NodeError::TypeMismatch(path));
        }
        if attr.value == value {
            return Ok(None);
        }
        attr.value = value;
        cluster.dataver = cluster.dataver.wrapping_add(1);
        Ok(Some(cluster.dataver))
    }
}

pub struct InMemoryNode {
    tree: RefCell<Tree>,
}

impl InMemoryNode {
    /// A node holding only the root endpoint.
    pub fn new() -> Self {
        let root = Endpoint {
            id: ROOT_ENDPOINT_ID,
            flags: EndpointFlags::NONE,
            parent: None,
            device_types: Vec::new(),
            clusters: Vec::new(),
        };
        Self {
            tree: RefCell::new(Tree {
                endpoints: vec![root],
                next_id: ROOT_ENDPOINT_ID + 1,
                reports: Vec::new(),
            }),
        }
    }

    /// Snapshot of one endpoint.
    pub fn endpoint(&self, id: EndpointId) -> Option<Endpoint> {
        self.tree.borrow().endpoints.iter().find(|e| e.id == id).cloned()
    }

    /// Number of endpoints, root included.
    pub fn endpoint_count(&self) -> usize {
        self.tree.borrow().endpoints.len()
    }

    /// Endpoints whose parent is `parent`, in creation order.
    pub fn children(&self, parent: EndpointId) -> Vec<EndpointId> {
        self.tree
            .borrow()
            .endpoints
            .iter()
            .filter(|e| e.parent == Some(parent))
            .map(|e| e.id)
            .collect()
    }

    /// Simulate a controller writing an attribute.
    ///
    /// Stores the value like the stack would and returns the post-update
    /// callback the stack would then deliver to the application.
    pub fn write_attribute(
        &self,
        path: AttributePath,
        value: AttrValue,
    ) -> Result<BridgeCommand, NodeError> {
        let mut tree = self.tree.borrow_mut();
        if let Some(dataver) = tree.store(path, value.clone())? {
            tree.reports.push(AttributeReport {
                path,
                value,
                dataver,
            });
        }
        Ok(BridgeCommand::AttributeUpdated(path))
    }

    /// Simulate a controller invoking Identify on `endpoint`.
    pub fn invoke_identify(&self, endpoint: EndpointId) -> Result<BridgeCommand, NodeError> {
        let mut tree = self.tree.borrow_mut();
        if !tree.endpoint_mut(endpoint)?.has_cluster(clusters::identify::ID) {
            return Err(NodeError::ClusterNotFound {
                endpoint,
                cluster: clusters::identify::ID,
            });
        }
        Ok(BridgeCommand::Identify(endpoint))
    }

    /// Drain pending subscriber notifications, oldest first.
    pub fn take_reports(&self) -> Vec<AttributeReport> {
        core::mem::take(&mut self.tree.borrow_mut().reports)
    }
}

impl Default for InMemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

impl MatterNodePort for InMemoryNode {
    fn create_endpoint(&self, flags: EndpointFlags) -> Result<EndpointId, NodeError> {
        self.tree.borrow_mut().allocate(flags, Vec::new(), Vec::new())
    }

    fn create_bridged_node(&self, flags: EndpointFlags) -> Result<EndpointId, NodeError> {
        let bdbi = Cluster::new(
            clusters::bridged_device_basic_information::ID,
            vec![Attribute {
                id: clusters::bridged_device_basic_information::REACHABLE,
                value: AttrValue::Bool(true),
            }],
        );
        self.tree
            .borrow_mut()
            .allocate(flags, vec![DEV_TYPE_BRIDGED_NODE], vec![bdbi])
    }

    fn create_aggregator(&self) -> Result<EndpointId, NodeError> {
        self.tree
            .borrow_mut()
            .allocate(EndpointFlags::NONE, vec![DEV_TYPE_AGGREGATOR], Vec::new())
    }

    fn destroy_endpoint(&self, endpoint: EndpointId) -> Result<(), NodeError> {
        let mut tree = self.tree.borrow_mut();
        let index = tree
            .endpoints
            .iter()
            .position(|e| e.id == endpoint)
            .ok_or(NodeError::EndpointNotFound(endpoint))?;
        let has_children = tree.endpoints.iter().any(|e| e.parent == Some(endpoint));
        if endpoint == ROOT_ENDPOINT_ID || has_children {
            return Err(NodeError::NotDestroyable(endpoint));
        }
        tree.endpoints.remove(index);
        tree.reports.retain(|r| r.path.endpoint != endpoint);
        Ok(())
    }

    fn set_parent_endpoint(
        &self,
        endpoint: EndpointId,
        parent: EndpointId,
    ) -> Result<(), NodeError> {
        let mut tree = self.tree.borrow_mut();
        tree.endpoint_mut(parent)?;
        tree.endpoint_mut(endpoint)?.parent = Some(parent);
        Ok(())
    }

    fn add_on_off_plugin_unit(
        &self,
        endpoint: EndpointId,
        config: &OnOffPluginUnitConfig,
    ) -> Result<(), NodeError> {
        let mut tree = self.tree.borrow_mut();
        let ep = tree.endpoint_mut(endpoint)?;

        if !ep.has_device_type(DEV_TYPE_ON_OFF_PLUGIN_UNIT) {
            ep.device_types.push(DEV_TYPE_ON_OFF_PLUGIN_UNIT);
        }
        if !ep.has_cluster(clusters::identify::ID) {
            ep.clusters.push(Cluster::new(
                clusters::identify::ID,
                vec![
                    Attribute {
                        id: clusters::identify::IDENTIFY_TIME,
                        value: AttrValue::U16(config.identify_time),
                    },
                    Attribute {
                        id: clusters::identify::IDENTIFY_TYPE,
                        value: AttrValue::U8(config.identify_type),
                    },
                ],
            ));
        }
        if !ep.has_cluster(clusters::on_off::ID) {
            ep.clusters.push(Cluster::new(
                clusters::on_off::ID,
                vec![Attribute {
                    id: clusters::on_off::ON_OFF,
                    value: AttrValue::Bool(config.on_off),
                }],
            ));
        }
        Ok(())
    }

    fn create_node_label(&self, endpoint: EndpointId, label: &str) -> Result<(), NodeError> {
        let value = AttrValue::char_string(label).ok_or(NodeError::ValueTooLong)?;
        let mut tree = self.tree.borrow_mut();
        let cluster = tree.cluster_mut(endpoint, clusters::bridged_device_basic_information::ID)?;
        let id = clusters::bridged_device_basic_information::NODE_LABEL;

        match cluster.attributes.iter_mut().find(|a| a.id == id) {
            Some(attr) => attr.value = value,
            None => cluster.attributes.push(Attribute { id, value }),
        }
        cluster.dataver = cluster.dataver.wrapping_add(1);
        Ok(())
    }

    fn attribute(&self, path: AttributePath) -> Result<AttrValue, NodeError> {
        let tree = self.tree.borrow();
        tree.endpoints
            .iter()
            .find(|e| e.id == path.endpoint)
            .ok_or(NodeError::EndpointNotFound(path.endpoint))?
            .cluster(path.cluster)
            .ok_or(NodeError::ClusterNotFound {
                endpoint: path.endpoint,
                cluster: path.cluster,
            })?
            .attribute(path.attribute)
            .cloned()
            .ok_or(NodeError::AttributeNotFound(path))
    }

    fn report_attribute(&self, path: AttributePath, value: AttrValue) -> Result<(), NodeError> {
        let mut tree = self.tree.borrow_mut();
        if let Some(dataver) = tree.store(path, value.clone())? {
            tree.reports.push(AttributeReport {
                path,
                value,
                dataver,
            });
        }
        Ok(())
    }
}
