//! Integration tests for `PlugInDevice` against the in-memory node.
//!
//! Covers endpoint creation (standalone and bridged), name handling,
//! both synchronisation directions, identify, and the report listener.

use std::rc::Rc;

use crate::mock_hw::{FlakyNode, MockAccessory};

use plugbridge::adapters::memory_node::{InMemoryNode, MAX_ENDPOINTS};
use plugbridge::app::device::{BridgedDevice, PlugInDevice};
use plugbridge::app::ports::{MatterNodePort, PlugInAccessory};
use plugbridge::error::{Error, NodeError};
use plugbridge::matter::{
    clusters, AttrValue, AttributePath, EndpointFlags, DEFAULT_DEVICE_NAME, DEV_TYPE_BRIDGED_NODE,
    DEV_TYPE_ON_OFF_PLUGIN_UNIT, MAX_NAME_LEN,
};

type Device = PlugInDevice<MockAccessory, InMemoryNode>;

fn bridged(name: &str) -> (Rc<InMemoryNode>, Rc<MockAccessory>, Rc<Device>, u16) {
    let node = Rc::new(InMemoryNode::new());
    let agg = node.create_aggregator().unwrap();
    let acc = Rc::new(MockAccessory::new());
    let dev = PlugInDevice::new(name, acc.clone(), node.clone(), Some(agg)).unwrap();
    (node, acc, dev, agg)
}

// ── Construction ──────────────────────────────────────────────

#[test]
fn standalone_endpoint_has_no_bridging() {
    let node = Rc::new(InMemoryNode::new());
    let acc = Rc::new(MockAccessory::new());
    let dev = PlugInDevice::new("Lamp", acc, node.clone(), None).unwrap();

    let ep = node.endpoint(dev.endpoint_id()).unwrap();
    assert_eq!(ep.flags, EndpointFlags::NONE);
    assert_eq!(ep.parent, None);
    assert!(!ep.has_cluster(clusters::bridged_device_basic_information::ID));
    assert!(ep.has_device_type(DEV_TYPE_ON_OFF_PLUGIN_UNIT));
    assert!(ep.has_cluster(clusters::on_off::ID));
    assert!(ep.has_cluster(clusters::identify::ID));

    // The name is still kept for the device itself.
    assert_eq!(dev.name(), "Lamp");
    assert!(!dev.is_bridged());
}

#[test]
fn bridged_endpoint_is_labelled_and_parented() {
    let (node, _acc, dev, agg) = bridged("Desk Lamp");

    let ep = node.endpoint(dev.endpoint_id()).unwrap();
    assert_eq!(ep.flags, EndpointFlags::BRIDGE | EndpointFlags::DESTROYABLE);
    assert_eq!(ep.parent, Some(agg));
    assert!(ep.has_device_type(DEV_TYPE_BRIDGED_NODE));
    assert!(ep.has_device_type(DEV_TYPE_ON_OFF_PLUGIN_UNIT));

    let label = node.attribute(AttributePath::node_label(dev.endpoint_id())).unwrap();
    assert_eq!(label.as_str(), Some("Desk Lamp"));
    assert_eq!(dev.parent(), Some(agg));
    assert_eq!(node.children(agg), vec![dev.endpoint_id()]);
}

#[test]
fn empty_name_falls_back_without_label() {
    let (node, _acc, dev, _) = bridged("");

    assert_eq!(dev.name(), DEFAULT_DEVICE_NAME);
    let path = AttributePath::node_label(dev.endpoint_id());
    assert_eq!(node.attribute(path), Err(NodeError::AttributeNotFound(path)));
    // Still a bridged node under the aggregator.
    assert!(dev.is_bridged());
}

#[test]
fn over_long_name_falls_back_without_label() {
    let (node, _acc, dev, _) = bridged(&"n".repeat(MAX_NAME_LEN + 1));

    assert_eq!(dev.name(), DEFAULT_DEVICE_NAME);
    assert!(node.attribute(AttributePath::node_label(dev.endpoint_id())).is_err());
}

#[test]
fn longest_valid_name_is_labelled() {
    let name = "n".repeat(MAX_NAME_LEN);
    let (node, _acc, dev, _) = bridged(&name);

    assert_eq!(dev.name(), name);
    let label = node.attribute(AttributePath::node_label(dev.endpoint_id())).unwrap();
    assert_eq!(label.as_str(), Some(name.as_str()));
}

#[test]
fn construction_registers_listener_and_syncs_once() {
    let node = Rc::new(InMemoryNode::new());
    let acc = Rc::new(MockAccessory::with_power(true));
    let _dev = PlugInDevice::new("Lamp", acc.clone(), node, None).unwrap();

    assert_eq!(acc.listener_registrations.get(), 1);
    assert!(acc.listener_alive());
    // Endpoint starts off; the accessory is driven to match.
    assert_eq!(*acc.set_power_calls.borrow(), vec![false]);
    assert!(!acc.power());
}

#[test]
fn construction_fails_when_node_is_full() {
    let node = Rc::new(InMemoryNode::new());
    while node.create_endpoint(EndpointFlags::NONE).is_ok() {}

    let acc = Rc::new(MockAccessory::new());
    let res = PlugInDevice::new("Lamp", acc, node, None);
    assert_eq!(res.err(), Some(Error::Node(NodeError::EndpointLimit)));
}

#[test]
fn construction_fails_for_unknown_aggregator() {
    let node = Rc::new(InMemoryNode::new());
    let before = node.endpoint_count();
    let acc = Rc::new(MockAccessory::new());
    let res = PlugInDevice::new("Lamp", acc.clone(), node.clone(), Some(17));
    assert_eq!(res.err(), Some(Error::Node(NodeError::EndpointNotFound(17))));

    // The half-built bridged node is gone and the accessory was never bound.
    assert_eq!(node.endpoint_count(), before);
    assert_eq!(acc.listener_registrations.get(), 0);
    assert!(acc.set_power_calls.borrow().is_empty());
}

#[test]
fn failed_initial_read_leaves_accessory_unbound() {
    let node = Rc::new(FlakyNode::default());
    let agg = node.create_aggregator().unwrap();
    let before = node.inner.endpoint_count();
    let acc = Rc::new(MockAccessory::with_power(true));
    node.fail_reads.set(true);

    let res = PlugInDevice::new("Lamp", acc.clone(), node.clone(), Some(agg));
    assert!(matches!(res, Err(Error::Node(NodeError::AttributeNotFound(_)))));

    assert_eq!(node.inner.endpoint_count(), before);
    assert!(node.inner.children(agg).is_empty());
    assert_eq!(acc.listener_registrations.get(), 0);
    assert!(!acc.listener_alive());
    assert!(acc.power());
}

#[test]
fn failed_construction_frees_its_endpoint_slot() {
    let node = Rc::new(InMemoryNode::new());
    let agg = node.create_aggregator().unwrap();
    while node.endpoint_count() < MAX_ENDPOINTS - 1 {
        node.create_endpoint(EndpointFlags::NONE).unwrap();
    }

    let lost = PlugInDevice::new("Lamp", Rc::new(MockAccessory::new()), node.clone(), Some(99));
    assert!(lost.is_err());
    let dev =
        PlugInDevice::new("Lamp", Rc::new(MockAccessory::new()), node.clone(), Some(agg)).unwrap();
    assert_eq!(node.children(agg), vec![dev.endpoint_id()]);
}

#[test]
fn endpoint_ids_are_distinct() {
    let node = Rc::new(InMemoryNode::new());
    let a = PlugInDevice::new("A", Rc::new(MockAccessory::new()), node.clone(), None).unwrap();
    let b = PlugInDevice::new("B", Rc::new(MockAccessory::new()), node.clone(), None).unwrap();
    assert_ne!(a.endpoint_id(), b.endpoint_id());
}

// ── Synchronisation ───────────────────────────────────────────

#[test]
fn update_accessory_copies_endpoint_value() {
    let (node, acc, dev, _) = bridged("Lamp");

    node.write_attribute(AttributePath::on_off(dev.endpoint_id()), AttrValue::Bool(true))
        .unwrap();
    dev.update_accessory().unwrap();
    assert!(acc.power());

    node.write_attribute(AttributePath::on_off(dev.endpoint_id()), AttrValue::Bool(false))
        .unwrap();
    dev.update_accessory().unwrap();
    assert!(!acc.power());
}

#[test]
fn update_accessory_does_not_echo_back() {
    let (node, acc, dev, _) = bridged("Lamp");
    node.write_attribute(AttributePath::on_off(dev.endpoint_id()), AttrValue::Bool(true))
        .unwrap();
    let _ = node.take_reports();

    dev.update_accessory().unwrap();
    assert!(acc.power());
    assert!(node.take_reports().is_empty(), "endpoint-commanded change is not re-reported");
}

#[test]
fn report_endpoint_copies_accessory_value() {
    let (node, acc, dev, _) = bridged("Lamp");

    acc.set_power(true);
    dev.report_endpoint().unwrap();
    assert_eq!(
        node.attribute(AttributePath::on_off(dev.endpoint_id())).unwrap(),
        AttrValue::Bool(true)
    );
}

#[test]
fn local_change_is_reported_through_listener() {
    let (node, acc, dev, _) = bridged("Lamp");
    let _ = node.take_reports();

    acc.local_change(true);

    let reports = node.take_reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].path, AttributePath::on_off(dev.endpoint_id()));
    assert_eq!(reports[0].value, AttrValue::Bool(true));
}

#[test]
fn last_writer_wins() {
    let (node, acc, dev, _) = bridged("Lamp");
    let path = AttributePath::on_off(dev.endpoint_id());

    node.write_attribute(path, AttrValue::Bool(true)).unwrap();
    acc.local_change(false);
    assert_eq!(node.attribute(path).unwrap(), AttrValue::Bool(false));

    acc.set_power(true);
    dev.update_accessory().unwrap();
    assert!(!acc.power(), "endpoint value overwrote the accessory");
}

#[test]
fn dropped_device_stops_reporting() {
    let (node, acc, dev, _) = bridged("Lamp");
    let path = AttributePath::on_off(dev.endpoint_id());
    drop(dev);

    assert!(!acc.listener_alive());
    acc.local_change(true);
    assert_eq!(node.attribute(path).unwrap(), AttrValue::Bool(false));
}

// ── Identify ──────────────────────────────────────────────────

#[test]
fn identify_calls_accessory_exactly_once() {
    let (_node, acc, dev, _) = bridged("Lamp");
    acc.set_power(true);
    let calls_before = acc.set_power_calls.borrow().len();

    dev.identify().unwrap();

    assert_eq!(acc.identify_calls.get(), 1);
    assert!(acc.power());
    assert_eq!(acc.set_power_calls.borrow().len(), calls_before);
}

// ── Node failures ─────────────────────────────────────────────

#[test]
fn node_failures_are_surfaced() {
    let node = Rc::new(FlakyNode::default());
    let acc = Rc::new(MockAccessory::new());
    let dev = PlugInDevice::new("Lamp", acc.clone(), node.clone(), None).unwrap();

    node.fail_reports.set(true);
    assert!(matches!(dev.report_endpoint(), Err(Error::Node(_))));

    node.fail_reads.set(true);
    assert!(matches!(dev.update_accessory(), Err(Error::Node(_))));

    // The listener path swallows the error; the accessory keeps its state.
    acc.local_change(true);
    assert!(acc.power());
}
