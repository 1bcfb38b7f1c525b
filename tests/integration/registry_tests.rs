//! Integration tests for the stack-callback path:
//! node → `CommandQueue` → `DeviceRegistry` → device → accessory.

use std::rc::Rc;

use crate::mock_hw::{MockAccessory, RecordingSink};

use plugbridge::adapters::memory_node::InMemoryNode;
use plugbridge::adapters::relay_plug::RelayPlug;
use plugbridge::app::commands::BridgeCommand;
use plugbridge::app::device::{BridgedDevice, PlugInDevice};
use plugbridge::app::events::BridgeEvent;
use plugbridge::app::ports::{MatterNodePort, PlugInAccessory};
use plugbridge::app::registry::{DeviceRegistry, MAX_BRIDGED_DEVICES};
use plugbridge::drivers::hw_init::GpioPin;
use plugbridge::drivers::identify::IdentifyBlinker;
use plugbridge::drivers::relay::RelayDriver;
use plugbridge::error::Error;
use plugbridge::events::CommandQueue;
use plugbridge::matter::{clusters, AttrValue, AttributePath, EndpointId, MAX_NAME_LEN};

struct Bridge {
    node: Rc<InMemoryNode>,
    registry: DeviceRegistry,
    sink: RecordingSink,
    plugs: Vec<(EndpointId, Rc<MockAccessory>)>,
}

fn bridge(names: &[&str]) -> Bridge {
    let node = Rc::new(InMemoryNode::new());
    let agg = node.create_aggregator().unwrap();
    let mut registry = DeviceRegistry::new();
    let mut sink = RecordingSink::new();
    let mut plugs = Vec::new();

    for name in names {
        let acc = Rc::new(MockAccessory::new());
        let dev = PlugInDevice::new(name, acc.clone(), node.clone(), Some(agg)).unwrap();
        plugs.push((dev.endpoint_id(), acc));
        registry.register(dev, &mut sink).unwrap();
    }
    Bridge {
        node,
        registry,
        sink,
        plugs,
    }
}

// ── Registration ──────────────────────────────────────────────

#[test]
fn register_emits_device_added() {
    let b = bridge(&["Kettle", ""]);
    assert_eq!(b.registry.len(), 2);

    let added: Vec<_> = b
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            BridgeEvent::DeviceAdded { endpoint, name } => {
                Some((*endpoint, name.as_str().to_owned()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        added,
        vec![
            (b.plugs[0].0, "Kettle".to_owned()),
            (b.plugs[1].0, plugbridge::matter::DEFAULT_DEVICE_NAME.to_owned()),
        ]
    );
}

#[test]
fn duplicate_endpoint_rejected() {
    let mut b = bridge(&["A"]);
    let (_, acc) = &b.plugs[0];
    let existing = b.registry.get(b.plugs[0].0).unwrap().clone();
    assert_eq!(
        b.registry.register(existing, &mut b.sink),
        Err(Error::DuplicateEndpoint(b.plugs[0].0))
    );
    assert_eq!(b.registry.len(), 1);
    assert!(!acc.power());
}

#[test]
fn registry_capacity_enforced() {
    let node = Rc::new(InMemoryNode::new());
    let mut registry = DeviceRegistry::new();
    let mut sink = RecordingSink::new();

    for _ in 0..MAX_BRIDGED_DEVICES {
        let acc = Rc::new(MockAccessory::new());
        let dev = PlugInDevice::new("p", acc, node.clone(), None).unwrap();
        registry.register(dev, &mut sink).unwrap();
    }
    let extra = PlugInDevice::new("p", Rc::new(MockAccessory::new()), node, None).unwrap();
    assert_eq!(registry.register(extra, &mut sink), Err(Error::RegistryFull));
}

/// A device from another adapter whose name overflows a node label.
struct LongNamed(String);

impl BridgedDevice for LongNamed {
    fn endpoint_id(&self) -> EndpointId {
        40
    }

    fn name(&self) -> &str {
        &self.0
    }

    fn update_accessory(&self) -> plugbridge::error::Result<()> {
        Ok(())
    }

    fn report_endpoint(&self) -> plugbridge::error::Result<()> {
        Ok(())
    }

    fn identify(&self) -> plugbridge::error::Result<()> {
        Ok(())
    }
}

#[test]
fn over_long_name_is_rejected() {
    let mut registry = DeviceRegistry::new();
    let mut sink = RecordingSink::new();
    let dev = Rc::new(LongNamed("x".repeat(MAX_NAME_LEN + 1)));

    assert_eq!(registry.register(dev, &mut sink), Err(Error::NameTooLong));
    assert_eq!(registry.len(), 0);
    assert!(sink.events.is_empty());
}

// ── Command routing ───────────────────────────────────────────

#[test]
fn attribute_update_reaches_only_its_device() {
    let mut b = bridge(&["A", "B"]);
    let (ep_b, acc_b) = b.plugs[1].clone();
    let (_, acc_a) = b.plugs[0].clone();

    let cmd = b
        .node
        .write_attribute(AttributePath::on_off(ep_b), AttrValue::Bool(true))
        .unwrap();
    b.registry.handle_command(cmd, &mut b.sink).unwrap();

    assert!(acc_b.power());
    assert!(!acc_a.power());
    assert_eq!(b.sink.last(), Some(&BridgeEvent::AccessoryUpdated { endpoint: ep_b }));
}

#[test]
fn other_attributes_are_ignored() {
    let mut b = bridge(&["A"]);
    let (ep, acc) = b.plugs[0].clone();
    let calls = acc.set_power_calls.borrow().len();

    let path = AttributePath::new(ep, clusters::identify::ID, clusters::identify::IDENTIFY_TIME);
    b.registry
        .handle_command(BridgeCommand::AttributeUpdated(path), &mut b.sink)
        .unwrap();

    assert_eq!(acc.set_power_calls.borrow().len(), calls);
    assert_eq!(b.sink.last(), Some(&BridgeEvent::Ignored(path)));
}

#[test]
fn identify_is_routed() {
    let mut b = bridge(&["A", "B"]);
    let (ep_a, acc_a) = b.plugs[0].clone();

    let cmd = b.node.invoke_identify(ep_a).unwrap();
    b.registry.handle_command(cmd, &mut b.sink).unwrap();

    assert_eq!(acc_a.identify_calls.get(), 1);
    assert_eq!(b.plugs[1].1.identify_calls.get(), 0);
    assert_eq!(b.sink.last(), Some(&BridgeEvent::Identified { endpoint: ep_a }));
}

#[test]
fn unknown_endpoint_fails_and_is_emitted() {
    let mut b = bridge(&["A"]);

    let res = b.registry.handle_command(BridgeCommand::Identify(30), &mut b.sink);

    assert_eq!(res, Err(Error::UnknownEndpoint(30)));
    assert_eq!(
        b.sink.last(),
        Some(&BridgeEvent::CommandFailed {
            endpoint: 30,
            error: Error::UnknownEndpoint(30)
        })
    );
}

#[test]
fn report_all_pushes_every_accessory() {
    let mut b = bridge(&["A", "B", "C"]);
    for (_, acc) in &b.plugs {
        acc.set_power(true);
    }

    b.registry
        .handle_command(BridgeCommand::ReportAll, &mut b.sink)
        .unwrap();

    for (ep, _) in &b.plugs {
        assert_eq!(
            b.node.attribute(AttributePath::on_off(*ep)).unwrap(),
            AttrValue::Bool(true)
        );
    }
    let reported = b
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, BridgeEvent::EndpointReported { .. }))
        .count();
    assert_eq!(reported, 3);
}

// ── Queue pipeline ────────────────────────────────────────────

#[test]
fn queued_callbacks_drain_in_order() {
    let mut b = bridge(&["A"]);
    let (ep, acc) = b.plugs[0].clone();
    let queue = CommandQueue::new();

    queue.push(
        b.node
            .write_attribute(AttributePath::on_off(ep), AttrValue::Bool(true))
            .unwrap(),
    );
    queue.push(b.node.invoke_identify(ep).unwrap());
    queue.push(
        b.node
            .write_attribute(AttributePath::on_off(ep), AttrValue::Bool(false))
            .unwrap(),
    );

    let registry = &b.registry;
    let sink = &mut b.sink;
    queue.drain(|cmd| {
        let _ = registry.handle_command(cmd, sink);
    });

    // update_accessory reads the stored value at dispatch time.
    assert!(!acc.power());
    assert_eq!(acc.identify_calls.get(), 1);
    assert!(queue.is_empty());
}

// ── Relay plug end to end ─────────────────────────────────────

#[test]
fn relay_plug_toggle_reaches_endpoint() {
    let node = Rc::new(InMemoryNode::new());
    let agg = node.create_aggregator().unwrap();
    let plug = Rc::new(RelayPlug::new(
        RelayDriver::new(GpioPin::new(44), false).unwrap(),
        IdentifyBlinker::new(GpioPin::new(45), 2, 100),
    ));
    let dev = PlugInDevice::new("Relay", plug.clone(), node.clone(), Some(agg)).unwrap();
    let path = AttributePath::on_off(dev.endpoint_id());
    let _ = node.take_reports();

    plug.toggle();

    assert!(plug.power());
    assert_eq!(node.attribute(path).unwrap(), AttrValue::Bool(true));
    assert_eq!(node.take_reports().len(), 1);

    // A controller write switches the relay without a second report.
    let mut registry = DeviceRegistry::new();
    let mut sink = RecordingSink::new();
    registry.register(dev, &mut sink).unwrap();
    let cmd = node.write_attribute(path, AttrValue::Bool(false)).unwrap();
    let _ = node.take_reports();
    registry.handle_command(cmd, &mut sink).unwrap();
    assert!(!plug.power());
    assert!(node.take_reports().is_empty());
}
