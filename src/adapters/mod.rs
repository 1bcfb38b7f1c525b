//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to                   |
//! |----------------|--------------------|-------------------------------|
//! | `log_sink`     | EventSink          | Serial log output             |
//! | `memory_node`  | MatterNodePort     | In-memory endpoint tree       |
//! | `nvs`          | ConfigPort         | NVS / in-memory store         |
//! | `relay_plug`   | PlugInAccessory    | Relay + indicator GPIO        |

pub mod log_sink;
pub mod memory_node;
pub mod nvs;
pub mod relay_plug;
