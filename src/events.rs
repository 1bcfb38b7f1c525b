//! Command queue between the Matter stack task and the bridge loop.
//!
//! The stack delivers attribute-update and identify callbacks on its own
//! task. Those callbacks only enqueue a [`BridgeCommand`]; the main loop
//! drains the queue and dispatches to the
//! [`DeviceRegistry`](crate::app::registry::DeviceRegistry), so device code
//! always runs on the bridge task.
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Stack callbacks │────▶│ CommandQueue │────▶│  Main Loop   │
//! │ (Matter task)   │     │ (bounded)    │     │  (consumer)  │
//! └─────────────────┘     └──────────────┘     └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::BridgeCommand;

/// Maximum number of pending commands.
pub const COMMAND_QUEUE_CAP: usize = 16;

/// Bounded multi-producer queue of [`BridgeCommand`]s.
///
/// `const`-constructible so it can live in a `static` shared with stack
/// callbacks.
pub struct CommandQueue {
    channel: Channel<CriticalSectionRawMutex, BridgeCommand, COMMAND_QUEUE_CAP>,
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking. Returns `false` if the queue is full and
    /// the command was dropped.
    pub fn push(&self, cmd: BridgeCommand) -> bool {
        match self.channel.try_send(cmd) {
            Ok(()) => true,
            Err(_) => {
                warn!("Command queue full, dropping {:?}", cmd);
                false
            }
        }
    }

    /// Dequeue the oldest command, if any.
    pub fn pop(&self) -> Option<BridgeCommand> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending commands into a callback, oldest first.
    pub fn drain(&self, mut handler: impl FnMut(BridgeCommand)) {
        while let Some(cmd) = self.pop() {
            handler(cmd);
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
