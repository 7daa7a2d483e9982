#![deny(unsafe_code)]
#![deny(warnings)]
//! MQTT agent command queue
//!
//! Workers never touch the broker connection themselves: they queue
//! commands and the `mqtt_agent` task serializes them onto the one managed
//! connection. The queue is created once, when the boot sequencer stands
//! the agent up; workers spawned afterwards fetch a sender with
//! [`command_sender`].

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::{String, Vec};
use rtic_sync::channel::{Receiver, Sender};

/// Queued commands the agent can hold before senders wait
pub const QUEUE_DEPTH: usize = 8;
pub const TOPIC_MAX_LEN: usize = 64;
pub const PAYLOAD_MAX_LEN: usize = 256;

/// Work submitted to the agent
#[derive(Debug, Clone)]
pub enum AgentCommand {
    Publish {
        topic: String<TOPIC_MAX_LEN>,
        payload: Vec<u8, PAYLOAD_MAX_LEN>,
    },
    Subscribe {
        topic: String<TOPIC_MAX_LEN>,
    },
}

impl AgentCommand {
    /// Build a publish command, `None` if topic or payload is too long
    pub fn publish(topic: &str, payload: &[u8]) -> Option<Self> {
        Some(Self::Publish {
            topic: String::try_from(topic).ok()?,
            payload: Vec::from_slice(payload).ok()?,
        })
    }

    /// Build a subscribe command, `None` if the topic is too long
    pub fn subscribe(topic: &str) -> Option<Self> {
        Some(Self::Subscribe {
            topic: String::try_from(topic).ok()?,
        })
    }

    pub fn topic(&self) -> &str {
        match self {
            Self::Publish { topic, .. } | Self::Subscribe { topic } => topic.as_str(),
        }
    }
}

pub type AgentSender = Sender<'static, AgentCommand, QUEUE_DEPTH>;
pub type AgentReceiver = Receiver<'static, AgentCommand, QUEUE_DEPTH>;

static COMMAND_SENDER: Mutex<RefCell<Option<AgentSender>>> = Mutex::new(RefCell::new(None));

/// Create the command queue and publish its sender
///
/// Panics if called twice; the scheduler guards against that.
pub(crate) fn create_queue() -> AgentReceiver {
    let (sender, receiver) = rtic_sync::make_channel!(AgentCommand, QUEUE_DEPTH);
    critical_section::with(|cs| COMMAND_SENDER.borrow_ref_mut(cs).replace(sender));
    receiver
}

/// Sender for the agent queue, `None` until the agent is up
pub fn command_sender() -> Option<AgentSender> {
    critical_section::with(|cs| COMMAND_SENDER.borrow_ref(cs).clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_limits() {
        assert!(AgentCommand::publish("device/defender", b"{}").is_some());
        let long = [b't'; TOPIC_MAX_LEN + 1];
        let long = core::str::from_utf8(&long).unwrap();
        assert!(AgentCommand::subscribe(long).is_none());
        assert!(AgentCommand::publish("t", &[0u8; PAYLOAD_MAX_LEN + 1]).is_none());
    }

    #[test]
    fn test_topic() {
        let command = AgentCommand::subscribe("device/test").unwrap();
        assert_eq!(command.topic(), "device/test");
    }
}
