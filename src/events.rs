use serde::{Deserialize, Serialize};

use crate::lifecycle::Phase;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadPhaseChange {
    pub from: Phase,
    pub to: Phase,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadDrag {
    /// Storage key of the dragged control
    pub id: String,
    pub pos: [f32; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadActivated {
    pub generation: u64,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PayloadResultDiscarded {
    pub generation: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    PhaseChange(PayloadPhaseChange),
    DragStart(PayloadDrag),
    DragEnd(PayloadDrag),
    Activated(PayloadActivated),
    ResultDiscarded(PayloadResultDiscarded),
}

/// Receiver of overlay events.
pub trait EventSink {
    fn send(&self, event: Event);
}

impl EventSink for crossbeam::channel::Sender<Event> {
    fn send(&self, event: Event) {
        // a dropped receiver only means nobody listens anymore
        let _ = crossbeam::channel::Sender::send(self, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_phase_change() {
        let event = Event::PhaseChange(PayloadPhaseChange {
            from: Phase::Hidden,
            to: Phase::Loading,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"PhaseChange":{"from":"Hidden","to":"Loading"}}"#);

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_crossbeam_sink() {
        let (tx, rx) = crossbeam::channel::unbounded();
        EventSink::send(&tx, Event::ResultDiscarded(PayloadResultDiscarded { generation: 2 }));
        assert_eq!(
            rx.try_recv().unwrap(),
            Event::ResultDiscarded(PayloadResultDiscarded { generation: 2 })
        );

        drop(rx);
        EventSink::send(&tx, Event::ResultDiscarded(PayloadResultDiscarded { generation: 3 }));
    }
}
