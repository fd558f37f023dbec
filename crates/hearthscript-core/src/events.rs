//! Lifecycle events and the event→subscriber table.
//!
//! The table is always rebuilt in full from the declared callback
//! configuration — never diffed — so a callback removed from
//! configuration is guaranteed absent after repopulation.

use crate::config::CallbackBean;
use std::collections::HashMap;

/// Host lifecycle events scripts can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallbackEvent {
    Load,
    Tick,
    DayStart,
    Nightfall,
    EntityDies,
    EntityHurts,
    ItemUse,
}

impl CallbackEvent {
    pub const ALL: [Self; 7] = [
        Self::Load,
        Self::Tick,
        Self::DayStart,
        Self::Nightfall,
        Self::EntityDies,
        Self::EntityHurts,
        Self::ItemUse,
    ];

    /// Stable external id used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Tick => "tick",
            Self::DayStart => "on_daybreak",
            Self::Nightfall => "on_nightfall",
            Self::EntityDies => "on_entity_dies",
            Self::EntityHurts => "on_entity_hurts",
            Self::ItemUse => "on_use",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.id() == id)
    }
}

/// One subscription: a script id plus its threading flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subscriber {
    pub script_id: String,
    pub threaded: bool,
}

/// Event → ordered subscriber list. Built once per population and
/// treated as immutable afterwards (consumers hold it behind an `Arc`).
pub type EventTable = HashMap<CallbackEvent, Vec<Subscriber>>;

/// Full rebuild from the declared callback beans. Beans naming an
/// unknown event id are skipped, not errors.
pub fn build_event_table(beans: &[CallbackBean]) -> EventTable {
    let mut table: EventTable = CallbackEvent::ALL
        .into_iter()
        .map(|event| (event, Vec::new()))
        .collect();

    for bean in beans {
        let Some(event) = CallbackEvent::from_id(&bean.event) else {
            tracing::warn!(event = %bean.event, "ignoring callback for unknown event");
            continue;
        };
        let subscribers = table.entry(event).or_default();
        subscribers.extend(bean.scripts.iter().map(|script_id| Subscriber {
            script_id: script_id.clone(),
            threaded: bean.threaded,
        }));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bean(event: &str, scripts: &[&str], threaded: bool) -> CallbackBean {
        CallbackBean {
            event: event.to_string(),
            scripts: scripts.iter().map(ToString::to_string).collect(),
            threaded,
        }
    }

    #[test]
    fn ids_round_trip() {
        for event in CallbackEvent::ALL {
            assert_eq!(CallbackEvent::from_id(event.id()), Some(event));
        }
        assert_eq!(CallbackEvent::from_id("no_such_event"), None);
    }

    #[test]
    fn build_preserves_declared_order() {
        let beans = vec![
            bean("tick", &["s1", "s2"], false),
            bean("tick", &["s3"], true),
        ];
        let table = build_event_table(&beans);
        let subs = &table[&CallbackEvent::Tick];
        assert_eq!(
            subs.iter().map(|s| s.script_id.as_str()).collect::<Vec<_>>(),
            vec!["s1", "s2", "s3"]
        );
        assert!(!subs[0].threaded);
        assert!(subs[2].threaded);
    }

    #[test]
    fn unknown_event_ids_are_skipped() {
        let beans = vec![
            bean("definitely_not_an_event", &["s1"], false),
            bean("load", &["s2"], false),
        ];
        let table = build_event_table(&beans);
        assert_eq!(table[&CallbackEvent::Load].len(), 1);
        let total: usize = table.values().map(Vec::len).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let beans = vec![
            bean("load", &["a"], false),
            bean("on_nightfall", &["b", "c"], true),
        ];
        let first = build_event_table(&beans);
        let second = build_event_table(&beans);
        assert_eq!(first, second);
    }

    #[test]
    fn removed_beans_are_absent_after_rebuild() {
        let full = vec![bean("tick", &["s1"], false), bean("load", &["s2"], false)];
        let trimmed = vec![bean("load", &["s2"], false)];

        let before = build_event_table(&full);
        assert_eq!(before[&CallbackEvent::Tick].len(), 1);

        let after = build_event_table(&trimmed);
        assert!(after[&CallbackEvent::Tick].is_empty());
        assert_eq!(after[&CallbackEvent::Load].len(), 1);
    }

    #[test]
    fn every_event_has_an_entry_even_when_empty() {
        let table = build_event_table(&[]);
        assert_eq!(table.len(), CallbackEvent::ALL.len());
        assert!(table.values().all(Vec::is_empty));
    }
}
