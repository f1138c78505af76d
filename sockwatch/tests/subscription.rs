//! Event bus, typed subscriptions and page mounting.

use serde_json::json;
use sockwatch::bus::EventBus;
use sockwatch::pages::{record_active, NetworkPage, Page, Tab};
use sockwatch::subscription::{Latest, Subscription};
use sockwatch::types::{
    events, CpuSnapshot, NetworkSnapshot, NetworkTable, ProcessSet, ProcessStatus,
};

#[test]
fn unavailable_until_first_event() {
    let bus = EventBus::new();
    let sub: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    assert_eq!(sub.latest(), Latest::Unavailable);
    bus.dispatch(events::MEMORY, &json!({"memory_percent": 12.0}));
    assert!(!sub.is_available());
}

#[test]
fn latest_payload_wins() {
    let bus = EventBus::new();
    let sub: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    bus.dispatch(events::CPU, &json!({"cpu_percent": 10.0}));
    bus.dispatch(events::CPU, &json!({"cpu_percent": 55.5}));
    let v = sub.with_latest(|l| l.available().map(|c| c.cpu_percent));
    assert_eq!(v, Some(55.5));
    assert_eq!(sub.deliveries(), 2);
}

#[test]
fn take_update_yields_once_per_delivery() {
    let bus = EventBus::new();
    let mut sub: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    assert!(sub.take_update().is_none());
    bus.dispatch(events::CPU, &json!({"cpu_percent": 1.0}));
    assert!(sub.take_update().is_some());
    assert!(sub.take_update().is_none());
    // identical payloads still count as new deliveries
    bus.dispatch(events::CPU, &json!({"cpu_percent": 1.0}));
    assert!(sub.take_update().is_some());
}

#[test]
fn drop_unregisters_the_handler() {
    let bus = EventBus::new();
    let sub: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    assert_eq!(bus.handler_count(events::CPU), 1);
    drop(sub);
    assert_eq!(bus.handler_count(events::CPU), 0);
    assert_eq!(bus.dispatch(events::CPU, &json!({"cpu_percent": 1.0})), 0);
}

#[test]
fn subscriptions_are_independent() {
    let bus = EventBus::new();
    let a: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    let b: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    assert_eq!(bus.dispatch(events::CPU, &json!({"cpu_percent": 7.0})), 2);
    drop(a);
    bus.dispatch(events::CPU, &json!({"cpu_percent": 8.0}));
    assert_eq!(b.deliveries(), 2);
    assert_eq!(bus.handler_count(events::CPU), 1);
}

#[test]
fn undecodable_payload_keeps_last_value() {
    let bus = EventBus::new();
    let sub: Subscription<ProcessSet> = Subscription::new(&bus, events::PROCESSES);
    bus.dispatch(events::PROCESSES, &json!({"foreground": [{"pid": 1, "name": "init"}]}));
    bus.dispatch(events::PROCESSES, &json!("garbage"));
    assert_eq!(sub.deliveries(), 1);
    let n = sub.with_latest(|l| l.available().map(|s| s.total()));
    assert_eq!(n, Some(1));
}

#[test]
fn lenient_fields_decode_strings_and_nulls() {
    let bus = EventBus::new();
    let sub: Subscription<CpuSnapshot> = Subscription::new(&bus, events::CPU);
    bus.dispatch(
        events::CPU,
        &json!({"cpu_percent": "12.5", "cpu_count": null, "cpu_temp": "n/a", "extra": true}),
    );
    let c = sub.latest();
    let c = c.available().cloned().unwrap_or_default();
    assert_eq!(c.cpu_percent, 12.5);
    assert_eq!(c.cpu_count, 0);
    assert_eq!(c.cpu_temp, None);
}

#[test]
fn null_process_list_reads_as_empty() {
    let bus = EventBus::new();
    let sub: Subscription<ProcessSet> = Subscription::new(&bus, events::PROCESSES);
    bus.dispatch(
        events::PROCESSES,
        &json!({
            "foreground": null,
            "background": [{"pid": 3, "name": "kworker"}, null, {"pid": 4}]
        }),
    );
    let set = sub.latest().available().cloned().expect("process set decoded");
    assert!(set.foreground.is_empty());
    assert_eq!(
        set.background.iter().map(|p| p.pid).collect::<Vec<_>>(),
        vec![3, 4]
    );
}

#[test]
fn unreadable_interface_is_left_out() {
    let bus = EventBus::new();
    let sub: Subscription<NetworkSnapshot> = Subscription::new(&bus, events::NETWORK);
    bus.dispatch(
        events::NETWORK,
        &json!({
            "eth0": {"is_up": true, "network_sent": 10},
            "docker0": null
        }),
    );
    let names = sub.with_latest(|l| {
        l.available()
            .map(|t| t.keys().cloned().collect::<Vec<_>>())
    });
    assert_eq!(names, Some(vec!["eth0".to_string()]));

    bus.dispatch(events::NETWORK, &json!(["not", "a", "table"]));
    assert_eq!(sub.deliveries(), 1);
}

#[test]
fn network_page_records_despite_unreadable_interface() {
    let bus = EventBus::new();
    let mut page = Page::mount(Tab::Network, &bus, 20);
    bus.dispatch(
        events::NETWORK,
        &json!({"eth0": {"is_up": true}, "docker0": "gone"}),
    );
    page.refresh();
    let Page::Network(p) = &page else {
        panic!("expected network page");
    };
    assert_eq!(p.history.keys().collect::<Vec<_>>(), vec!["eth0"]);
}

#[test]
fn process_status_strings_map_to_variants() {
    let bus = EventBus::new();
    let sub: Subscription<ProcessSet> = Subscription::new(&bus, events::PROCESSES);
    bus.dispatch(
        events::PROCESSES,
        &json!({
            "foreground": [{"pid": "7", "name": "a", "status": "sleeping"}],
            "background": [{"pid": 8, "name": "b", "status": "weird"}]
        }),
    );
    let set = sub.latest().available().cloned().unwrap_or_default();
    assert_eq!(set.foreground[0].pid, 7);
    assert_eq!(set.foreground[0].status, ProcessStatus::Sleeping);
    assert_eq!(set.background[0].status.as_str(), "weird");
}

#[test]
fn pages_register_and_release_their_events() {
    let bus = EventBus::new();
    let home = Page::mount(Tab::Home, &bus, 20);
    for ev in [events::CPU, events::MEMORY, events::NETWORK, events::PROCESSES] {
        assert_eq!(bus.handler_count(ev), 1, "{ev}");
    }
    assert_eq!(bus.handler_count(events::DISK), 0);
    drop(home);
    for ev in [events::CPU, events::MEMORY, events::NETWORK, events::PROCESSES] {
        assert_eq!(bus.handler_count(ev), 0, "{ev}");
    }
}

#[test]
fn cpu_page_history_follows_deliveries() {
    let bus = EventBus::new();
    let mut page = Page::mount(Tab::Cpu, &bus, 20);
    for i in 0..25 {
        bus.dispatch(events::CPU, &json!({"cpu_percent": i as f64}));
        page.refresh();
    }
    let Page::Cpu(p) = &page else {
        panic!("expected cpu page");
    };
    assert_eq!(p.history.len(), 20);
    assert_eq!(p.history.latest().map(|s| s.value), Some(24.0));
}

#[test]
fn remounted_page_starts_empty() {
    let bus = EventBus::new();
    let mut page = Page::mount(Tab::Memory, &bus, 20);
    bus.dispatch(events::MEMORY, &json!({"memory_percent": 40.0}));
    page.refresh();
    page = Page::mount(Tab::Memory, &bus, 20);
    let Page::Memory(p) = &page else {
        panic!("expected memory page");
    };
    assert!(p.history.is_empty());
    assert!(!p.memory.is_available());
    assert_eq!(bus.handler_count(events::MEMORY), 1);
}

#[test]
fn network_history_skips_down_and_missing_interfaces() {
    let mut page = NetworkPage::mount(&EventBus::new(), 20);
    let first: NetworkTable = serde_json::from_value(json!({
        "eth0": {"is_up": true, "network_sent": 10},
        "eth1": {"is_up": true, "network_sent": 5}
    }))
    .unwrap_or_default();
    let second: NetworkTable = serde_json::from_value(json!({
        "eth0": {"is_up": true, "network_sent": 20},
        "eth1": {"is_up": false, "network_sent": 6}
    }))
    .unwrap_or_default();
    let third: NetworkTable = serde_json::from_value(json!({
        "eth0": {"is_up": true, "network_sent": 30}
    }))
    .unwrap_or_default();
    record_active(&mut page.history, &first);
    record_active(&mut page.history, &second);
    record_active(&mut page.history, &third);
    assert_eq!(page.history.get("eth0").map(|s| s.len()), Some(3));
    assert_eq!(page.history.get("eth1").map(|s| s.len()), Some(1));
}

#[test]
fn network_selection_wraps() {
    let mut page = NetworkPage::mount(&EventBus::new(), 20);
    assert_eq!(page.selected_interface(), None);
    let t: NetworkTable = serde_json::from_value(json!({
        "eth0": {"is_up": true},
        "wlan0": {"is_up": true}
    }))
    .unwrap_or_default();
    record_active(&mut page.history, &t);
    assert_eq!(page.selected_interface(), Some("eth0"));
    page.select_next();
    assert_eq!(page.selected_interface(), Some("wlan0"));
    page.select_next();
    assert_eq!(page.selected_interface(), Some("eth0"));
    page.select_prev();
    assert_eq!(page.selected_interface(), Some("wlan0"));
}
