//! Per-tab state. Mounting a page subscribes it and starts empty histories;
//! dropping it unsubscribes and discards them.

use crate::bus::EventBus;
use crate::derive::{self, DiskOps, NetCounters};
use crate::history::{KeyedSeries, RollingSeries};
use crate::proclist::{self, ProcessField, ProcessSummary, SortState};
use crate::subscription::Subscription;
use crate::types::{
    events, CpuSnapshot, DiskSnapshot, MemorySnapshot, NetworkSnapshot, NetworkTable, ProcessInfo,
    ProcessSet,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Cpu,
    Memory,
    Network,
    Processes,
    Disk,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Home,
        Tab::Cpu,
        Tab::Memory,
        Tab::Network,
        Tab::Processes,
        Tab::Disk,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Cpu => "CPU",
            Tab::Memory => "Memory",
            Tab::Network => "Network",
            Tab::Processes => "Processes",
            Tab::Disk => "Disk",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn from_index(i: usize) -> Option<Tab> {
        Self::ALL.get(i).copied()
    }

    pub fn next(self) -> Tab {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Overview cards: CPU and RAM gauges, aggregate network rate and process count.
pub struct HomePage {
    pub cpu: Subscription<CpuSnapshot>,
    pub memory: Subscription<MemorySnapshot>,
    pub network: Subscription<NetworkSnapshot>,
    pub processes: Subscription<ProcessSet>,
    // totals summed across active interfaces
    pub net_totals: RollingSeries<NetCounters>,
}

impl HomePage {
    pub fn mount(bus: &EventBus, history: usize) -> Self {
        Self {
            cpu: Subscription::new(bus, events::CPU),
            memory: Subscription::new(bus, events::MEMORY),
            network: Subscription::new(bus, events::NETWORK),
            processes: Subscription::new(bus, events::PROCESSES),
            net_totals: RollingSeries::new(history),
        }
    }

    fn refresh(&mut self) {
        if let Some(table) = self.network.take_update() {
            let sent = derive::active_total(&table, |c| c.network_sent).sum;
            let recv = derive::active_total(&table, |c| c.network_recv).sum;
            self.net_totals.push(NetCounters {
                sent,
                recv,
                ..Default::default()
            });
        }
    }
}

pub struct CpuPage {
    pub cpu: Subscription<CpuSnapshot>,
    pub history: RollingSeries<f64>,
}

impl CpuPage {
    pub fn mount(bus: &EventBus, history: usize) -> Self {
        Self {
            cpu: Subscription::new(bus, events::CPU),
            history: RollingSeries::new(history),
        }
    }

    fn refresh(&mut self) {
        if let Some(c) = self.cpu.take_update() {
            self.history.push(c.cpu_percent);
        }
    }
}

pub struct MemoryPage {
    pub memory: Subscription<MemorySnapshot>,
    pub history: RollingSeries<f64>,
}

impl MemoryPage {
    pub fn mount(bus: &EventBus, history: usize) -> Self {
        Self {
            memory: Subscription::new(bus, events::MEMORY),
            history: RollingSeries::new(history),
        }
    }

    fn refresh(&mut self) {
        if let Some(m) = self.memory.take_update() {
            self.history.push(m.memory_percent);
        }
    }
}

pub struct NetworkPage {
    pub network: Subscription<NetworkSnapshot>,
    pub history: KeyedSeries<NetCounters>,
    // index into history keys of the interface shown in the rate charts
    pub selected: usize,
}

impl NetworkPage {
    pub fn mount(bus: &EventBus, history: usize) -> Self {
        Self {
            network: Subscription::new(bus, events::NETWORK),
            history: KeyedSeries::new(history),
            selected: 0,
        }
    }

    fn refresh(&mut self) {
        if let Some(table) = self.network.take_update() {
            record_active(&mut self.history, &table);
        }
    }

    pub fn selected_interface(&self) -> Option<&str> {
        let n = self.history.len();
        if n == 0 {
            return None;
        }
        self.history.keys().nth(self.selected.min(n - 1))
    }

    pub fn select_next(&mut self) {
        let n = self.history.len();
        if n > 0 {
            self.selected = (self.selected.min(n - 1) + 1) % n;
        }
    }

    pub fn select_prev(&mut self) {
        let n = self.history.len();
        if n > 0 {
            self.selected = (self.selected.min(n - 1) + n - 1) % n;
        }
    }
}

/// Append one sample per interface that is up in this report. Interfaces that
/// are down or missing keep their previous history untouched.
pub fn record_active(history: &mut KeyedSeries<NetCounters>, table: &NetworkTable) {
    for (name, conn) in table.iter().filter(|(_, c)| c.is_up) {
        history.record(name, NetCounters::from(conn));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcList {
    #[default]
    Foreground,
    Background,
}

pub struct ProcessesPage {
    pub processes: Subscription<ProcessSet>,
    pub query: String,
    pub searching: bool,
    pub sort: SortState,
    pub list: ProcList,
    pub scroll: usize,
}

impl ProcessesPage {
    pub fn mount(bus: &EventBus) -> Self {
        Self {
            processes: Subscription::new(bus, events::PROCESSES),
            query: String::new(),
            searching: false,
            sort: SortState::default(),
            list: ProcList::Foreground,
            scroll: 0,
        }
    }

    pub fn sort_by(&mut self, field: ProcessField) {
        self.sort = self.sort.toggle(field);
        self.scroll = 0;
    }

    pub fn toggle_list(&mut self) {
        self.list = match self.list {
            ProcList::Foreground => ProcList::Background,
            ProcList::Background => ProcList::Foreground,
        };
        self.scroll = 0;
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.scroll = 0;
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.scroll = 0;
    }

    /// Filtered and sorted rows of both lists, in that order.
    pub fn shaped<'a>(&self, set: &'a ProcessSet) -> (Vec<&'a ProcessInfo>, Vec<&'a ProcessInfo>) {
        (
            proclist::visible_rows(&set.foreground, &self.query, self.sort),
            proclist::visible_rows(&set.background, &self.query, self.sort),
        )
    }

    /// Both lists after the search filter, foreground first. The summary cards
    /// and top-N charts read from this regardless of which list is shown.
    pub fn matching<'a>(&self, set: &'a ProcessSet) -> Vec<&'a ProcessInfo> {
        let mut rows = proclist::filter_by_name(&set.foreground, &self.query);
        rows.extend(proclist::filter_by_name(&set.background, &self.query));
        rows
    }

    /// Leaders and status counts over the matching processes; the total counts
    /// every process in the report.
    pub fn summary(&self, set: &ProcessSet) -> ProcessSummary {
        ProcessSummary {
            total: set.total(),
            ..proclist::summarize(&self.matching(set))
        }
    }
}

pub struct DiskPage {
    pub disk: Subscription<DiskSnapshot>,
    pub ops: RollingSeries<DiskOps>,
}

impl DiskPage {
    pub fn mount(bus: &EventBus, history: usize) -> Self {
        Self {
            disk: Subscription::new(bus, events::DISK),
            ops: RollingSeries::new(history),
        }
    }

    fn refresh(&mut self) {
        if let Some(d) = self.disk.take_update() {
            self.ops.push(DiskOps::from(&d));
        }
    }
}

pub enum Page {
    Home(HomePage),
    Cpu(CpuPage),
    Memory(MemoryPage),
    Network(NetworkPage),
    Processes(ProcessesPage),
    Disk(DiskPage),
}

impl Page {
    pub fn mount(tab: Tab, bus: &EventBus, history: usize) -> Self {
        match tab {
            Tab::Home => Page::Home(HomePage::mount(bus, history)),
            Tab::Cpu => Page::Cpu(CpuPage::mount(bus, history)),
            Tab::Memory => Page::Memory(MemoryPage::mount(bus, history)),
            Tab::Network => Page::Network(NetworkPage::mount(bus, history)),
            Tab::Processes => Page::Processes(ProcessesPage::mount(bus)),
            Tab::Disk => Page::Disk(DiskPage::mount(bus, history)),
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            Page::Home(_) => Tab::Home,
            Page::Cpu(_) => Tab::Cpu,
            Page::Memory(_) => Tab::Memory,
            Page::Network(_) => Tab::Network,
            Page::Processes(_) => Tab::Processes,
            Page::Disk(_) => Tab::Disk,
        }
    }

    /// Fold the latest delivery into the page's histories. Call after every dispatched event.
    pub fn refresh(&mut self) {
        match self {
            Page::Home(p) => p.refresh(),
            Page::Cpu(p) => p.refresh(),
            Page::Memory(p) => p.refresh(),
            Page::Network(p) => p.refresh(),
            Page::Processes(_) => {}
            Page::Disk(p) => p.refresh(),
        }
    }
}
