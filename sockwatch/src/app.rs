//! App state and main loop: input handling, pumping collector events into the
//! mounted page, and drawing.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tokio::time::{sleep, timeout, timeout_at, Instant};
use tracing::{info, warn};

use crate::pages::{Page, Tab};
use crate::ui::{
    cpu::draw_cpu, disk::draw_disk, header::draw_header, home::draw_home, mem::draw_mem,
    net::draw_net, processes::draw_processes, processes::processes_handle_key,
};
use crate::ws::{Pumped, SocketClient};

const TICK: Duration = Duration::from_millis(100);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
// rows moved by PageUp/PageDown in the process table
const PAGE_ROWS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Live,
    Lost(String),
}

pub struct App {
    client: SocketClient,
    page: Page,
    history: usize,
    status: LinkStatus,
    should_quit: bool,
}

impl App {
    /// Starts on the home tab with nothing received yet.
    pub fn new(client: SocketClient, history: usize) -> Self {
        let page = Page::mount(Tab::Home, client.bus(), history);
        Self {
            client,
            page,
            history,
            status: LinkStatus::Connecting,
            should_quit: false,
        }
    }

    pub fn tab(&self) -> Tab {
        self.page.tab()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn client(&self) -> &SocketClient {
        &self.client
    }

    pub fn status(&self) -> &LinkStatus {
        &self.status
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Mount `tab`, dropping the current page and its histories.
    pub fn switch_to(&mut self, tab: Tab) {
        if tab == self.page.tab() {
            return;
        }
        self.page = Page::mount(tab, self.client.bus(), self.history);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        // an open search box takes every key
        if let Page::Processes(p) = &mut self.page {
            if p.searching {
                processes_handle_key(p, key, PAGE_ROWS);
                return;
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Tab => {
                self.switch_to(self.tab().next());
                return;
            }
            KeyCode::BackTab => {
                self.switch_to(self.tab().prev());
                return;
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = (c as usize) - ('1' as usize);
                if let Some(tab) = Tab::from_index(idx) {
                    self.switch_to(tab);
                }
                return;
            }
            KeyCode::Char('r') if !self.client.is_connected() => {
                info!("manual reconnect requested");
                self.status = LinkStatus::Connecting;
                return;
            }
            _ => {}
        }

        match &mut self.page {
            Page::Network(p) => match key.code {
                KeyCode::Left => p.select_prev(),
                KeyCode::Right => p.select_next(),
                _ => {}
            },
            Page::Processes(p) => {
                processes_handle_key(p, key, PAGE_ROWS);
            }
            _ => {}
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "disconnect failed");
        }
        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::ZERO)? {
                if let Event::Key(k) = event::read()? {
                    if k.kind == KeyEventKind::Press {
                        self.handle_key(k);
                    }
                }
            }
            if self.should_quit {
                break;
            }

            terminal.draw(|f| self.draw(f))?;

            if self.status == LinkStatus::Connecting {
                self.try_connect().await;
            }
            if self.client.is_connected() {
                self.pump_for(TICK).await;
            } else {
                sleep(TICK).await;
            }
        }
        Ok(())
    }

    async fn try_connect(&mut self) {
        self.status = match timeout(CONNECT_TIMEOUT, self.client.connect()).await {
            Ok(Ok(())) => LinkStatus::Live,
            Ok(Err(e)) => {
                warn!(error = %e, "connect failed");
                LinkStatus::Lost(e.to_string())
            }
            Err(_) => {
                warn!(timeout = ?CONNECT_TIMEOUT, "connect timed out");
                LinkStatus::Lost("timed out".into())
            }
        };
    }

    /// Take frames until `budget` runs out or the link drops.
    async fn pump_for(&mut self, budget: Duration) {
        let deadline = Instant::now() + budget;
        loop {
            // only the read is timed; a pong must not be cut off mid-send
            let pumped = match timeout_at(deadline, self.client.next_frame()).await {
                Err(_) => return,
                Ok(Ok(frame)) => self.client.process(frame).await,
                Ok(Err(e)) => Err(e),
            };
            match pumped {
                Ok(Pumped::Event { .. }) => self.page.refresh(),
                Ok(Pumped::Control) => {}
                Ok(Pumped::Disconnected) => {
                    warn!("collector closed the connection");
                    self.status = LinkStatus::Lost("closed by collector".into());
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "transport failed");
                    self.status = LinkStatus::Lost(e.to_string());
                    return;
                }
            }
        }
    }

    pub fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(f.area());

        draw_header(
            f,
            rows[0],
            self.page.tab(),
            self.client.endpoint().as_str(),
            &self.status,
        );

        let body = rows[1];
        match &self.page {
            Page::Home(p) => draw_home(f, body, p),
            Page::Cpu(p) => draw_cpu(f, body, p),
            Page::Memory(p) => draw_mem(f, body, p),
            Page::Network(p) => draw_net(f, body, p),
            Page::Processes(p) => draw_processes(f, body, p),
            Page::Disk(p) => draw_disk(f, body, p),
        }
    }
}
