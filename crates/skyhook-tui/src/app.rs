//! Application core: event loop, the open screen, action dispatch.
//!
//! Exactly one [`ActiveScreen`] is open at a time. Switching screens closes
//! it, releasing every reference it held, and opens the next one on a fresh
//! delivery queue.

use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use skyhook_core::{ActiveScreen, Outcome, ScreenAction, ScreenConfig, ScreenKind, ScreenView, ViewReceiver};
use skyhook_sdk::model::BatteryInfo;
use skyhook_sdk::{Drone, DroneModel, Entity, GroundSdk, SimController};

use crate::action::{Action, Notice, SimAction};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::{self, ScreenTab};
use crate::screens::{ScreenOptions, create_component};
use crate::theme;
use crate::tui::Tui;

const FRAME_RATE: Duration = Duration::from_millis(33);

const GLOBAL_KEYS: &[(&str, &str)] = &[
    ("1-4", "jump to screen"),
    ("Tab", "next screen"),
    ("?", "this help"),
    ("q", "quit"),
];

const SIM_KEYS: &[(&str, &str)] = &[
    ("C / Z / X", "connect / disconnect / remove drone"),
    ("M", "swap drone model"),
    ("R / E", "connect / remove remote"),
    ("+ / -", "drone battery"),
    ("P", "toggle piloting availability"),
];

pub struct App {
    sdk: GroundSdk,
    sim: SimController,
    screen_config: ScreenConfig,
    options: ScreenOptions,
    /// The open screen.
    screen: ActiveScreen,
    /// View changes of `screen`; None once it stopped publishing.
    views: Option<ViewReceiver>,
    component: Box<dyn Component>,
    running: bool,
    help_visible: bool,
    /// Something changed since the last frame.
    dirty: bool,
    notice: Option<Notice>,
    piloting_available: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    /// Open the first screen against `sdk`.
    pub async fn start(
        sdk: GroundSdk,
        sim: SimController,
        screen_config: ScreenConfig,
        options: ScreenOptions,
        kind: ScreenKind,
    ) -> Result<Self> {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screen = ActiveScreen::open(kind, &sdk, &screen_config).await?;
        let mut views = screen.receiver();
        let component = create_component(views.current(), &options);

        Ok(Self {
            sdk,
            sim,
            screen_config,
            options,
            screen,
            views: Some(views),
            component,
            running: true,
            help_visible: false,
            dirty: true,
            notice: None,
            piloting_available: true,
            action_tx,
            action_rx,
        })
    }

    /// Run the main event loop until quit, then close the screen and SDK.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        let mut events = EventReader::spawn(FRAME_RATE);

        info!(screen = %self.screen.kind(), "TUI event loop started");

        while self.running {
            tokio::select! {
                event = events.next() => {
                    let Some(event) = event else { break };
                    self.handle_event(event)?;
                }
                Some(view) = next_view(&mut self.views) => {
                    self.action_tx.send(Action::ViewChanged(view))?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                let render = matches!(action, Action::Render);
                self.process_action(action).await?;
                if render && self.dirty {
                    tui.draw(|frame| self.render(frame))?;
                    self.dirty = false;
                }
            }
        }

        drop(events);
        drop(tui);
        self.shutdown().await;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Close the open screen, then the SDK.
    async fn shutdown(&mut self) {
        self.views = None;
        if let Err(e) = self.screen.close().await {
            warn!(error = %e, "screen did not close cleanly");
        }
        self.sdk.close();
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let action = match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Resize => {
                self.dirty = true;
                None
            }
            Event::Frame => Some(Action::Render),
        };
        if let Some(action) = action {
            self.action_tx.send(action)?;
        }
        Ok(())
    }

    /// Global keys first, then the screen's own keys.
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            };
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return (key.code == KeyCode::Char('c')).then_some(Action::Quit);
        }

        let kind = self.screen.kind();
        let global = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => Some(Action::ToggleHelp),
            KeyCode::Char(c @ '1'..='4') => c
                .to_digit(10)
                .and_then(|n| u8::try_from(n).ok())
                .and_then(ScreenKind::from_number)
                .map(Action::SwitchScreen),
            KeyCode::Tab => Some(Action::SwitchScreen(kind.next())),
            KeyCode::BackTab => Some(Action::SwitchScreen(kind.prev())),
            KeyCode::Char('C') => Some(Action::Sim(SimAction::ConnectDrone)),
            KeyCode::Char('M') => Some(Action::Sim(SimAction::SwapDroneModel)),
            KeyCode::Char('Z') => Some(Action::Sim(SimAction::DisconnectDrone)),
            KeyCode::Char('X') => Some(Action::Sim(SimAction::RemoveDrone)),
            KeyCode::Char('R') => Some(Action::Sim(SimAction::ConnectRemote)),
            KeyCode::Char('E') => Some(Action::Sim(SimAction::RemoveRemote)),
            KeyCode::Char('+') => Some(Action::Sim(SimAction::DroneBattery(10))),
            KeyCode::Char('-') => Some(Action::Sim(SimAction::DroneBattery(-10))),
            KeyCode::Char('P') => Some(Action::Sim(SimAction::TogglePiloting)),
            _ => None,
        };

        global.or_else(|| self.component.handle_key_event(key))
    }

    async fn process_action(&mut self, action: Action) -> Result<()> {
        if !matches!(action, Action::Render) {
            self.dirty = true;
        }

        match action {
            Action::Quit => self.running = false,
            Action::Render => {}
            Action::SwitchScreen(kind) => {
                if kind != self.screen.kind() {
                    self.switch_screen(kind).await?;
                }
            }
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::Perform(action) => self.perform(action).await,
            Action::Sim(action) => {
                let notice = self.apply_sim(action);
                self.notice = Some(notice);
            }
            Action::Notify(notice) => self.notice = Some(notice),
            view @ Action::ViewChanged(_) => {
                if let Some(follow_up) = self.component.update(&view) {
                    self.action_tx.send(follow_up)?;
                }
            }
        }
        Ok(())
    }

    async fn switch_screen(&mut self, kind: ScreenKind) -> Result<()> {
        debug!(from = %self.screen.kind(), to = %kind, "switching screen");
        self.views = None;
        self.screen.close().await?;
        self.screen = ActiveScreen::open(kind, &self.sdk, &self.screen_config).await?;

        let mut views = self.screen.receiver();
        self.component = create_component(views.current(), &self.options);
        self.views = Some(views);
        self.notice = None;
        Ok(())
    }

    async fn perform(&mut self, action: ScreenAction) {
        let name = action.name();
        let notice = match self.screen.perform(action).await {
            Ok(outcome) => Notice::info(format!("{name}: {}", describe(&outcome))),
            Err(e) => {
                warn!(error = %e, action = name, "action failed");
                Notice::error(format!("{name}: {e}"))
            }
        };
        self.action_tx.send(Action::Notify(notice)).ok();
    }

    // ── Simulator ───────────────────────────────────────────────────

    fn apply_sim(&mut self, action: SimAction) -> Notice {
        debug!(?action, "simulator action");
        let sim = &self.sim;
        match action {
            SimAction::ConnectDrone => {
                let drone = sim.connect_default_drone();
                Notice::info(format!("{} connected", drone.name()))
            }
            SimAction::SwapDroneModel => {
                let current = sim.drone().as_ref().map_or(sim.config().drone_model, Drone::model);
                let model = next_model(current);
                let drone = sim.connect_drone(&format!("{model}-1"), &model.to_string(), model);
                Notice::info(format!("swapped to {}", drone.name()))
            }
            SimAction::DisconnectDrone => report(sim.disconnect_drone(), "drone disconnected", "no drone"),
            SimAction::RemoveDrone => report(sim.remove_drone(), "drone removed", "no drone"),
            SimAction::ConnectRemote => {
                let remote = sim.connect_default_remote();
                Notice::info(format!("{} connected", remote.name()))
            }
            SimAction::RemoveRemote => report(sim.remove_remote(), "remote removed", "no remote"),
            SimAction::DroneBattery(delta) => {
                let Some(drone) = sim.drone() else {
                    return Notice::error("no drone");
                };
                let level = drone
                    .snapshot::<BatteryInfo>()
                    .map_or(0, |battery| battery.level)
                    .saturating_add_signed(delta)
                    .min(100);
                report(
                    sim.set_battery(drone.uid(), level),
                    &format!("drone battery {level}%"),
                    "drone has no battery",
                )
            }
            SimAction::TogglePiloting => {
                let Some(drone) = sim.drone() else {
                    return Notice::error("no drone");
                };
                let available = !self.piloting_available;
                if !sim.set_piloting_available(drone.uid(), available) {
                    return Notice::error("drone has no piloting interface");
                }
                self.piloting_available = available;
                Notice::info(if available {
                    "piloting available"
                } else {
                    "piloting unavailable"
                })
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let [content, tabs, status] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        self.component.render(frame, content);
        self.render_tab_bar(frame, tabs);
        self.render_status_bar(frame, status);

        if self.help_visible {
            self.render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let active = self.screen.kind();
        let titles: Vec<Line> = screen::ALL
            .iter()
            .map(|&kind| {
                let style = if kind == active {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(format!(" {} {} ", kind.number(), kind.label()), style))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(screen::ALL.iter().position(|&kind| kind == active).unwrap_or(0));
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let drone = match self.sim.drone() {
            Some(drone) if drone.is_connected() => {
                Span::styled(format!("● {}", drone.name()), Style::default().fg(theme::SUCCESS_GREEN))
            }
            Some(drone) => Span::styled(format!("○ {}", drone.name()), Style::default().fg(theme::ELECTRIC_YELLOW)),
            None => Span::styled("○ no drone", Style::default().fg(theme::ERROR_RED)),
        };
        let message = match &self.notice {
            Some(notice) => Span::styled(format!(" │ {}", notice.message), theme::notice(notice.error)),
            None => Span::styled(" │ ? help  q quit", theme::key_hint()),
        };
        frame.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), drone, message])), area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let screen_keys = self.component.key_hints();
        let lines = 8 + GLOBAL_KEYS.len() + SIM_KEYS.len() + screen_keys.len();
        let width = 60u16.min(area.width.saturating_sub(4));
        let height = u16::try_from(lines).unwrap_or(u16::MAX).min(area.height.saturating_sub(2));
        let help_area = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, help_area);
        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let mut text = Vec::with_capacity(lines);
        for (title, keys) in [
            ("Global", GLOBAL_KEYS),
            ("Simulator", SIM_KEYS),
            (self.screen.kind().label(), screen_keys),
        ] {
            text.push(Line::from(Span::styled(format!("  {title}"), Style::default().fg(theme::NEON_CYAN))));
            for &(key, about) in keys {
                text.push(Line::from(vec![
                    Span::styled(format!("  {key:<12}"), theme::key_hint_key()),
                    Span::styled(about, theme::key_hint()),
                ]));
            }
            text.push(Line::from(""));
        }
        text.push(Line::from(Span::styled("  Esc or ? to close", theme::key_hint())));
        frame.render_widget(Paragraph::new(text), inner);
    }
}

/// Next published view, or pending forever once the screen is gone.
async fn next_view(views: &mut Option<ViewReceiver>) -> Option<ScreenView> {
    let Some(receiver) = views.as_mut() else {
        return std::future::pending().await;
    };
    if receiver.changed().await.is_err() {
        *views = None;
        return None;
    }
    Some(receiver.current())
}

fn describe(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Sent { command } => format!("sent {}", command.name()),
        Outcome::Opened { uid } => format!("opened {uid}"),
        Outcome::Closed { uid } => format!("closed {uid}"),
        Outcome::Skipped { what } => format!("{what} not supported"),
        Outcome::Unavailable => "unavailable".into(),
    }
}

fn report(applied: bool, done: &str, missing: &str) -> Notice {
    if applied {
        Notice::info(done)
    } else {
        Notice::error(missing)
    }
}

fn next_model(model: DroneModel) -> DroneModel {
    match model {
        DroneModel::Explorer => DroneModel::ExplorerThermal,
        DroneModel::ExplorerThermal => DroneModel::Voyager,
        DroneModel::Voyager => DroneModel::Explorer,
    }
}
