use crate::bridge::PushEvent;
use crate::controller::command_types::{ActiveView, Command};
use crate::controller::directories::DirectoryController;
use crate::controller::items::ItemController;
use crate::controller::key_handler::KeyHandler;
use crate::controller::shared_state::{SharedAppState, Transition, ViewController};
use crate::error::AppError;
use crate::cache::LoadState;
use crate::view::markup::{self, EditorMarkup, ListContext, Markup};
use crate::view::{RenderParams, View};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io::{self, stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info};

const TICK: Duration = Duration::from_millis(100);

/// Source of terminal events; swapped out in tests.
pub trait EventSource {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>>;
}

pub struct TerminalEvents;

impl EventSource for TerminalEvents {
    fn poll(&mut self, timeout: Duration) -> io::Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

/// Owns the application state and routes every key press.
pub struct AppController {
    shared: SharedAppState,
    directory_controller: DirectoryController,
    item_controller: ItemController,
    view: Option<View>,
    last_refresh: Instant,
    last_view: ActiveView,
}

impl AppController {
    pub fn new(shared: SharedAppState) -> Self {
        Self {
            last_view: shared.active_view,
            shared,
            directory_controller: DirectoryController::new(),
            item_controller: ItemController::new(),
            view: None,
            last_refresh: Instant::now(),
        }
    }

    #[cfg(test)]
    pub fn shared(&self) -> &SharedAppState {
        &self.shared
    }

    pub fn run(mut self) -> Result<(), AppError> {
        enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        self.view = Some(View::new());

        let result = self.run_loop(&mut TerminalEvents);

        execute!(stdout(), cursor::Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, events: &mut dyn EventSource) -> Result<(), AppError> {
        self.settle()?;
        loop {
            self.render()?;

            match events.poll(TICK)? {
                Some(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                    match self.handle_key(key_event)? {
                        Transition::Stay => {}
                        Transition::Hide => {
                            info!("Window hidden, leaving");
                            break;
                        }
                        Transition::Quit => {
                            info!("Quit requested");
                            break;
                        }
                    }
                }
                Some(Event::Resize(_, _)) => self.shared.redraw_requested = true,
                _ => {}
            }

            self.pump_bridge_events();
            self.poll_if_due(Instant::now());
        }
        Ok(())
    }

    /// Draw the loading state, then run any fetch queued by navigation.
    fn settle(&mut self) -> Result<(), AppError> {
        if self.shared.has_pending_loads() {
            self.render()?;
            self.shared.run_pending_loads();
            self.last_refresh = Instant::now();
        }
        Ok(())
    }

    /// Route one key press through the overlay, the editor, the search field
    /// and finally the active view.
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Result<Transition, AppError> {
        let transition = self.route_key(key_event);
        self.shared.flush_deferred_refresh();
        self.settle()?;
        Ok(transition)
    }

    fn route_key(&mut self, key_event: KeyEvent) -> Transition {
        if KeyHandler::is_quit(&key_event) {
            return Transition::Quit;
        }
        self.shared.status_message.clear();

        if self.shared.overlay.is_some() {
            self.shared.handle_overlay_key(key_event);
            return Transition::Stay;
        }

        if self.shared.editor.is_some() {
            self.shared.handle_editor_key(key_event);
            return Transition::Stay;
        }

        if self.shared.search().is_focused() {
            match KeyHandler::parse_search_key(&key_event) {
                Some(command @ (Command::SearchInput(_) | Command::SearchBackspace)) => {
                    self.shared.search_input(&command);
                }
                Some(Command::MoveUp) => self.shared.move_selection(false),
                Some(Command::MoveDown) => self.shared.move_selection(true),
                Some(Command::Escape) => self.shared.clear_search(),
                Some(Command::Activate) => {
                    self.shared.blur_search();
                    return self.dispatch(key_event);
                }
                _ => {}
            }
            return Transition::Stay;
        }

        if let Some(command) = KeyHandler::search_input(&key_event) {
            self.shared.search_input(&command);
            return Transition::Stay;
        }

        if key_event.code == KeyCode::Esc {
            if self.shared.search().is_active() {
                self.shared.clear_search();
                return Transition::Stay;
            }
            return self.shared.hide();
        }

        self.dispatch(key_event)
    }

    fn dispatch(&mut self, key_event: KeyEvent) -> Transition {
        match self.shared.active_view {
            ActiveView::Directories => self.directory_controller.handle_key(key_event, &mut self.shared),
            ActiveView::Items => self.item_controller.handle_key(key_event, &mut self.shared),
        }
    }

    /// Apply pushed backend events.
    pub fn pump_bridge_events(&mut self) {
        while let Some(event) = self.shared.bridge.try_next_event() {
            debug!(?event, "Backend event");
            match event {
                PushEvent::ClipboardUpdated => {
                    self.shared.refresh_all();
                    self.last_refresh = Instant::now();
                }
                PushEvent::WindowVisible(true) | PushEvent::WindowFocused => {
                    self.shared.redraw_requested = true;
                }
                PushEvent::WindowVisible(false) => {}
            }
        }
    }

    /// Periodic reload for hosts that cannot push clipboard changes.
    fn poll_if_due(&mut self, now: Instant) -> bool {
        if !self.shared.bridge.is_available() || self.shared.bridge.pushes_events() {
            return false;
        }
        let interval = Duration::from_secs(self.shared.config.poll_interval_secs.max(1));
        if now.saturating_duration_since(self.last_refresh) < interval {
            return false;
        }
        self.shared.refresh_all();
        self.last_refresh = now;
        true
    }

    fn render(&mut self) -> Result<(), AppError> {
        let Some(view) = self.view.as_mut() else {
            return Ok(());
        };
        if std::mem::take(&mut self.shared.redraw_requested) {
            view.force_redraw();
        }
        if self.last_view != self.shared.active_view {
            self.last_view = self.shared.active_view;
            view.reset_scroll();
        }

        let markup = build_markup(&self.shared);
        let overlay = self.shared.overlay.as_ref().map(|o| o.lines());
        let params = RenderParams {
            markup: &markup,
            status_message: &self.shared.status_message,
            hints: hints(&self.shared),
            overlay: overlay.as_deref(),
        };
        view.render(&params)?;
        Ok(())
    }
}

fn hints(shared: &SharedAppState) -> &'static str {
    if shared.editor.is_some() {
        return "Enter/Ctrl+S save  Esc cancel";
    }
    match shared.active_view {
        ActiveView::Directories => {
            "Enter open  F2 rename  Del delete  Ctrl+N new folder  type to search  Esc hide"
        }
        ActiveView::Items => {
            "Enter run  Left/Right action  Ctrl+E edit  Ctrl+N new  Alt+Left back  Esc hide"
        }
    }
}

fn list_context<'a>(
    shared: &'a SharedAppState,
    state: &'a LoadState,
    editor: Option<&'a EditorMarkup>,
) -> ListContext<'a> {
    ListContext {
        search: shared.search(),
        selection: shared.selection(),
        state,
        available: shared.bridge.is_available(),
        content_lines: shared.config.content_lines,
        date_format: &shared.config.date_format,
        editor,
    }
}

/// Current screen contents as a pure function of the state.
pub fn build_markup(shared: &SharedAppState) -> Markup {
    let editor = shared.editor.as_ref().map(|e| e.markup());
    match shared.active_view {
        ActiveView::Directories => markup::directories_markup(
            shared.cache.directories(),
            shared.cache.all_items(),
            &list_context(shared, shared.cache.directories_state(), editor.as_ref()),
        ),
        ActiveView::Items => markup::items_markup(
            &shared.title(),
            shared.cache.items(),
            &list_context(shared, shared.cache.items_state(), editor.as_ref()),
        ),
    }
}
