//! Interactive session state machine.
//!
//! `MenuController` consumes line-buffered terminal input, emits prompts,
//! and drives the single- and multi-sensor ID-change workflows against the
//! sensor registry. Every invalid operator input is recovered locally with a
//! corrective message and a re-prompt; there is no error-terminal state. A
//! global `reset` command is honored from any state and returns the session
//! to the idle status view with all selection state cleared.

use crate::config::ConsoleConfig;
use crate::error::SelectionError;
use crate::io::CharIo;
use crate::sensor::registry::SensorRegistry;
use crate::sensor::{table, IdStore, SensorBus, MAX_SENSORS};
use core::fmt::Write as _;
use core::marker::PhantomData;

// Sub-modules
pub mod line;
pub mod parser;

// Re-export key types
pub use line::{LineCollector, LineEvent};
pub use parser::parse_sensor_indices;

/// Compile-time capacity of the input line buffer. The effective per-line
/// limit is `ConsoleConfig::MAX_INPUT`, clamped to this.
const INPUT_CAPACITY: usize = 64;

/// Session state of the interactive protocol.
///
/// The menu states fan out from `Normal` (idle status view) through the
/// top-level and ID menus into the three-step ID-change workflow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Idle; periodic status display, waiting for `menu`.
    Normal,

    /// Top-level menu.
    Menu,

    /// ID-management sub-menu.
    SensorIdMenu,

    /// Waiting for sensor number(s) to change.
    SelectSensor,

    /// Waiting for y/n/c on the current selection.
    ConfirmSensor,

    /// Waiting for the new logical ID of the current selection.
    InputId,
}

/// One entry of the operator's selection, resolved at selection time.
///
/// The physical slot is captured when the operator picks against the table
/// they are looking at; later commits re-sort the display rows, so display
/// numbers must not be re-resolved mid-workflow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct SelectedSensor {
    /// 1-based row number in the table the operator selected from.
    display: u8,
    /// Physical bus slot backing that row.
    slot: usize,
}

/// What comes after the current selection entry.
enum NextSelection {
    Next(u8),
    Done,
    /// Cursor not found in the selection list; session invariant broken.
    Corrupt,
}

#[derive(Debug)]
struct Session {
    state: AppState,
    selected: heapless::Vec<SelectedSensor, MAX_SENSORS>,
    /// Display number currently being confirmed / re-ID'd.
    cursor: Option<u8>,
    multi: bool,
}

impl Session {
    fn new() -> Self {
        Self {
            state: AppState::Normal,
            selected: heapless::Vec::new(),
            cursor: None,
            multi: false,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn clear_selection(&mut self) {
        self.selected.clear();
        self.cursor = None;
    }

    fn current(&self) -> Option<SelectedSensor> {
        let cursor = self.cursor?;
        self.selected.iter().copied().find(|s| s.display == cursor)
    }

    fn next_after_cursor(&self) -> NextSelection {
        let Some(cursor) = self.cursor else {
            return NextSelection::Corrupt;
        };
        let Some(pos) = self.selected.iter().position(|s| s.display == cursor) else {
            return NextSelection::Corrupt;
        };
        match self.selected.get(pos + 1) {
            Some(next) => NextSelection::Next(next.display),
            None => NextSelection::Done,
        }
    }
}

/// Line-oriented menu controller over a sensor registry.
///
/// Generic over the injected bus (`B`), ID storage (`S`), console transport
/// (`IO`) and compile-time configuration (`C`). All I/O fallibility is the
/// transport's error type; registry faults never abort a workflow.
pub struct MenuController<B, S, IO, C>
where
    B: SensorBus,
    S: IdStore,
    IO: CharIo,
    C: ConsoleConfig,
{
    registry: SensorRegistry<B, S>,
    session: Session,
    collector: LineCollector<INPUT_CAPACITY>,
    io: IO,
    _config: PhantomData<C>,
}

impl<B, S, IO, C> core::fmt::Debug for MenuController<B, S, IO, C>
where
    B: SensorBus,
    S: IdStore,
    IO: CharIo,
    C: ConsoleConfig,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MenuController")
            .field("state", &self.session.state)
            .field("multi", &self.session.multi)
            .field("cursor", &self.session.cursor)
            .finish_non_exhaustive()
    }
}

impl<B, S, IO, C> MenuController<B, S, IO, C>
where
    B: SensorBus,
    S: IdStore,
    IO: CharIo,
    C: ConsoleConfig,
{
    /// Create a controller in the `Normal` state. No output is emitted until
    /// the first input or `render_status()` call.
    pub fn new(registry: SensorRegistry<B, S>, io: IO) -> Self {
        Self {
            registry,
            session: Session::new(),
            collector: LineCollector::new(C::MAX_INPUT),
            io,
            _config: PhantomData,
        }
    }

    // ========================================================================
    // Entry points for the host poll loop
    // ========================================================================

    /// Process pending input within this tick's budget.
    ///
    /// Consumes at most `C::CHAR_BUDGET` characters and dispatches at most
    /// one completed line, then returns. Unread characters stay queued in
    /// the transport for the next tick; a partially typed line waits in the
    /// collector. Never blocks.
    pub fn on_tick(&mut self) -> Result<(), IO::Error> {
        for _ in 0..C::CHAR_BUDGET {
            let Some(c) = self.io.get_char()? else {
                break;
            };
            if self.process_char(c)? {
                break;
            }
        }
        Ok(())
    }

    /// Feed a single character (for interrupt- or queue-driven hosts that
    /// control their own read loop). Returns `Ok(true)` when the character
    /// completed a line and a command was dispatched.
    pub fn process_char(&mut self, c: char) -> Result<bool, IO::Error> {
        match self.collector.push_char(c) {
            LineEvent::None => Ok(false),
            LineEvent::Overflow => {
                self.io
                    .write_line("input too long, discarded; please retype")?;
                Ok(false)
            }
            LineEvent::Completed => {
                let input = self.collector.take();
                self.dispatch(input.as_str())?;
                Ok(true)
            }
        }
    }

    /// Force an immediate status render: refresh the snapshot, write the
    /// table and the menu hint footer.
    pub fn render_status(&mut self) -> Result<(), IO::Error> {
        self.print_table()?;
        self.io.write_line("Type 'menu' or 'm' for the control menu.")
    }

    // ========================================================================
    // Accessors (diagnostics / testing)
    // ========================================================================

    /// Current protocol state.
    pub fn state(&self) -> AppState {
        self.session.state
    }

    /// Whether the active workflow processes multiple sensors sequentially.
    pub fn is_multi_select(&self) -> bool {
        self.session.multi
    }

    /// Display numbers of the current selection, in operator order.
    pub fn selected_indices(&self) -> heapless::Vec<u8, MAX_SENSORS> {
        self.session.selected.iter().map(|s| s.display).collect()
    }

    /// Display number currently being confirmed / re-ID'd.
    pub fn current_display(&self) -> Option<u8> {
        self.session.cursor
    }

    /// Shared access to the registry.
    pub fn registry(&self) -> &SensorRegistry<B, S> {
        &self.registry
    }

    /// Mutable access to the registry.
    pub fn registry_mut(&mut self) -> &mut SensorRegistry<B, S> {
        &mut self.registry
    }

    /// Shared access to the transport.
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Mutable access to the transport.
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn dispatch(&mut self, input: &str) -> Result<(), IO::Error> {
        // Global override, honored from any state.
        if input.eq_ignore_ascii_case("reset") {
            return self.full_reset();
        }

        match self.session.state {
            AppState::Normal => self.handle_normal(input),
            AppState::Menu => self.handle_menu(input),
            AppState::SensorIdMenu => self.handle_sensor_id_menu(input),
            AppState::SelectSensor => self.handle_select_sensor(input),
            AppState::ConfirmSensor => self.handle_confirm_sensor(input),
            AppState::InputId => self.handle_input_id(input),
        }
    }

    /// Full reset: session back to `Normal` with all fields cleared, any
    /// partial input dropped, status view re-rendered.
    fn full_reset(&mut self) -> Result<(), IO::Error> {
        self.session.reset();
        self.collector.reset();
        self.render_status()
    }

    // ========================================================================
    // State handlers
    // ========================================================================

    fn handle_normal(&mut self, input: &str) -> Result<(), IO::Error> {
        if input.eq_ignore_ascii_case("menu") || input.eq_ignore_ascii_case("m") {
            self.session.state = AppState::Menu;
            self.print_menu()
        } else if input.eq_ignore_ascii_case("r") {
            self.full_reset()
        } else {
            // stray input in the status view is ignored
            Ok(())
        }
    }

    fn handle_menu(&mut self, input: &str) -> Result<(), IO::Error> {
        match input {
            "1" => {
                self.session.state = AppState::SensorIdMenu;
                self.print_sensor_id_menu()
            }
            "2" => {
                self.io
                    .write_line("[threshold adjustment is not implemented yet]")?;
                self.print_menu()
            }
            "3" => {
                self.session.state = AppState::Normal;
                self.render_status()
            }
            _ => {
                self.io.write_line("unknown option, choose 1-3")?;
                self.print_menu()
            }
        }
    }

    fn handle_sensor_id_menu(&mut self, input: &str) -> Result<(), IO::Error> {
        match input {
            "1" => {
                self.session.multi = false;
                self.enter_select()
            }
            "2" => {
                self.session.multi = true;
                self.enter_select()
            }
            "3" => {
                self.registry.refresh_snapshot();
                let (assigned, failures) = self.registry.assign_ids_by_address();
                let mut msg: heapless::String<64> = heapless::String::new();
                let _ = write!(msg, "assigned IDs 1-{} in address order", assigned);
                self.io.write_line(msg.as_str())?;
                self.report_write_failures(failures)?;
                self.print_table()?;
                self.print_sensor_id_menu()
            }
            "4" => {
                self.registry.refresh_snapshot();
                let (assigned, failures) = self.registry.reset_ids_to_default();
                let mut msg: heapless::String<64> = heapless::String::new();
                let _ = write!(msg, "reset {} sensor IDs to defaults", assigned);
                self.io.write_line(msg.as_str())?;
                self.report_write_failures(failures)?;
                self.print_table()?;
                self.print_sensor_id_menu()
            }
            "5" => {
                self.session.state = AppState::Menu;
                self.print_menu()
            }
            "6" => {
                self.session.state = AppState::Normal;
                self.render_status()
            }
            _ => {
                self.io.write_line("unknown option, choose 1-6")?;
                self.print_sensor_id_menu()
            }
        }
    }

    fn handle_select_sensor(&mut self, input: &str) -> Result<(), IO::Error> {
        if is_cancel(input) {
            return self.end_workflow();
        }

        // Selection must be validated against current connectivity.
        self.registry.refresh_snapshot();
        match self.validate_selection(input) {
            Ok(selection) => {
                let first = selection[0].display;
                self.session.selected = selection;
                self.session.cursor = Some(first);
                self.session.state = AppState::ConfirmSensor;
                self.prompt_confirm(first)
            }
            Err(e) => {
                let mut msg: heapless::String<64> = heapless::String::new();
                let _ = write!(msg, "error: {}", e);
                self.io.write_line(msg.as_str())?;
                self.prompt_select()
            }
        }
    }

    fn handle_confirm_sensor(&mut self, input: &str) -> Result<(), IO::Error> {
        let Some(current) = self.session.current() else {
            return self.defensive_reset();
        };

        if input.eq_ignore_ascii_case("y") {
            self.session.state = AppState::InputId;
            self.prompt_new_id(current.display)
        } else if input.eq_ignore_ascii_case("n") {
            if self.session.multi {
                self.advance_or_finish()
            } else {
                self.session.clear_selection();
                self.session.state = AppState::SelectSensor;
                self.prompt_select()
            }
        } else if is_cancel(input) {
            if self.session.multi {
                self.advance_or_finish()
            } else {
                self.end_workflow()
            }
        } else {
            self.io.write_line("enter y (yes), n (no) or c (cancel)")?;
            self.prompt_confirm(current.display)
        }
    }

    fn handle_input_id(&mut self, input: &str) -> Result<(), IO::Error> {
        let Some(current) = self.session.current() else {
            return self.defensive_reset();
        };

        if is_cancel(input) {
            if self.session.multi {
                let mut msg: heapless::String<48> = heapless::String::new();
                let _ = write!(msg, "sensor {} skipped", current.display);
                self.io.write_line(msg.as_str())?;
                return self.advance_or_finish();
            }
            return self.end_workflow();
        }

        match input.parse::<u8>() {
            Ok(id) if (1..=MAX_SENSORS as u8).contains(&id) => {
                if self.registry.is_id_duplicated(id, current.slot) {
                    self.io
                        .write_line("error: ID already used by another connected sensor")?;
                    return self.prompt_new_id(current.display);
                }
                self.commit_id(current, id)
            }
            _ => {
                self.io
                    .write_line("error: ID must be a number from 1 to 8")?;
                self.prompt_new_id(current.display)
            }
        }
    }

    // ========================================================================
    // Workflow plumbing
    // ========================================================================

    fn commit_id(&mut self, current: SelectedSensor, id: u8) -> Result<(), IO::Error> {
        let verify = self.registry.set_logical_id(current.slot, id);

        let mut msg: heapless::String<64> = heapless::String::new();
        let _ = write!(msg, "sensor {} ID set to {} (saved)", current.display, id);
        self.io.write_line(msg.as_str())?;

        // Best-effort storage: a verify mismatch is diagnostic only.
        if let Err(e) = verify {
            let mut warn: heapless::String<80> = heapless::String::new();
            let _ = write!(warn, "warning: {}", e);
            self.io.write_line(warn.as_str())?;
        }

        if self.session.multi {
            self.advance_or_finish()
        } else {
            // Single mode keeps the operator on the select prompt so several
            // sensors can be renumbered one by one.
            self.session.clear_selection();
            self.session.state = AppState::SelectSensor;
            self.print_table()?;
            self.prompt_select()
        }
    }

    fn advance_or_finish(&mut self) -> Result<(), IO::Error> {
        match self.session.next_after_cursor() {
            NextSelection::Next(display) => {
                self.session.cursor = Some(display);
                self.session.state = AppState::ConfirmSensor;
                self.prompt_confirm(display)
            }
            NextSelection::Done => {
                self.io.write_line("selection complete")?;
                self.end_workflow()
            }
            NextSelection::Corrupt => self.defensive_reset(),
        }
    }

    /// Leave the ID-change workflow: selection cleared, back to the sub-menu.
    fn end_workflow(&mut self) -> Result<(), IO::Error> {
        self.session.clear_selection();
        self.session.multi = false;
        self.session.state = AppState::SensorIdMenu;
        self.print_sensor_id_menu()
    }

    /// Session invariants no longer hold; reset rather than guess.
    fn defensive_reset(&mut self) -> Result<(), IO::Error> {
        self.io
            .write_line("warning: session state inconsistent, resetting")?;
        self.full_reset()
    }

    fn validate_selection(
        &mut self,
        input: &str,
    ) -> Result<heapless::Vec<SelectedSensor, MAX_SENSORS>, SelectionError> {
        let indices = parse_sensor_indices(input);
        if indices.is_empty() {
            return Err(SelectionError::Empty);
        }

        let rows = self.registry.sorted_rows();
        let mut selection: heapless::Vec<SelectedSensor, MAX_SENSORS> = heapless::Vec::new();
        let mut rejected: heapless::Vec<u8, MAX_SENSORS> = heapless::Vec::new();
        for &display in indices.iter() {
            let row = &rows[display as usize - 1];
            if row.connected {
                let _ = selection.push(SelectedSensor {
                    display,
                    slot: row.physical_index,
                });
            } else {
                let _ = rejected.push(display);
            }
        }

        if !rejected.is_empty() {
            return Err(SelectionError::NotConnected(rejected));
        }
        Ok(selection)
    }

    fn report_write_failures(&mut self, failures: usize) -> Result<(), IO::Error> {
        if failures > 0 {
            let mut warn: heapless::String<64> = heapless::String::new();
            let _ = write!(warn, "warning: {} ID writes failed verification", failures);
            self.io.write_line(warn.as_str())?;
        }
        Ok(())
    }

    // ========================================================================
    // Prompts and banners
    // ========================================================================

    fn print_table(&mut self) -> Result<(), IO::Error> {
        self.registry.refresh_snapshot();
        table::write_status_table::<IO, C>(&mut self.io, self.registry.sorted_rows())
    }

    fn print_menu(&mut self) -> Result<(), IO::Error> {
        self.io.write_line("")?;
        self.io.write_line("===== Sensor Control Menu =====")?;
        self.io.write_line("1. Sensor ID management")?;
        self.io.write_line("2. Temperature thresholds")?;
        self.io.write_line("3. Back to status view")?;
        self.io.write_str("Select an option: ")
    }

    fn print_sensor_id_menu(&mut self) -> Result<(), IO::Error> {
        self.io.write_line("")?;
        self.io.write_line("--- Sensor ID Menu ---")?;
        self.io.write_line("1. Change one sensor ID")?;
        self.io.write_line("2. Change multiple sensor IDs")?;
        self.io.write_line("3. Auto-assign IDs by address")?;
        self.io.write_line("4. Reset all IDs to defaults")?;
        self.io.write_line("5. Previous menu")?;
        self.io.write_line("6. Back to status view")?;
        self.io.write_str("Select an option: ")
    }

    fn enter_select(&mut self) -> Result<(), IO::Error> {
        self.session.clear_selection();
        self.session.state = AppState::SelectSensor;
        if self.session.multi {
            self.io.write_line("[multi sensor ID change] current sensors:")?;
        } else {
            self.io.write_line("[single sensor ID change] current sensors:")?;
        }
        self.print_table()?;
        self.prompt_select()
    }

    fn prompt_select(&mut self) -> Result<(), IO::Error> {
        if self.session.multi {
            self.io
                .write_str("Sensor numbers to change (1-8, space/comma separated, c=cancel): ")
        } else {
            self.io.write_str("Sensor number to change (1-8, c=cancel): ")
        }
    }

    fn prompt_confirm(&mut self, display: u8) -> Result<(), IO::Error> {
        let mut msg: heapless::String<48> = heapless::String::new();
        let _ = write!(msg, "Change sensor {}? (y/n, c=cancel): ", display);
        self.io.write_str(msg.as_str())
    }

    fn prompt_new_id(&mut self, display: u8) -> Result<(), IO::Error> {
        let mut msg: heapless::String<48> = heapless::String::new();
        let _ = write!(msg, "New ID for sensor {} (1-8, c=cancel): ", display);
        self.io.write_str(msg.as_str())
    }
}

fn is_cancel(input: &str) -> bool {
    input.eq_ignore_ascii_case("c")
}
