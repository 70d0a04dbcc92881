//! Stack-based menu navigation.
//!
//! The engine walks the menu tree of a parsed document. Each level of
//! nesting is a frame on a fixed-depth stack: entering a submenu or file
//! selector pushes, selecting the title row pops. The bottom frame is the
//! root menu and never leaves the stack.
//!
//! Input events move the selection, with single steps wrapping around the
//! ends and page steps stopping there, or activate the selected row:
//! submenus open, buttons fire their action, lists cycle to their next
//! value, file selectors browse the storage and mount images. The display
//! is redrawn through the [`Osd`] port after every event.

mod actions;
mod frame;

pub use frame::{VISIBLE_ROWS, View};

use alloc::string::ToString;

use frame::{Frame, scroll_backward, scroll_forward};

use crate::config::{Config, FileSelector, List, MenuEntry};
use crate::ports::{DirEntry, Osd, RegisterBus, Settings, Storage, Ticker};
use crate::vars::{VarStore, Variables};

/// Deepest the navigation stack goes; submenus beyond it are refused.
const MENU_STACK_DEPTH: usize = 8;

/// Input events fed in by the host.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// Bring the display up
    Show,

    /// Take the display down
    Hide,

    /// Move the selection up one row
    Up,

    /// Move the selection down one row
    Down,

    /// Move the selection up one page
    PageUp,

    /// Move the selection down one page
    PageDown,

    /// Activate the selected row
    Select,
}

/// The navigation engine.
///
/// Owns the variable table and the collaborator ports; borrows the parsed
/// document for its whole lifetime. Building it seeds the variable table
/// and pushes the root menu; [`Menu::start`] then runs the conventional
/// startup actions.
///
/// # Examples
///
/// ```rust,ignore
/// let config = Config::parse(SliceSource::new(document));
/// let mut menu = Menu::new(&config, bus, storage, settings, osd, ticker);
/// menu.start();
/// menu.handle_event(Event::Show);
/// ```
pub struct Menu<'cfg, S, D, P, O, T>
where
    S: RegisterBus,
    D: Storage,
    P: Settings,
    O: Osd,
    T: Ticker,
{
    /// Parsed document being navigated
    cfg: &'cfg Config,

    /// Variable table seeded from the document
    vars: Variables,

    /// Navigation stack, root menu at the bottom
    frames: heapless::Vec<Frame<'cfg>, MENU_STACK_DEPTH>,

    /// Register bus of the target
    sys: S,

    /// Mass storage for the file selectors
    storage: D,

    /// Settings persistence backend
    settings: P,

    /// Display the menu is drawn on
    osd: O,

    /// Time source for delay commands
    ticker: T,
}

impl<'cfg, S, D, P, O, T> Menu<'cfg, S, D, P, O, T>
where
    S: RegisterBus,
    D: Storage,
    P: Settings,
    O: Osd,
    T: Ticker,
{
    /// Build the engine for a parsed document.
    ///
    /// Seeds the variable table, pushing list defaults to the register
    /// bus, and places the root menu on the navigation stack.
    pub fn new(cfg: &'cfg Config, mut sys: S, storage: D, settings: P, osd: O, ticker: T) -> Self {
        let vars = Variables::from_config(cfg, &mut sys);
        let mut menu = Self {
            cfg,
            vars,
            frames: heapless::Vec::new(),
            sys,
            storage,
            settings,
            osd,
            ticker,
        };
        menu.push_frame(Frame::menu(&cfg.menu));
        menu
    }

    /// Run the conventional startup actions.
    ///
    /// `"init"` is meant to run before the host releases the core from
    /// reset and `"ready"` after; either may be absent.
    pub fn start(&mut self) {
        self.run_action_by_name("init");
        self.run_action_by_name("ready");
    }

    /// Feed one input event and redraw.
    pub fn handle_event(&mut self, event: Event) {
        log::debug!("event {:?}", event);

        match event {
            Event::Show => self.osd.set_visible(true),
            Event::Hide => self.osd.set_visible(false),
            Event::Up => self.move_selection(-1),
            Event::Down => self.move_selection(1),
            Event::PageUp => self.move_selection(-4),
            Event::PageDown => self.move_selection(4),
            Event::Select => self.select(),
        }

        self.redraw();
    }

    /// Current display content.
    pub fn view(&self) -> View<'_> {
        make_view(self.cfg, &self.frames, &self.vars)
    }

    fn redraw(&mut self) {
        let view = make_view(self.cfg, &self.frames, &self.vars);
        self.osd.draw(&view);
    }

    /// Move the selection by `step` rows within the top frame.
    ///
    /// Single steps wrap around the ends; page steps stop at the first
    /// and last row and turn inward. Runs until the selection comes to
    /// rest on a selectable row, skipping the title row of the root menu.
    fn move_selection(&mut self, step: i32) {
        let is_root = self.frames.len() == 1;
        let Some(frame) = self.frames.last_mut() else {
            return;
        };

        let rows = frame.rows() as i32;
        if is_root && rows <= 1 {
            return;
        }

        let mut selected = frame.selected() as i32;
        let mut step = step;

        loop {
            selected += step;

            if step.abs() == 1 {
                if selected < 0 {
                    selected += rows;
                }
                if selected >= rows {
                    selected -= rows;
                }
            } else {
                if selected < 1 {
                    selected = 1;
                    step = 1;
                }
                if selected >= rows {
                    selected = rows - 1;
                    step = -1;
                }
            }

            let scroll = if step > 0 {
                scroll_forward(selected as usize, rows as usize)
            } else {
                scroll_backward(selected as usize, rows as usize)
            };
            frame.set_selection(selected as usize, scroll);

            // the title row of the root menu is not selectable
            if !is_root || selected != 0 {
                break;
            }
        }
    }

    /// Activate the selected row of the top frame.
    fn select(&mut self) {
        match self.frames.last() {
            Some(Frame::Menu { node, selected, .. }) => {
                let node = *node;
                let selected = *selected;

                if selected == 0 {
                    self.pop_frame();
                    return;
                }
                let Some(entry) = node.entries.get(selected - 1) else {
                    return;
                };

                log::debug!("selected {} '{}'", entry.kind_str(), entry.label());
                match entry {
                    MenuEntry::Submenu(sub) => self.push_frame(Frame::menu(sub)),
                    MenuEntry::Files(fsel) => self.open_file_selector(fsel),
                    MenuEntry::List(list) => self.select_list(list),
                    MenuEntry::Button(button) => {
                        if let Some(action) = &button.action {
                            self.run_action_by_name(action);
                        }
                    }
                }
            }

            Some(Frame::Files {
                fsel,
                listing,
                selected,
                ..
            }) => {
                let fsel = *fsel;
                let selected = *selected;

                if selected == 0 {
                    self.pop_frame();
                    return;
                }
                let Some(entry) = listing.get(selected - 1).cloned() else {
                    return;
                };

                self.file_selector_select(fsel, entry);
            }

            None => {}
        }
    }

    /// Cycle a list to the value after the current one, wrapping past the
    /// last entry, and run its bound action.
    ///
    /// A current value matching no entry restarts at the first one.
    fn select_list(&mut self, list: &'cfg List) {
        if list.entries.is_empty() {
            return;
        }

        let current = self.vars.get(list.id);
        let next = list
            .entries
            .iter()
            .position(|entry| entry.value == current)
            .map_or(0, |i| (i + 1) % list.entries.len());

        self.vars
            .bind(&mut self.sys)
            .set(list.id, list.entries[next].value);

        if let Some(action) = &list.action {
            self.run_action_by_name(action);
        }
    }

    /// Enter a file selector on its drive's current directory.
    ///
    /// If the image mounted on the drive appears in the listing the
    /// selection is placed on it.
    fn open_file_selector(&mut self, fsel: &'cfg FileSelector) {
        log::debug!("fileselector '{}', drive {}", fsel.label, fsel.drive);
        let listing = self.storage.read_dir(fsel.drive, None, &fsel.ext);

        let mut selected = 1;
        let mut scroll = 0;
        if let Some(name) = self.storage.image_name(fsel.drive) {
            if let Some(i) = listing.iter().position(|entry| entry.name == name) {
                selected = i + 1;
                scroll = scroll_forward(selected, listing.len() + 1);
            }
        }

        self.push_frame(Frame::Files {
            fsel,
            listing,
            selected,
            scroll,
        });
    }

    /// Act on a file selector row: eject, enter a directory, or mount.
    fn file_selector_select(&mut self, fsel: &'cfg FileSelector, entry: DirEntry) {
        log::debug!("drive {}: selected '{}'", fsel.drive, entry.name);

        if entry.is_eject() {
            self.pop_frame();
            self.storage.image_open(fsel.drive, None);
            return;
        }

        if entry.is_dir {
            // when going up, remember the directory being left so the
            // selection can be put back on it
            let mut preselect = None;
            if entry.is_parent() {
                let cwd = self.storage.cwd(fsel.drive);
                preselect = cwd
                    .rfind('/')
                    .map(|i| cwd[i + 1..].to_string())
                    .filter(|prev| !prev.is_empty());
            }

            let listing = self.storage.read_dir(fsel.drive, Some(&entry.name), &fsel.ext);

            let mut selected = 1;
            let mut scroll = 0;
            if let Some(prev) = preselect {
                if let Some(i) = listing
                    .iter()
                    .position(|row| row.is_dir && row.name == prev)
                {
                    selected = i + 1;
                    scroll = scroll_forward(selected, listing.len() + 1);
                }
            }

            if let Some(Frame::Files {
                listing: rows,
                selected: sel,
                scroll: off,
                ..
            }) = self.frames.last_mut()
            {
                *rows = listing;
                *sel = selected;
                *off = scroll;
            }
            return;
        }

        self.storage.image_open(fsel.drive, Some(&entry.name));
        self.pop_frame();
    }

    fn push_frame(&mut self, frame: Frame<'cfg>) {
        if self.frames.push(frame).is_err() {
            log::warn!("menu: nested deeper than {} levels, not entering", MENU_STACK_DEPTH);
        }
    }

    /// Drop the top frame; the root menu stays put.
    fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    #[cfg(test)]
    fn selection(&self) -> (usize, usize) {
        match self.frames.last() {
            Some(
                Frame::Menu {
                    selected, scroll, ..
                }
                | Frame::Files {
                    selected, scroll, ..
                },
            ) => (*selected, *scroll),
            None => (0, 0),
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.frames.len()
    }

    #[cfg(test)]
    fn sys_ref(&self) -> &S {
        &self.sys
    }

    #[cfg(test)]
    fn storage_ref(&self) -> &D {
        &self.storage
    }

    #[cfg(test)]
    fn osd_ref(&self) -> &O {
        &self.osd
    }
}

// ============================================================================
// Debug implementation
// ============================================================================

impl<'cfg, S, D, P, O, T> core::fmt::Debug for Menu<'cfg, S, D, P, O, T>
where
    S: RegisterBus,
    D: Storage,
    P: Settings,
    O: Osd,
    T: Ticker,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Menu")
            .field("config", &self.cfg.name)
            .field("frames", &self.frames)
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

/// Assemble the display view for the top frame.
///
/// A free function over the individual fields so callers holding the
/// engine mutably can still hand the view to the display port.
fn make_view<'v>(
    cfg: &'v Config,
    frames: &'v heapless::Vec<Frame<'_>, MENU_STACK_DEPTH>,
    vars: &'v Variables,
) -> View<'v> {
    match frames.last() {
        Some(Frame::Menu {
            node,
            selected,
            scroll,
        }) => View::Menu {
            menu: node,
            vars,
            is_root: frames.len() == 1,
            selected: *selected,
            scroll: *scroll,
        },

        Some(Frame::Files {
            fsel,
            listing,
            selected,
            scroll,
        }) => View::Files {
            label: &fsel.label,
            listing,
            drive: fsel.drive,
            selected: *selected,
            scroll: *scroll,
        },

        None => View::Menu {
            menu: &cfg.menu,
            vars,
            is_root: true,
            selected: 1,
            scroll: 0,
        },
    }
}
