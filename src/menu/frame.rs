//! Navigation frames and the read-only view handed to the display.
//!
//! A frame is one level of the navigation stack: either a menu node from
//! the parsed tree or a file selector with its current directory listing.
//! Row 0 of every frame is the title row, which doubles as the "back"
//! entry; the rows below it are the entries (or files) themselves.
//!
//! Scrolling keeps the selected row inside the display window. The window
//! pivots around the third visible row while moving through the middle of
//! a long list and pins to the ends otherwise, with slightly different
//! pivots for the two movement directions so the row ahead of the cursor
//! stays visible.

use alloc::vec::Vec;

use crate::config::{FileSelector, MenuNode};
use crate::ports::DirEntry;
use crate::vars::Variables;

/// Rows the display window shows at once, the title row included.
pub const VISIBLE_ROWS: usize = 5;

/// One level of the navigation stack.
#[derive(Debug)]
pub(super) enum Frame<'cfg> {
    /// A menu node from the tree
    Menu {
        node: &'cfg MenuNode,
        selected: usize,
        scroll: usize,
    },

    /// A file selector with the listing it is browsing
    Files {
        fsel: &'cfg FileSelector,
        listing: Vec<DirEntry>,
        selected: usize,
        scroll: usize,
    },
}

impl<'cfg> Frame<'cfg> {
    /// Fresh frame for a menu node, resting on the first entry.
    pub(super) fn menu(node: &'cfg MenuNode) -> Self {
        Frame::Menu {
            node,
            selected: 1,
            scroll: 0,
        }
    }

    /// Total row count, the title row included.
    pub(super) fn rows(&self) -> usize {
        match self {
            Frame::Menu { node, .. } => node.entries.len() + 1,
            Frame::Files { listing, .. } => listing.len() + 1,
        }
    }

    pub(super) fn selected(&self) -> usize {
        match self {
            Frame::Menu { selected, .. } | Frame::Files { selected, .. } => *selected,
        }
    }

    pub(super) fn set_selection(&mut self, new_selected: usize, new_scroll: usize) {
        match self {
            Frame::Menu {
                selected, scroll, ..
            }
            | Frame::Files {
                selected, scroll, ..
            } => {
                *selected = new_selected;
                *scroll = new_scroll;
            }
        }
    }
}

/// What the display should show right now.
///
/// Borrowed from the navigation state; hosts render the title row followed
/// by up to [`VISIBLE_ROWS`]` - 1` rows starting at the scroll offset. For
/// list entries the current value is looked up through the supplied
/// variable table.
#[derive(Debug)]
pub enum View<'v> {
    /// A menu level
    Menu {
        /// Node being shown
        menu: &'v MenuNode,
        /// Variable table for rendering list values
        vars: &'v Variables,
        /// Whether this is the bottom of the stack, which has no back row
        is_root: bool,
        /// Selected row, 0 being the title row
        selected: usize,
        /// First entry row in view
        scroll: usize,
    },

    /// A file selector level
    Files {
        /// Selector label for the title row
        label: &'v str,
        /// Directory listing being browsed
        listing: &'v [DirEntry],
        /// Drive the selector operates on
        drive: u8,
        /// Selected row, 0 being the title row
        selected: usize,
        /// First listing row in view
        scroll: usize,
    },
}

impl View<'_> {
    /// Title row text.
    pub fn title(&self) -> &str {
        match self {
            View::Menu { menu, .. } => &menu.label,
            View::Files { label, .. } => label,
        }
    }

    /// Total row count, the title row included.
    pub fn rows(&self) -> usize {
        match self {
            View::Menu { menu, .. } => menu.entries.len() + 1,
            View::Files { listing, .. } => listing.len() + 1,
        }
    }

    /// Selected row.
    pub fn selected(&self) -> usize {
        match self {
            View::Menu { selected, .. } | View::Files { selected, .. } => *selected,
        }
    }

    /// First content row in view.
    pub fn scroll(&self) -> usize {
        match self {
            View::Menu { scroll, .. } | View::Files { scroll, .. } => *scroll,
        }
    }
}

/// Scroll offset keeping `selected` visible after moving down.
///
/// Also used to center a preselected row when a frame is entered with the
/// selection already placed, such as on a mounted image or the directory
/// just left.
pub(super) fn scroll_forward(selected: usize, rows: usize) -> usize {
    if rows <= VISIBLE_ROWS {
        return 0;
    }
    if selected <= 3 {
        return 0;
    }
    if selected < rows - 2 {
        return selected - 3;
    }
    rows - VISIBLE_ROWS
}

/// Scroll offset keeping `selected` visible after moving up.
pub(super) fn scroll_backward(selected: usize, rows: usize) -> usize {
    if rows <= VISIBLE_ROWS {
        return 0;
    }
    if selected <= 2 {
        return 0;
    }
    if selected < rows - 3 {
        return selected - 2;
    }
    rows - VISIBLE_ROWS
}
