//! Collaborator interfaces to the surrounding firmware.
//!
//! The engine talks to the rest of the system exclusively through these
//! traits: register writes toward the emulated core, directory listings and
//! image mounting from storage, settings persistence, the menu overlay, and
//! cooperative delays. The engine's only obligation toward the register
//! channel is that writes it issues are atomic and ordered; serialization
//! against other bus users belongs to the implementation.

use alloc::string::String;
use alloc::vec::Vec;

use crate::menu::View;
use crate::vars::VarStore;

/// Register-write channel to the emulated core.
///
/// Carries every `(id, value)` pair produced by variable changes and action
/// commands, in issue order.
pub trait RegisterBus {
    /// Write one core register.
    fn set_value(&mut self, id: char, value: u8);
}

/// One row of a directory listing.
///
/// Listings may start with synthetic rows: `".."` anywhere below the
/// storage root, or the eject row at the root, marked by a reserved `/`
/// name prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File or directory name
    pub name: String,

    /// File size in bytes (0 for directories)
    pub size: u64,

    /// Whether this row names a directory
    pub is_dir: bool,
}

impl DirEntry {
    /// Whether this is the synthetic eject row.
    pub fn is_eject(&self) -> bool {
        self.is_dir && self.name.starts_with('/')
    }

    /// Whether this is the parent-directory row.
    pub fn is_parent(&self) -> bool {
        self.is_dir && self.name == ".."
    }

    /// Name with the eject marker prefix stripped, for display.
    pub fn display_name(&self) -> &str {
        self.name.strip_prefix('/').unwrap_or(&self.name)
    }
}

/// Mass-storage collaborator: directory scans and image mounting.
///
/// The implementation owns the per-drive working directory; `read_dir`
/// with a subdirectory (or `".."`) moves it. Returned listings are
/// snapshots the caller keeps for as long as it needs them.
pub trait Storage {
    /// List the working directory of `drive`, after descending into
    /// `subdir` if given. Files are filtered against the extension list
    /// (ASCII case-insensitive); directories always appear.
    fn read_dir(&mut self, drive: u8, subdir: Option<&str>, exts: &[String]) -> Vec<DirEntry>;

    /// Mount the named image from the working directory, or eject the
    /// current image when `name` is `None`.
    fn image_open(&mut self, drive: u8, name: Option<&str>);

    /// Name of the currently mounted image, if any.
    fn image_name(&self, drive: u8) -> Option<&str>;

    /// Current working directory path of `drive`.
    fn cwd(&self, drive: u8) -> &str;
}

/// Settings-persistence collaborator.
///
/// Reads and writes named settings files. Variable values flow through the
/// [`VarStore`] handle only, so loads push changed values to the core the
/// same way UI changes do.
pub trait Settings {
    /// Error detail for failed loads and saves.
    type Error: core::fmt::Debug;

    /// Read the named settings file (`None` selects the default file) and
    /// apply it through `vars`.
    fn load(&mut self, file: Option<&str>, vars: &mut dyn VarStore) -> Result<(), Self::Error>;

    /// Write current settings to the named file (`None` selects the
    /// default file).
    fn save(&mut self, file: Option<&str>, vars: &dyn VarStore) -> Result<(), Self::Error>;

    /// Restore hard-coded system defaults; the fallback when a load fails.
    fn apply_defaults(&mut self);
}

/// Menu overlay collaborator.
///
/// Rendering is entirely the implementation's concern; the engine only
/// hands over the abstract [`View`] after every event and toggles
/// visibility.
pub trait Osd {
    /// Show or hide the overlay.
    fn set_visible(&mut self, visible: bool);

    /// Draw the current navigation state.
    fn draw(&mut self, view: &View<'_>);
}

/// Cooperative delay collaborator.
///
/// Backs the `delay` action command. Must yield the calling task rather
/// than busy-wait; input events may queue while it runs.
pub trait Ticker {
    /// Suspend the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u16);
}
