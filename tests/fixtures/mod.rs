//! Test fixtures and utilities for menu engine testing.
//!
//! Provides:
//! - `HostEvent` + `SharedLog`: ordered capture of everything the mock
//!   ports observe
//! - Mock ports: `MockBus`, `MockStorage`, `MockSettings`, `MockOsd`,
//!   `MockTicker`
//! - `ATARI_DOC`: a complete core description exercising the whole grammar
//! - Directory listing builders for the storage mock

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use osd_menu::{DirEntry, Osd, RegisterBus, Settings, Storage, Ticker, VarStore, View};

// ============================================================================
// Shared Event Log
// ============================================================================

/// One observable effect on a mock port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Register write on the bus
    Write(char, u8),

    /// Delay request on the ticker
    Delay(u16),

    /// Settings load request
    Load(Option<String>),

    /// Fallback after a failed load
    Defaults,

    /// Settings save request
    Save(Option<String>),

    /// Image mount (`Some`) or eject (`None`) on a drive
    ImageOpen(u8, Option<String>),
}

/// Event log shared between the mocks and the test body.
pub type SharedLog = Rc<RefCell<Vec<HostEvent>>>;

// ============================================================================
// Mock Ports
// ============================================================================

/// Register bus recording every write.
pub struct MockBus {
    pub log: SharedLog,
}

impl RegisterBus for MockBus {
    fn set_value(&mut self, id: char, value: u8) {
        self.log.borrow_mut().push(HostEvent::Write(id, value));
    }
}

/// A small scripted filesystem with one drive.
///
/// Listings are keyed by absolute path; `read_dir` keeps the working
/// directory the way a card driver would.
pub struct MockStorage {
    pub log: SharedLog,
    pub cwd: String,
    pub listings: Vec<(String, Vec<DirEntry>)>,
    pub image: Option<String>,
}

impl MockStorage {
    /// Storage rooted at `/sd` with the given listings.
    pub fn new(log: SharedLog, listings: Vec<(String, Vec<DirEntry>)>) -> Self {
        Self {
            log,
            cwd: String::from("/sd"),
            listings,
            image: None,
        }
    }

    fn listing_for(&self, path: &str) -> Vec<DirEntry> {
        self.listings
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, l)| l.clone())
            .unwrap_or_default()
    }
}

impl Storage for MockStorage {
    fn read_dir(&mut self, _drive: u8, subdir: Option<&str>, _exts: &[String]) -> Vec<DirEntry> {
        match subdir {
            Some("..") => {
                if let Some(i) = self.cwd.rfind('/') {
                    self.cwd.truncate(i);
                }
            }
            Some(dir) => {
                self.cwd.push('/');
                self.cwd.push_str(dir);
            }
            None => {}
        }
        let path = self.cwd.clone();
        self.listing_for(&path)
    }

    fn image_open(&mut self, drive: u8, name: Option<&str>) {
        self.log
            .borrow_mut()
            .push(HostEvent::ImageOpen(drive, name.map(str::to_string)));
        self.image = name.map(str::to_string);
    }

    fn image_name(&self, _drive: u8) -> Option<&str> {
        self.image.as_deref()
    }

    fn cwd(&self, _drive: u8) -> &str {
        &self.cwd
    }
}

/// Settings backend with scriptable outcomes.
///
/// A successful load replays `ini_values` into the variable table, the
/// way an INI reader would. Saves snapshot the table into `saved`.
pub struct MockSettings {
    pub log: SharedLog,
    pub fail_load: bool,
    pub fail_save: bool,
    pub ini_values: Vec<(char, i32)>,
    pub saved: Rc<RefCell<Vec<(char, i32)>>>,
}

impl Settings for MockSettings {
    type Error = &'static str;

    fn load(&mut self, file: Option<&str>, vars: &mut dyn VarStore) -> Result<(), Self::Error> {
        self.log
            .borrow_mut()
            .push(HostEvent::Load(file.map(str::to_string)));
        if self.fail_load {
            return Err("no such file");
        }
        for (id, value) in &self.ini_values {
            vars.set(*id, *value);
        }
        Ok(())
    }

    fn save(&mut self, file: Option<&str>, vars: &dyn VarStore) -> Result<(), Self::Error> {
        self.log
            .borrow_mut()
            .push(HostEvent::Save(file.map(str::to_string)));
        if self.fail_save {
            return Err("card is gone");
        }
        let snapshot = vars.ids().into_iter().map(|id| (id, vars.get(id))).collect();
        *self.saved.borrow_mut() = snapshot;
        Ok(())
    }

    fn apply_defaults(&mut self) {
        self.log.borrow_mut().push(HostEvent::Defaults);
    }
}

/// What one redraw put on the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSnapshot {
    pub title: String,
    pub rows: usize,
    pub selected: usize,
    pub scroll: usize,
}

impl FrameSnapshot {
    fn of(view: &View<'_>) -> Self {
        Self {
            title: String::from(view.title()),
            rows: view.rows(),
            selected: view.selected(),
            scroll: view.scroll(),
        }
    }
}

/// Display capturing visibility and every drawn frame.
pub struct MockOsd {
    pub visible: Rc<RefCell<Option<bool>>>,
    pub frames: Rc<RefCell<Vec<FrameSnapshot>>>,
}

impl Osd for MockOsd {
    fn set_visible(&mut self, visible: bool) {
        *self.visible.borrow_mut() = Some(visible);
    }

    fn draw(&mut self, view: &View<'_>) {
        self.frames.borrow_mut().push(FrameSnapshot::of(view));
    }
}

/// Time source recording delay requests.
pub struct MockTicker {
    pub log: SharedLog,
}

impl Ticker for MockTicker {
    fn delay_ms(&mut self, ms: u16) {
        self.log.borrow_mut().push(HostEvent::Delay(ms));
    }
}

// ============================================================================
// Directory Listings
// ============================================================================

/// File row with a plausible size.
pub fn file(name: &str) -> DirEntry {
    DirEntry {
        name: String::from(name),
        size: 737_280,
        is_dir: false,
    }
}

/// Directory row.
pub fn dir(name: &str) -> DirEntry {
    DirEntry {
        name: String::from(name),
        size: 0,
        is_dir: true,
    }
}

/// Root and one subdirectory, as a floppy drive card would list them.
pub fn atari_listings() -> Vec<(String, Vec<DirEntry>)> {
    vec![
        (
            String::from("/sd"),
            vec![
                dir("/No Disk"),
                dir("demos"),
                file("disk_a.st"),
                file("disk_b.st"),
            ],
        ),
        (
            String::from("/sd/demos"),
            vec![dir(".."), file("d1.st"), file("d2.st")],
        ),
    ]
}

// ============================================================================
// Sample Documents
// ============================================================================

/// A complete core description: startup actions, nested menus, lists,
/// a file selector and buttons.
pub const ATARI_DOC: &str = r#"<config name="Atari ST" version="101">
  <actions>
    <action name="init">
      <set id="Z" value="0"/>
      <load file="atarist.ini"/>
      <set id="R" value="3"/>
      <delay ms="10"/>
      <set id="R" value="0"/>
    </action>
    <action name="ready">
      <hide/>
    </action>
    <action name="coldboot">
      <set id="R" value="3"/>
      <delay ms="10"/>
      <set id="R" value="0"/>
    </action>
    <action name="saveini">
      <save file="atarist.ini"/>
    </action>
  </actions>
  <menu label="Atari ST">
    <fileselector label="Floppy A:" ext="st;msa" index="0" default="disk_a.st"/>
    <menu label="System">
      <list label="Chipset" id="C" default="1" action="coldboot">
        <listentry label="ST" value="0"/>
        <listentry label="Mega ST" value="1"/>
        <listentry label="STE" value="2"/>
      </list>
      <list label="Memory" id="M" default="0">
        <listentry label="1MB" value="0"/>
        <listentry label="4MB" value="1"/>
      </list>
      <button label="Cold Boot" action="coldboot"/>
    </menu>
    <list label="Scanlines" id="S" default="0">
      <listentry label="None" value="0"/>
      <listentry label="25%" value="1"/>
      <listentry label="50%" value="2"/>
    </list>
    <button label="Save Settings" action="saveini"/>
  </menu>
</config>
"#;
