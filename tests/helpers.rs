//! Shared test helpers to reduce duplication across integration tests.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
mod fixtures;

use std::cell::RefCell;
use std::rc::Rc;

use osd_menu::{Config, DirEntry, Menu, SliceSource};

pub use fixtures::{
    ATARI_DOC, FrameSnapshot, HostEvent, MockBus, MockOsd, MockSettings, MockStorage, MockTicker,
    SharedLog, atari_listings, dir, file,
};

/// Menu over the mock port set.
pub type TestMenu = Menu<'static, MockBus, MockStorage, MockSettings, MockOsd, MockTicker>;

/// Handles into the mocks owned by the engine.
pub struct Host {
    /// Ordered record of bus, storage, settings and ticker effects
    pub log: SharedLog,

    /// Last visibility change on the display
    pub visible: Rc<RefCell<Option<bool>>>,

    /// Every frame drawn, in order
    pub frames: Rc<RefCell<Vec<FrameSnapshot>>>,

    /// Variable snapshot taken by the last successful save
    pub saved: Rc<RefCell<Vec<(char, i32)>>>,
}

impl Host {
    /// Drop everything recorded so far.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
        self.frames.borrow_mut().clear();
    }

    /// Title of the most recently drawn frame.
    pub fn shown_title(&self) -> String {
        self.frames
            .borrow()
            .last()
            .map(|frame| frame.title.clone())
            .unwrap_or_default()
    }

    /// Selection of the most recently drawn frame.
    pub fn shown_selection(&self) -> (usize, usize) {
        self.frames
            .borrow()
            .last()
            .map_or((0, 0), |frame| (frame.selected, frame.scroll))
    }
}

/// Turn on log capture for a test run.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parse a document, giving it the process lifetime the engine borrows.
pub fn parse(doc: &str) -> &'static Config {
    Box::leak(Box::new(Config::parse(SliceSource::new(doc.as_bytes()))))
}

/// Engine over an empty storage with well-behaved settings.
pub fn create_menu(cfg: &'static Config) -> (TestMenu, Host) {
    create(cfg, Vec::new(), None, false, Vec::new())
}

/// Engine browsing the given listings, optionally with a mounted image.
pub fn create_menu_with_storage(
    cfg: &'static Config,
    listings: Vec<(String, Vec<DirEntry>)>,
    image: Option<&str>,
) -> (TestMenu, Host) {
    create(cfg, listings, image, false, Vec::new())
}

/// Engine whose settings backend replays `ini_values` on load, or fails
/// to load entirely.
pub fn create_menu_with_settings(
    cfg: &'static Config,
    fail_load: bool,
    ini_values: Vec<(char, i32)>,
) -> (TestMenu, Host) {
    create(cfg, Vec::new(), None, fail_load, ini_values)
}

fn create(
    cfg: &'static Config,
    listings: Vec<(String, Vec<DirEntry>)>,
    image: Option<&str>,
    fail_load: bool,
    ini_values: Vec<(char, i32)>,
) -> (TestMenu, Host) {
    let log = SharedLog::default();
    let visible = Rc::new(RefCell::new(None));
    let frames = Rc::new(RefCell::new(Vec::new()));
    let saved = Rc::new(RefCell::new(Vec::new()));

    let mut storage = MockStorage::new(log.clone(), listings);
    storage.image = image.map(String::from);

    let menu = Menu::new(
        cfg,
        MockBus { log: log.clone() },
        storage,
        MockSettings {
            log: log.clone(),
            fail_load,
            fail_save: false,
            ini_values,
            saved: saved.clone(),
        },
        MockOsd {
            visible: visible.clone(),
            frames: frames.clone(),
        },
        MockTicker { log: log.clone() },
    );

    let host = Host {
        log,
        visible,
        frames,
        saved,
    };
    (menu, host)
}
