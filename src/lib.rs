//! # osd-menu
//!
//! Configuration-driven on-screen-display menu engine for FPGA companion
//! firmware.
//!
//! A core description is a small XML document naming the startup actions
//! and the menu tree of an emulated machine. This crate parses that
//! document from a byte stream, binds single-character variables to the
//! target's registers, and runs the whole OSD interaction: stack-based
//! menu navigation, value lists, file selectors browsing mass storage,
//! and named command sequences for reset, settings and image handling.
//!
//! **Key pieces:**
//! - **Tag parser** - Push-fed, schema-independent markup scanner
//! - **Tree builder** - Schema dispatcher constructing the typed document
//! - **Variable binding** - Deduplicated register writes per id
//! - **Navigation engine** - Frame stack, scrolling, file browsing
//! - **Action interpreter** - Ordered command lists with links
//!
//! The host supplies its hardware through the port traits in [`ports`]:
//! register bus, mass storage, settings persistence, display and time
//! source.
//!
//! ## Optional Features
//!
//! - `inflate` *(default)* - Accept deflate-compressed documents through
//!   [`source::InflateSource`]
//!
//! This library is `no_std` compatible; the parsed tree lives on the
//! embedded allocator's heap.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate alloc;

// ============================================================================
// Module Declarations
// ============================================================================

// Document input
pub mod source;

// Markup scanning
pub mod xml;

// Typed configuration tree
pub mod config;

// Variable table and register binding
pub mod vars;

// Navigation, display views and actions
pub mod menu;

// Host collaborator ports
pub mod ports;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Document sources
#[cfg(feature = "inflate")]
pub use source::InflateSource;
pub use source::{ByteSource, SliceSource};

// Markup scanning
pub use xml::{TagParser, TagSink, Verdict};

// Configuration tree
pub use config::Config;

// Variables
pub use vars::{VarStore, Variables};

// Navigation engine
pub use menu::{Event, Menu, VISIBLE_ROWS, View};

// Ports
pub use ports::{DirEntry, Osd, RegisterBus, Settings, Storage, Ticker};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
