//! Document parsing tests.
//!
//! Cover the pipeline from raw bytes to the typed tree: grammar coverage,
//! tolerance of malformed input, escaping, serialization round-trips and
//! compressed documents.

#[allow(clippy::duplicate_mod)]
#[path = "helpers.rs"]
mod helpers;

use helpers::{ATARI_DOC, init_logging, parse};
use osd_menu::config::{Command, MenuEntry};
use osd_menu::{Config, SliceSource};

// ============================================================================
// Grammar Coverage
// ============================================================================

#[test]
fn test_full_document_shape() {
    init_logging();
    let cfg = parse(ATARI_DOC);

    assert_eq!(cfg.name, "Atari ST");
    assert_eq!(cfg.version, 101);
    assert_eq!(cfg.actions.len(), 4);

    let init = cfg.action("init").expect("init action");
    assert_eq!(init.commands.len(), 5);
    assert_eq!(init.commands[0], Command::Set { id: 'Z', value: 0 });
    assert_eq!(init.commands[3], Command::Delay { ms: 10 });

    assert_eq!(cfg.menu.label, "Atari ST");
    assert_eq!(cfg.menu.entries.len(), 4);

    let MenuEntry::Files(fsel) = &cfg.menu.entries[0] else {
        panic!("expected a fileselector first");
    };
    assert_eq!(fsel.label, "Floppy A:");
    assert_eq!(fsel.ext, ["st", "msa"]);
    assert_eq!(fsel.drive, 0);
    assert_eq!(fsel.default.as_deref(), Some("disk_a.st"));

    let MenuEntry::Submenu(system) = &cfg.menu.entries[1] else {
        panic!("expected the System submenu");
    };
    assert_eq!(system.label, "System");
    assert_eq!(system.entries.len(), 3);

    let MenuEntry::List(chipset) = &system.entries[0] else {
        panic!("expected the Chipset list");
    };
    assert_eq!(chipset.id, 'C');
    assert_eq!(chipset.default, 1);
    assert_eq!(chipset.action.as_deref(), Some("coldboot"));
    assert_eq!(chipset.entries.len(), 3);
    assert_eq!(chipset.entries[2].label, "STE");
    assert_eq!(chipset.entries[2].value, 2);

    let MenuEntry::Button(save) = &cfg.menu.entries[3] else {
        panic!("expected the save button");
    };
    assert_eq!(save.label, "Save Settings");
    assert_eq!(save.action.as_deref(), Some("saveini"));
}

#[test]
fn test_grammar_is_case_insensitive() {
    let cfg = parse(
        "<CONFIG Name=\"x\" VERSION=\"3\">\
           <Menu Label=\"Main\"><BUTTON LABEL=\"b\"/></Menu>\
         </CONFIG>",
    );
    assert_eq!(cfg.name, "x");
    assert_eq!(cfg.version, 3);
    assert_eq!(cfg.menu.label, "Main");
    assert_eq!(cfg.menu.entries.len(), 1);
}

#[test]
fn test_declarations_and_comments_are_ignored() {
    let cfg = parse(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!-- core description -->\n\
         <config name=\"c\"><menu label=\"M\"/></config>",
    );
    assert_eq!(cfg.name, "c");
    assert_eq!(cfg.menu.label, "M");
}

// ============================================================================
// Round-Trips
// ============================================================================

#[test]
fn test_serialization_round_trip_preserves_the_tree() {
    init_logging();
    let first = parse(ATARI_DOC);

    let mut doc = String::new();
    first.write_xml(&mut doc).expect("serialize");
    let second = Config::parse(SliceSource::new(doc.as_bytes()));

    assert_eq!(*first, second);
}

#[test]
fn test_ampersand_escapes_round_trip() {
    let cfg = parse(
        "<config name=\"amp\"><menu label=\"Fun &amp; Games\">\
           <button label=\"This &AMP; That\"/>\
         </menu></config>",
    );
    assert_eq!(cfg.menu.label, "Fun & Games");
    assert_eq!(cfg.menu.entries[0].label(), "This & That");

    let mut doc = String::new();
    cfg.write_xml(&mut doc).expect("serialize");
    assert!(doc.contains("Fun &amp; Games"));

    let again = Config::parse(SliceSource::new(doc.as_bytes()));
    assert_eq!(*cfg, again);
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_unknown_subtree_skipped_sibling_kept() {
    let cfg = parse(
        "<config><menu label=\"M\">\
           <bogus><x/></bogus>\
           <button label=\"B\"/>\
         </menu></config>",
    );
    assert_eq!(cfg.menu.entries.len(), 1);
    assert_eq!(cfg.menu.entries[0].label(), "B");
}

#[test]
fn test_truncated_document_yields_partial_tree() {
    let cfg = parse(
        "<config name=\"cut\"><menu label=\"Main\"><menu label=\"Deep\"><button label=\"B\"/>",
    );
    assert_eq!(cfg.name, "cut");
    assert_eq!(cfg.menu.label, "Main");

    let MenuEntry::Submenu(inner) = &cfg.menu.entries[0] else {
        panic!("expected the open submenu to be attached");
    };
    assert_eq!(inner.label, "Deep");
    assert_eq!(inner.entries[0].label(), "B");
}

// ============================================================================
// Compressed Documents
// ============================================================================

#[cfg(feature = "inflate")]
#[test]
fn test_compressed_document_parses_identically() {
    init_logging();
    let compressed = miniz_oxide::deflate::compress_to_vec(ATARI_DOC.as_bytes(), 6);

    let source = osd_menu::InflateSource::new(&compressed).expect("valid stream");
    let inflated = Config::parse(source);

    assert_eq!(inflated, *parse(ATARI_DOC));
}

#[cfg(feature = "inflate")]
#[test]
fn test_corrupt_stream_is_rejected() {
    assert!(osd_menu::InflateSource::new(&[0xff, 0x00, 0xa5, 0x5a]).is_none());
}
