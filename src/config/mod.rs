//! Typed configuration document.
//!
//! A core description document declares the settings UI (menus, file
//! selectors, option lists, buttons) and the named actions those elements
//! trigger. [`Config::parse`] builds the tree from any [`ByteSource`];
//! after that the tree never changes. Variable values are not stored in
//! tree nodes, they live in [`crate::vars::Variables`].
//!
//! Action references (`link` commands and the `action` attributes of menu
//! entries) are kept as names and resolved through [`Config::action`] when
//! they run, so a document may reference actions defined later in the file.

mod builder;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::source::ByteSource;
use crate::xml::TagParser;

/// A parsed core description document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Core name from the `config` element (first `name` attribute wins)
    pub name: String,

    /// Core version, encoded as major * 100 + minor; -1 when absent
    pub version: i32,

    /// Named actions in document order
    pub actions: Vec<Action>,

    /// Root of the menu tree
    pub menu: MenuNode,
}

/// A named, ordered command sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    /// Lookup name; need not be unique, first match wins
    pub name: String,

    /// Commands in execution order
    pub commands: Vec<Command>,
}

/// One step of an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a variable and push it to the core
    Set { id: char, value: u8 },

    /// Suspend the menu task
    Delay { ms: u16 },

    /// Write settings to a file (`None` selects the default file)
    Save { file: Option<String> },

    /// Read settings from a file, falling back to system defaults
    Load { file: Option<String> },

    /// Hide the menu overlay
    Hide,

    /// Run another action by name before continuing
    Link { action: String },
}

/// One level of the menu tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuNode {
    /// Title shown at the top of the frame
    pub label: String,

    /// Entries in display order
    pub entries: Vec<MenuEntry>,
}

/// One selectable row of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Nested menu
    Submenu(MenuNode),

    /// Disk-image chooser
    Files(FileSelector),

    /// Enumerated option bound to a variable
    List(List),

    /// Action trigger
    Button(Button),
}

impl MenuEntry {
    /// Display label of the entry, whatever its kind.
    pub fn label(&self) -> &str {
        match self {
            MenuEntry::Submenu(menu) => &menu.label,
            MenuEntry::Files(fsel) => &fsel.label,
            MenuEntry::List(list) => &list.label,
            MenuEntry::Button(button) => &button.label,
        }
    }

    /// Short kind name for diagnostics.
    pub(crate) fn kind_str(&self) -> &'static str {
        match self {
            MenuEntry::Submenu(_) => "menu",
            MenuEntry::Files(_) => "fileselector",
            MenuEntry::List(_) => "list",
            MenuEntry::Button(_) => "button",
        }
    }
}

/// Disk-image chooser entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelector {
    /// Storage drive this selector mounts into
    pub drive: u8,

    /// Display label
    pub label: String,

    /// Acceptable file extensions, ASCII case-insensitive
    pub ext: Vec<String>,

    /// Image to offer when nothing is mounted yet
    pub default: Option<String>,

    /// Action run after a successful mount
    pub action: Option<String>,
}

/// Enumerated option entry bound to a variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    /// Variable this list drives
    pub id: char,

    /// Display label
    pub label: String,

    /// Initial variable value declared by this list
    pub default: i32,

    /// Choices in cycle order
    pub entries: Vec<ListEntry>,

    /// Action run after the value changes
    pub action: Option<String>,
}

impl List {
    /// Label of the choice carrying `value`, for display next to the
    /// list label.
    pub fn label_for(&self, value: i32) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.label.as_str())
    }
}

impl Default for List {
    fn default() -> Self {
        Self {
            id: '\0',
            label: String::new(),
            default: -1,
            entries: Vec::new(),
            action: None,
        }
    }
}

/// One choice of a [`List`]. Values need not be contiguous or ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEntry {
    /// Display label
    pub label: String,

    /// Variable value this choice stands for
    pub value: i32,
}

/// Action-trigger entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Button {
    /// Display label
    pub label: String,

    /// Action run on selection
    pub action: Option<String>,
}

impl Config {
    /// Parse a document from a byte source.
    ///
    /// Never fails outright: unknown elements are skipped with their
    /// subtrees, unknown attributes are ignored, and malformed attribute
    /// syntax stops consuming input, all with warning logs. The returned
    /// document holds whatever was recognized up to that point.
    pub fn parse(mut src: impl ByteSource) -> Config {
        let mut parser = TagParser::new();
        let mut builder = builder::TreeBuilder::new();

        while let Some(byte) = src.next_byte() {
            parser.feed(byte, &mut builder);
        }

        builder.finish()
    }

    /// Look up an action by name, ASCII case-insensitive, first match.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions
            .iter()
            .find(|action| action.name.eq_ignore_ascii_case(name))
    }

    /// Log a document summary at debug level.
    pub fn dump(&self) {
        log::debug!(
            "config '{}', version {}.{:02}",
            self.name,
            self.version / 100,
            self.version % 100
        );
        log::debug!("{} actions:", self.actions.len());
        for action in &self.actions {
            log::debug!("  '{}' ({} commands)", action.name, action.commands.len());
        }
        Self::dump_menu(&self.menu, 1);
    }

    fn dump_menu(node: &MenuNode, depth: usize) {
        log::debug!("{:indent$}menu '{}'", "", node.label, indent = 2 * depth);
        for entry in &node.entries {
            match entry {
                MenuEntry::Submenu(menu) => Self::dump_menu(menu, depth + 1),
                other => log::debug!(
                    "{:indent$}{} '{}'",
                    "",
                    other.kind_str(),
                    other.label(),
                    indent = 2 * (depth + 1)
                ),
            }
        }
    }

    /// Serialize the document back to its wire grammar.
    ///
    /// `&` is re-escaped to `&amp;`; parsing the output reproduces an
    /// equal tree.
    pub fn write_xml(&self, w: &mut impl fmt::Write) -> fmt::Result {
        w.write_str("<config")?;
        write_attr(w, "name", &self.name)?;
        write!(w, " version=\"{}\">", self.version)?;
        w.write_char('\n')?;

        if !self.actions.is_empty() {
            w.write_str("  <actions>\n")?;
            for action in &self.actions {
                w.write_str("    <action")?;
                write_attr(w, "name", &action.name)?;
                w.write_str(">\n")?;
                for command in &action.commands {
                    write_command(w, command)?;
                }
                w.write_str("    </action>\n")?;
            }
            w.write_str("  </actions>\n")?;
        }

        write_menu(w, &self.menu, 1)?;
        w.write_str("</config>\n")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: -1,
            actions: Vec::new(),
            menu: MenuNode::default(),
        }
    }
}

/// Write ` name="value"` with `&` escaped.
fn write_attr(w: &mut impl fmt::Write, name: &str, value: &str) -> fmt::Result {
    write!(w, " {}=\"", name)?;
    for ch in value.chars() {
        if ch == '&' {
            w.write_str("&amp;")?;
        } else {
            w.write_char(ch)?;
        }
    }
    w.write_char('"')
}

fn write_opt_attr(w: &mut impl fmt::Write, name: &str, value: &Option<String>) -> fmt::Result {
    match value {
        Some(value) => write_attr(w, name, value),
        None => Ok(()),
    }
}

fn write_command(w: &mut impl fmt::Write, command: &Command) -> fmt::Result {
    w.write_str("      ")?;
    match command {
        Command::Set { id, value } => {
            write!(w, "<set id=\"{}\" value=\"{}\"/>", id, value)?;
        }
        Command::Delay { ms } => write!(w, "<delay ms=\"{}\"/>", ms)?,
        Command::Save { file } => {
            w.write_str("<save")?;
            write_opt_attr(w, "file", file)?;
            w.write_str("/>")?;
        }
        Command::Load { file } => {
            w.write_str("<load")?;
            write_opt_attr(w, "file", file)?;
            w.write_str("/>")?;
        }
        Command::Hide => w.write_str("<hide/>")?,
        Command::Link { action } => {
            w.write_str("<link")?;
            write_attr(w, "action", action)?;
            w.write_str("/>")?;
        }
    }
    w.write_char('\n')
}

fn write_menu(w: &mut impl fmt::Write, node: &MenuNode, depth: usize) -> fmt::Result {
    write_indent(w, depth)?;
    w.write_str("<menu")?;
    write_attr(w, "label", &node.label)?;
    w.write_str(">\n")?;

    for entry in &node.entries {
        match entry {
            MenuEntry::Submenu(menu) => write_menu(w, menu, depth + 1)?,

            MenuEntry::Files(fsel) => {
                write_indent(w, depth + 1)?;
                w.write_str("<fileselector")?;
                write_attr(w, "label", &fsel.label)?;
                if !fsel.ext.is_empty() {
                    write!(w, " ext=\"")?;
                    for (i, ext) in fsel.ext.iter().enumerate() {
                        if i > 0 {
                            w.write_char(';')?;
                        }
                        w.write_str(ext)?;
                    }
                    w.write_char('"')?;
                }
                write!(w, " index=\"{}\"", fsel.drive)?;
                write_opt_attr(w, "default", &fsel.default)?;
                write_opt_attr(w, "action", &fsel.action)?;
                w.write_str("/>\n")?;
            }

            MenuEntry::List(list) => {
                write_indent(w, depth + 1)?;
                w.write_str("<list")?;
                write_attr(w, "label", &list.label)?;
                write!(w, " id=\"{}\" default=\"{}\"", list.id, list.default)?;
                write_opt_attr(w, "action", &list.action)?;
                w.write_str(">\n")?;
                for entry in &list.entries {
                    write_indent(w, depth + 2)?;
                    w.write_str("<listentry")?;
                    write_attr(w, "label", &entry.label)?;
                    write!(w, " value=\"{}\"/>", entry.value)?;
                    w.write_char('\n')?;
                }
                write_indent(w, depth + 1)?;
                w.write_str("</list>\n")?;
            }

            MenuEntry::Button(button) => {
                write_indent(w, depth + 1)?;
                w.write_str("<button")?;
                write_attr(w, "label", &button.label)?;
                write_opt_attr(w, "action", &button.action)?;
                w.write_str("/>\n")?;
            }
        }
    }

    write_indent(w, depth)?;
    w.write_str("</menu>\n")
}

fn write_indent(w: &mut impl fmt::Write, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        w.write_str("  ")?;
    }
    Ok(())
}
