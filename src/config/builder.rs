//! Tree builder driven by the tag parser callbacks.
//!
//! Implements [`TagSink`] over a schema-context state machine: each element
//! start is dispatched on (current context, tag name), attributes mutate the
//! node the context points at, and element ends walk the context back out.
//! Open menus are held on an explicit stack of owned nodes; a menu attaches
//! to its parent (or becomes the document root) when it closes. Unknown
//! elements are rejected into the parser's skip mode, unknown attributes are
//! logged and dropped, neither aborts the parse.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use super::{Action, Button, Command, Config, FileSelector, List, ListEntry, MenuEntry, MenuNode};
use crate::xml::{TagSink, Verdict};

/// Schema position the next callback is interpreted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Context {
    /// Outside the document element
    Root,

    /// Inside `<config>`
    Config,

    /// Inside `<actions>`
    Actions,

    /// Inside `<action>`
    Action,

    /// Inside `<load>`
    CmdLoad,

    /// Inside `<set>`
    CmdSet,

    /// Inside `<save>`
    CmdSave,

    /// Inside `<delay>`
    CmdDelay,

    /// Inside `<hide>`
    CmdHide,

    /// Inside `<link>`
    CmdLink,

    /// Inside the innermost open `<menu>`
    Menu,

    /// Inside `<fileselector>`
    Files,

    /// Inside `<list>`
    List,

    /// Inside `<listentry>`
    ListEntry,

    /// Inside `<button>`
    Button,

    /// Structure is beyond repair; reject everything from here on
    Failed,
}

/// Incremental document builder.
///
/// Fed by a [`crate::xml::TagParser`]; collect the result with
/// [`TreeBuilder::finish`].
#[derive(Debug)]
pub(super) struct TreeBuilder {
    /// Document under construction
    config: Config,

    /// Current schema context
    ctx: Context,

    /// Nesting depth of accepted elements, for diagnostics
    depth: u32,

    /// Stack of open menu nodes, innermost last; nodes attach to their
    /// parent (or the document) when their element closes
    menus: Vec<MenuNode>,
}

impl TreeBuilder {
    pub(super) fn new() -> Self {
        Self {
            config: Config::default(),
            ctx: Context::Root,
            depth: 0,
            menus: Vec::new(),
        }
    }

    /// Finish the build and hand out the document.
    ///
    /// Menus still open (the document was cut off before their closing
    /// tags) are attached on the way out so a truncated file still yields
    /// the recognized part of the tree.
    pub(super) fn finish(mut self) -> Config {
        while let Some(node) = self.menus.pop() {
            match self.menus.last_mut() {
                Some(parent) => parent.entries.push(MenuEntry::Submenu(node)),
                None => self.config.menu = node,
            }
        }
        self.config
    }

    /// Pick the context for an accepted element, performing its tree
    /// mutation. `None` rejects the element.
    fn dispatch(&mut self, name: &str) -> Option<Context> {
        match self.ctx {
            Context::Root => {
                if ieq(name, "config") {
                    return Some(Context::Config);
                }
                None
            }

            Context::Config => {
                if ieq(name, "actions") {
                    return Some(Context::Actions);
                }
                if ieq(name, "menu") {
                    self.menus.push(MenuNode::default());
                    return Some(Context::Menu);
                }
                None
            }

            Context::Actions => {
                if ieq(name, "action") {
                    self.config.actions.push(Action::default());
                    return Some(Context::Action);
                }
                None
            }

            Context::Action => {
                let (command, ctx) = if ieq(name, "load") {
                    (Command::Load { file: None }, Context::CmdLoad)
                } else if ieq(name, "set") {
                    (Command::Set { id: '\0', value: 0 }, Context::CmdSet)
                } else if ieq(name, "save") {
                    (Command::Save { file: None }, Context::CmdSave)
                } else if ieq(name, "delay") {
                    (Command::Delay { ms: 0 }, Context::CmdDelay)
                } else if ieq(name, "hide") {
                    (Command::Hide, Context::CmdHide)
                } else if ieq(name, "link") {
                    (
                        Command::Link {
                            action: String::new(),
                        },
                        Context::CmdLink,
                    )
                } else {
                    return None;
                };

                if let Some(action) = self.config.actions.last_mut() {
                    action.commands.push(command);
                }
                Some(ctx)
            }

            Context::Menu => {
                if ieq(name, "menu") {
                    self.menus.push(MenuNode::default());
                    return Some(Context::Menu);
                }
                if ieq(name, "fileselector") {
                    self.push_entry(MenuEntry::Files(FileSelector::default()));
                    return Some(Context::Files);
                }
                if ieq(name, "list") {
                    self.push_entry(MenuEntry::List(List::default()));
                    return Some(Context::List);
                }
                if ieq(name, "button") {
                    self.push_entry(MenuEntry::Button(Button::default()));
                    return Some(Context::Button);
                }
                None
            }

            Context::List => {
                if ieq(name, "listentry") {
                    if let Some(MenuEntry::List(list)) = self.top_entry() {
                        list.entries.push(ListEntry::default());
                    }
                    return Some(Context::ListEntry);
                }
                None
            }

            // leaf elements without children, and dead state
            _ => None,
        }
    }

    /// Append an entry to the innermost open menu.
    fn push_entry(&mut self, entry: MenuEntry) {
        if let Some(menu) = self.menus.last_mut() {
            menu.entries.push(entry);
        }
    }

    /// Last entry of the innermost open menu.
    fn top_entry(&mut self) -> Option<&mut MenuEntry> {
        self.menus.last_mut().and_then(|menu| menu.entries.last_mut())
    }

    /// Last command of the action being built.
    fn top_command(&mut self) -> Option<&mut Command> {
        self.config
            .actions
            .last_mut()
            .and_then(|action| action.commands.last_mut())
    }

    /// Last entry of the list being built.
    fn top_list_entry(&mut self) -> Option<&mut ListEntry> {
        match self.top_entry() {
            Some(MenuEntry::List(list)) => list.entries.last_mut(),
            _ => None,
        }
    }

    /// Close the innermost open menu, attaching it to its parent or, for
    /// the root menu, to the document.
    fn close_menu(&mut self) -> Context {
        match self.menus.pop() {
            Some(node) => match self.menus.last_mut() {
                Some(parent) => {
                    parent.entries.push(MenuEntry::Submenu(node));
                    Context::Menu
                }
                None => {
                    self.config.menu = node;
                    Context::Config
                }
            },
            None => {
                log::warn!("config: menu close without an open menu");
                Context::Failed
            }
        }
    }

    fn warn_attr(&self, element: &'static str, name: &str) {
        log::warn!("config: unused {} attribute '{}'", element, name);
    }
}

impl TagSink for TreeBuilder {
    fn element_start(&mut self, name: &str) -> Verdict {
        match self.dispatch(name) {
            Some(ctx) => {
                self.ctx = ctx;
                self.depth += 1;
                Verdict::Accept
            }
            None => {
                log::warn!(
                    "config: unexpected element '{}' at depth {}",
                    name,
                    self.depth
                );
                Verdict::Reject
            }
        }
    }

    fn element_end(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.ctx = match self.ctx {
            Context::Root => {
                log::warn!("config: unexpected closing element");
                Context::Failed
            }
            Context::Config => Context::Root,
            Context::Actions => Context::Config,
            Context::Action => Context::Actions,
            Context::CmdLoad
            | Context::CmdSet
            | Context::CmdSave
            | Context::CmdDelay
            | Context::CmdHide
            | Context::CmdLink => Context::Action,
            Context::Menu => self.close_menu(),
            Context::Files | Context::List | Context::Button => Context::Menu,
            Context::ListEntry => Context::List,
            Context::Failed => Context::Failed,
        };
    }

    fn attribute(&mut self, name: &str, value: &str) {
        match self.ctx {
            Context::Config => {
                if ieq(name, "name") && self.config.name.is_empty() {
                    self.config.name = value.to_string();
                } else if ieq(name, "version") {
                    self.config.version = parse_int(value);
                } else {
                    self.warn_attr("config", name);
                }
            }

            Context::Action => {
                let Some(action) = self.config.actions.last_mut() else {
                    return;
                };
                if ieq(name, "name") && action.name.is_empty() {
                    action.name = value.to_string();
                } else {
                    self.warn_attr("action", name);
                }
            }

            Context::CmdLoad | Context::CmdSave => {
                let file = match self.top_command() {
                    Some(Command::Load { file }) | Some(Command::Save { file }) => file,
                    _ => return,
                };
                if ieq(name, "file") && file.is_none() {
                    *file = Some(value.to_string());
                } else {
                    self.warn_attr("command", name);
                }
            }

            Context::CmdSet => {
                let Some(Command::Set { id, value: v }) = self.top_command() else {
                    return;
                };
                if ieq(name, "id") {
                    *id = first_char(value);
                } else if ieq(name, "value") {
                    *v = parse_int(value) as u8;
                } else {
                    self.warn_attr("set", name);
                }
            }

            Context::CmdDelay => {
                let Some(Command::Delay { ms }) = self.top_command() else {
                    return;
                };
                if ieq(name, "ms") {
                    *ms = parse_int(value) as u16;
                } else {
                    self.warn_attr("delay", name);
                }
            }

            Context::CmdLink => {
                let Some(Command::Link { action }) = self.top_command() else {
                    return;
                };
                if ieq(name, "action") && action.is_empty() {
                    *action = value.to_string();
                } else {
                    self.warn_attr("link", name);
                }
            }

            Context::Menu => {
                let Some(menu) = self.menus.last_mut() else {
                    return;
                };
                if ieq(name, "label") && menu.label.is_empty() {
                    menu.label = value.to_string();
                } else {
                    self.warn_attr("menu", name);
                }
            }

            Context::Files => {
                let Some(MenuEntry::Files(fsel)) = self.top_entry() else {
                    return;
                };
                if ieq(name, "label") && fsel.label.is_empty() {
                    fsel.label = value.to_string();
                } else if ieq(name, "ext") && fsel.ext.is_empty() {
                    fsel.ext = parse_strlist(value);
                } else if ieq(name, "index") {
                    fsel.drive = parse_int(value) as u8;
                } else if ieq(name, "default") {
                    fsel.default = Some(value.to_string());
                } else if ieq(name, "action") {
                    fsel.action = Some(value.to_string());
                } else {
                    self.warn_attr("fileselector", name);
                }
            }

            Context::List => {
                let Some(MenuEntry::List(list)) = self.top_entry() else {
                    return;
                };
                if ieq(name, "label") && list.label.is_empty() {
                    list.label = value.to_string();
                } else if ieq(name, "id") {
                    list.id = first_char(value);
                } else if ieq(name, "default") {
                    list.default = parse_int(value);
                } else if ieq(name, "action") {
                    list.action = Some(value.to_string());
                } else {
                    self.warn_attr("list", name);
                }
            }

            Context::ListEntry => {
                let Some(entry) = self.top_list_entry() else {
                    return;
                };
                if ieq(name, "label") && entry.label.is_empty() {
                    entry.label = value.to_string();
                } else if ieq(name, "value") {
                    entry.value = parse_int(value);
                } else {
                    self.warn_attr("listentry", name);
                }
            }

            Context::Button => {
                let Some(MenuEntry::Button(button)) = self.top_entry() else {
                    return;
                };
                if ieq(name, "label") && button.label.is_empty() {
                    button.label = value.to_string();
                } else if ieq(name, "action") {
                    button.action = Some(value.to_string());
                } else {
                    self.warn_attr("button", name);
                }
            }

            Context::Root | Context::Actions | Context::CmdHide | Context::Failed => {
                self.warn_attr("element", name);
            }
        }
    }
}

/// ASCII case-insensitive name match, as everywhere in the schema.
fn ieq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// First character of an id attribute.
fn first_char(value: &str) -> char {
    value.chars().next().unwrap_or('\0')
}

/// Integer attribute parsing with C `atoi` semantics: leading whitespace
/// skipped, optional sign, digits up to the first non-digit, 0 when there
/// are none, saturating instead of overflowing.
fn parse_int(value: &str) -> i32 {
    let bytes = value.trim_start().as_bytes();
    let mut i = 0;
    let mut negative = false;

    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        negative = bytes[i] == b'-';
        i += 1;
    }

    let mut n: i64 = 0;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        n = n * 10 + i64::from(bytes[i] - b'0');
        if n > i64::from(u32::MAX) {
            break;
        }
        i += 1;
    }

    if negative {
        n = -n;
    }
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Split an extension list on `;` or `+`, dropping empty segments.
fn parse_strlist(value: &str) -> Vec<String> {
    value
        .split([';', '+'])
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}
