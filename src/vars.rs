//! Variable table shared between the menu tree and the target registers.
//!
//! Variables are single-character ids carrying an integer value. They are
//! discovered from a parsed document in two passes: every `set` command
//! seeds its id at zero, then every list contributes its default value.
//! The first default encountered for an id wins; later discoveries of the
//! same id change nothing and push nothing.
//!
//! Writes go through a [`BoundVars`] binding which forwards each actual
//! change to the [`RegisterBus`], truncated to the register width. Writes
//! that leave the value unchanged are swallowed, so replaying a settings
//! file or re-selecting a list entry does not re-trigger the target.

use alloc::vec::Vec;

use crate::config::{Command, Config, List, MenuEntry, MenuNode};
use crate::ports::RegisterBus;

/// Read and write access to the variable table.
///
/// Settings backends receive the table through this trait so they can
/// replay stored values on load and enumerate them on save.
pub trait VarStore {
    /// Current value of a variable, 0 when the id is unknown.
    fn get(&self, id: char) -> i32;

    /// Store a value and push it to the target if it changed.
    ///
    /// Unknown ids are ignored.
    fn set(&mut self, id: char, value: i32);

    /// Ids of every known variable, in discovery order.
    fn ids(&self) -> Vec<char>;
}

/// One variable slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Variable {
    /// Single-character id as used by the target registers
    id: char,

    /// Current value
    value: i32,

    /// Whether a list default has claimed this id already
    has_default: bool,
}

/// The variable table.
#[derive(Debug, Default)]
pub struct Variables {
    slots: Vec<Variable>,
}

impl Variables {
    /// Build the table from a parsed document.
    ///
    /// Ids referenced by `set` commands are seeded at zero. Lists then
    /// contribute their default values; each id adopts the first default
    /// found for it, which is pushed to the bus once. Ids seeded by
    /// commands alone are not pushed here, the startup actions do that.
    ///
    /// # Arguments
    ///
    /// * `config` - Parsed document to scan
    /// * `bus` - Register bus receiving the initial list defaults
    pub fn from_config(config: &Config, bus: &mut impl RegisterBus) -> Self {
        let mut vars = Self::default();

        for action in &config.actions {
            for command in &action.commands {
                if let Command::Set { id, .. } = command {
                    vars.discover(*id);
                }
            }
        }

        vars.discover_menu(&config.menu, bus);
        vars
    }

    /// Current value of a variable, 0 when the id is unknown.
    pub fn get(&self, id: char) -> i32 {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map_or(0, |slot| slot.value)
    }

    /// Couple the table to a register bus for writing.
    pub fn bind<'a, B: RegisterBus>(&'a mut self, bus: &'a mut B) -> BoundVars<'a, B> {
        BoundVars { vars: self, bus }
    }

    /// Ensure a slot exists for `id`, keeping an existing one untouched.
    fn discover(&mut self, id: char) {
        if self.slots.iter().any(|slot| slot.id == id) {
            return;
        }
        self.slots.push(Variable {
            id,
            value: 0,
            has_default: false,
        });
    }

    fn discover_menu(&mut self, menu: &MenuNode, bus: &mut impl RegisterBus) {
        for entry in &menu.entries {
            match entry {
                MenuEntry::Submenu(node) => self.discover_menu(node, bus),
                MenuEntry::List(list) => self.discover_list(list, bus),
                _ => {}
            }
        }
    }

    /// Apply a list default: adopted and pushed only if no earlier list
    /// has claimed the id.
    fn discover_list(&mut self, list: &List, bus: &mut impl RegisterBus) {
        if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == list.id) {
            if !slot.has_default {
                slot.value = list.default;
                slot.has_default = true;
                bus.set_value(list.id, list.default as u8);
            }
            return;
        }

        self.slots.push(Variable {
            id: list.id,
            value: list.default,
            has_default: true,
        });
        bus.set_value(list.id, list.default as u8);
    }
}

/// Variable table coupled to a register bus.
///
/// Lives only for the duration of a write; obtained through
/// [`Variables::bind`].
pub struct BoundVars<'a, B: RegisterBus> {
    vars: &'a mut Variables,
    bus: &'a mut B,
}

impl<B: RegisterBus> core::fmt::Debug for BoundVars<'_, B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoundVars")
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}

impl<B: RegisterBus> VarStore for BoundVars<'_, B> {
    fn get(&self, id: char) -> i32 {
        self.vars.get(id)
    }

    fn set(&mut self, id: char, value: i32) {
        let Some(slot) = self.vars.slots.iter_mut().find(|slot| slot.id == id) else {
            return;
        };
        if slot.value == value {
            return;
        }
        slot.value = value;
        self.bus.set_value(id, value as u8);
    }

    fn ids(&self) -> Vec<char> {
        self.vars.slots.iter().map(|slot| slot.id).collect()
    }
}
