//! Action command interpreter.
//!
//! An action is an ordered command list run synchronously and to
//! completion: register writes, delays, settings load/save, hiding the
//! display, and links to other actions. Links recurse with a depth limit
//! so a document whose actions link in a cycle cannot take the stack
//! down with it.

use super::Menu;
use crate::config::Command;
use crate::ports::{Osd, RegisterBus, Settings, Storage, Ticker};
use crate::vars::VarStore;

/// Most deeply nested chain of `link` commands an action run will follow.
const MAX_LINK_DEPTH: u32 = 16;

impl<'cfg, S, D, P, O, T> Menu<'cfg, S, D, P, O, T>
where
    S: RegisterBus,
    D: Storage,
    P: Settings,
    O: Osd,
    T: Ticker,
{
    /// Run the named action, if the document defines it.
    ///
    /// Lookup is ASCII case-insensitive and returns the first action
    /// carrying the name. An unknown name does nothing.
    pub fn run_action_by_name(&mut self, name: &str) {
        self.run_action(name, 0);
    }

    fn run_action(&mut self, name: &str, depth: u32) {
        if depth >= MAX_LINK_DEPTH {
            log::error!("action '{}': link depth limit reached", name);
            return;
        }

        let cfg = self.cfg;
        let Some(action) = cfg.action(name) else {
            log::debug!("action '{}' is not defined", name);
            return;
        };

        log::debug!("action '{}'", name);
        for command in &action.commands {
            self.run_command(command, depth);
        }
    }

    fn run_command(&mut self, command: &Command, depth: u32) {
        match command {
            Command::Set { id, value } => {
                log::trace!("set {} = {}", id, value);
                self.vars.bind(&mut self.sys).set(*id, i32::from(*value));
            }

            Command::Delay { ms } => {
                log::trace!("delay {} ms", ms);
                self.ticker.delay_ms(*ms);
            }

            Command::Load { file } => {
                let mut bound = self.vars.bind(&mut self.sys);
                if let Err(err) = self.settings.load(file.as_deref(), &mut bound) {
                    log::debug!("settings load failed ({:?}), using defaults", err);
                    self.settings.apply_defaults();
                }
            }

            Command::Save { file } => {
                let bound = self.vars.bind(&mut self.sys);
                if let Err(err) = self.settings.save(file.as_deref(), &bound) {
                    log::warn!("settings save failed: {:?}", err);
                }
            }

            Command::Hide => {
                log::trace!("hide osd");
                self.osd.set_visible(false);
            }

            Command::Link { action } => {
                log::trace!("link '{}'", action);
                self.run_action(action, depth + 1);
            }
        }
    }
}
