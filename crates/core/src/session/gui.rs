//! Desktop mode: one pointer frame per step.

use anyhow::Result;
use tracing::info;

use super::{
    machine::Services,
    shell,
    state::{Mode, Transition},
};
use crate::{
    command::Invocation,
    console::Terminal,
    desktop::{DesktopAction, MenuItem},
};

pub(crate) fn step(services: &mut Services, term: &mut dyn Terminal) -> Result<Transition> {
    let sample = term.sample_pointer()?;
    let action = services.desktop.frame(&sample);
    term.present(&services.desktop.scene(&sample))?;

    match action {
        DesktopAction::Idle | DesktopAction::MenuToggled(_) => Ok(Transition::Stay),
        DesktopAction::Leave | DesktopAction::Activate(MenuItem::Terminal) => {
            term.clear()?;
            Ok(Transition::To(Mode::shell()))
        }
        DesktopAction::Activate(item @ (MenuItem::Reboot | MenuItem::Shutdown)) => {
            // Power goes through the shell command so the root check applies.
            let command = match item {
                MenuItem::Reboot => "reboot",
                _ => "shutdown",
            };
            info!(command, "power requested from desktop");
            term.clear()?;
            if let Some(invocation) = Invocation::parse(command) {
                shell::run_command(services, term, &invocation)?;
            }
            Ok(Transition::To(Mode::shell()))
        }
    }
}
