//! Fake GRUB rescue console.

use anyhow::Result;

use super::{
    machine::Services,
    state::{Mode, Transition},
};
use crate::console::Terminal;

/// Clear the screen and print the rescue banner.
pub(crate) fn enter(term: &mut dyn Terminal) -> Result<Transition> {
    term.clear()?;
    term.write_line("GRUB Rescue Environment (Fake)")?;
    term.write_line("")?;
    term.write_line("")?;
    Ok(Transition::To(Mode::RescueConsole))
}

pub(crate) fn step(_services: &mut Services, term: &mut dyn Terminal) -> Result<Transition> {
    term.write("grub rescue >> ")?;
    let line = term.read_line()?;
    match line.trim() {
        "grub2cmds" => {
            term.write_line("Current GRUB Commands:")?;
            term.write_line("exit - Exits the grubrescue environment")?;
            Ok(Transition::Stay)
        }
        "exit" => {
            term.write_line("Goodbye!")?;
            Ok(Transition::To(Mode::shell()))
        }
        _ => {
            term.write_line("Invalid GRUB Command")?;
            Ok(Transition::Stay)
        }
    }
}
