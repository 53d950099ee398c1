//! Boot selector and login prompt.

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{debug, info};

use super::{
    machine::Services,
    state::{BootStage, BootTarget, LoginStage, Mode, Transition},
};
use crate::{
    console::{Color, Key, Terminal},
    identity::Identity,
};

pub(crate) fn step(
    services: &mut Services,
    term: &mut dyn Terminal,
    stage: BootStage,
) -> Result<Transition> {
    match stage {
        BootStage::Menu { selected } => menu(services, term, selected),
        BootStage::Login(LoginStage::Identity { then }) => identity_prompt(services, term, then),
        BootStage::Login(LoginStage::Password { identity, then }) => {
            password_prompt(services, term, identity, then)
        }
    }
}

fn menu(services: &mut Services, term: &mut dyn Terminal, selected: usize) -> Result<Transition> {
    let last = BootTarget::MENU.len() - 1;
    let selected = selected.min(last);

    term.set_foreground(Color::White)?;
    term.set_background(Color::Blue)?;
    term.clear()?;
    term.write_line("Lebirun Boot Menu")?;
    term.write_line("Use the arrow keys and Enter, or press the entry number.")?;
    term.write_line("")?;
    for (index, target) in BootTarget::MENU.iter().enumerate() {
        let marker = if index == selected { '>' } else { ' ' };
        term.write_line(&format!("{marker} {} | {}", target.label(), index + 1))?;
    }

    let moved = |selected: usize| -> Result<Transition> {
        Ok(Transition::To(Mode::Boot(BootStage::Menu { selected })))
    };
    match term.read_key()? {
        Key::Up => moved(selected.saturating_sub(1)),
        Key::Down => moved((selected + 1).min(last)),
        Key::Enter => start(services, term, BootTarget::MENU[selected]),
        Key::Char(ch) => match ch.to_digit(10).map(|digit| digit as usize) {
            Some(number) if (1..=BootTarget::MENU.len()).contains(&number) => {
                start(services, term, BootTarget::MENU[number - 1])
            }
            _ => Ok(Transition::Stay),
        },
        _ => Ok(Transition::Stay),
    }
}

fn start(services: &mut Services, term: &mut dyn Terminal, target: BootTarget) -> Result<Transition> {
    let config = &services.config;
    let (suffix, max_delay) = match target {
        BootTarget::Normal => ("", config.boot_delay_max_ms),
        BootTarget::Gui => (" - GUI Mode", config.gui_boot_delay_max_ms),
    };
    term.write_line(&format!("Starting Lebirun {}{suffix}", config.version))?;
    let delay = services.rng.gen_range(0..=max_delay);
    debug!(?target, delay_ms = delay, "booting");
    term.pause(Duration::from_millis(delay))?;
    term.reset_colors()?;
    term.clear()?;
    Ok(Transition::To(Mode::Boot(BootStage::Login(
        LoginStage::Identity { then: target },
    ))))
}

fn identity_prompt(
    services: &mut Services,
    term: &mut dyn Terminal,
    then: BootTarget,
) -> Result<Transition> {
    term.write("Write the user here: ")?;
    let name = term.read_line()?;
    let identity = match services.privilege.resolve(&name) {
        Ok(identity) => identity,
        Err(err) => {
            term.write_line(&err.to_string())?;
            return Ok(Transition::Stay);
        }
    };

    if identity.requires_password() {
        term.clear()?;
        return Ok(Transition::To(Mode::Boot(BootStage::Login(
            LoginStage::Password { identity, then },
        ))));
    }
    complete(services, term, identity, None, then)
}

fn password_prompt(
    services: &mut Services,
    term: &mut dyn Terminal,
    identity: Identity,
    then: BootTarget,
) -> Result<Transition> {
    term.write("Write the user password here: ")?;
    let password = term.read_line()?;
    complete(services, term, identity, Some(&password), then)
}

fn complete(
    services: &mut Services,
    term: &mut dyn Terminal,
    identity: Identity,
    credential: Option<&str>,
    then: BootTarget,
) -> Result<Transition> {
    match services.privilege.login(identity, credential) {
        Ok(identity) => {
            info!(identity = %identity, ?then, "session started");
            term.clear()?;
            term.write_line(&format!("Lebirun {}", services.config.version))?;
            term.write_line("Type help / cmds for the list of commands available!")?;
            Ok(Transition::To(then.mode()))
        }
        Err(err) => {
            term.write_line(&err.to_string())?;
            Ok(Transition::Stay)
        }
    }
}
