//! The normal command shell and its built-in commands.

use anyhow::Result;
use chrono::Local;
use once_cell::sync::Lazy;
use tracing::{debug, info};

use super::{
    game,
    machine::Services,
    manual,
    rescue,
    state::{BootStage, BootTarget, LoginStage, Mode, ShellPrompt, Transition},
};
use crate::{
    activation::Redeem,
    command::{CommandRegistry, CommandSpec, Invocation},
    console::{Color, Terminal},
    economy::format_amount,
    error::CommandError,
    identity::{Identity, Switch},
};

/// Signature every built-in command is dispatched through.
pub(crate) type CommandFn = fn(&mut Services, &mut dyn Terminal, &Invocation) -> Result<Transition>;

/// Built-in commands, in help-page order.
pub(crate) static COMMANDS: Lazy<CommandRegistry<CommandFn>> = Lazy::new(builtin_commands);

fn command(name: &'static str, handler: CommandFn) -> CommandSpec<CommandFn> {
    CommandSpec::new(name, handler)
}

fn builtin_commands() -> CommandRegistry<CommandFn> {
    let mut registry = CommandRegistry::new();
    registry
        .register(
            command("help", help)
                .aliases(&["cmds"])
                .help(1, "<page>", "Shows the Commands"),
        )
        .register(command("iptv", iptv).help(1, "", "i need IPTV"))
        .register(command("metamask", metamask).help(1, "", "Metamask wallet got hacked"))
        .register(command("echo", echo).help(
            1,
            "<text>",
            "Print the same thing you sent in the second argument",
        ))
        .register(
            command("clear", clear)
                .aliases(&["minireboot"])
                .help(1, "", "Clears the terminal"),
        )
        .register(command("grub", grub).help(
            1,
            "[--noclearafter]",
            "Displays the fake Welcome to GRUB! screen",
        ))
        .register(command("grubrescue", grubrescue).help(
            1,
            "",
            "Displays the fake grub rescue screen (interactive)",
        ))
        .register(command("root", root).help(1, "", "R00t"))
        .register(command("blankspaces", blankspaces).help(
            1,
            "",
            "The Amount of Blankspaces commands you have used on this current session",
        ))
        .register(command("46", number_46).help(1, "", "The Number 46"))
        .register(command("92", number_92).help(1, "", "The Number 92"))
        .register(command("93", number_93).help(1, "", "The Number 93"))
        .register(command("game1", game1).help(1, "", "Game 1"))
        .register(command("productman", productman).help(
            1,
            "[--deactivate]",
            "A wizard for activating your current Lebirun Session",
        ))
        .register(
            command("logout", logout)
                .aliases(&["logoff"])
                .help(1, "", "Logs out the user"),
        )
        .register(command("whoami", whoami).help(
            1,
            "",
            "Sends the username of current logged in user",
        ))
        .register(command("su", su).help(
            1,
            "<root|user|prv>",
            "Switches to another user without having to fully logout (use su prv to go back to the previous user)",
        ))
        .register(command("website", website).help(1, "", "Outputs the lebirun website link"))
        .register(command("infofetch", infofetch).help(1, "", "Outputs some of the OS Info"))
        .register(
            command("knowledge", knowledge)
                .aliases(&["man"])
                .help(2, "<command>", "Get info about a specific command"),
        )
        .register(
            command("shutdown", shutdown)
                .aliases(&["poweroff"])
                .privilege(Identity::Root)
                .help(2, "", "Shuts down the computer"),
        )
        .register(
            command("reboot", reboot)
                .aliases(&["restart"])
                .privilege(Identity::Root)
                .help(2, "", "Shuts down the computer, and then starts it again."),
        )
        .register(command("vga", vga).help(2, "", "Display GUI"))
        .register(command("unknown1", unknown1))
        .register(command("rm", rm));
    registry
}

pub(crate) fn step(
    services: &mut Services,
    term: &mut dyn Terminal,
    prompt: ShellPrompt,
) -> Result<Transition> {
    match prompt {
        ShellPrompt::Command => command_prompt(services, term),
        ShellPrompt::SuPassword { target } => su_password(services, term, target),
        ShellPrompt::ProductKey => product_key(services, term),
    }
}

fn command_prompt(services: &mut Services, term: &mut dyn Terminal) -> Result<Transition> {
    term.set_foreground(Color::Gray)?;
    term.write(&format!(
        "{}@{} >> ",
        services.privilege.current(),
        services.config.host_name
    ))?;
    term.set_foreground(Color::White)?;
    let line = term.read_line()?;

    let Some(invocation) = Invocation::parse(&line).filter(|_| !line.starts_with(' ')) else {
        services.blank_lines += 1;
        return Ok(Transition::Stay);
    };

    run_command(services, term, &invocation)
}

/// Resolve `invocation` against the command table for the current identity
/// and run it; lookup and permission failures are printed in red.
pub(crate) fn run_command(
    services: &mut Services,
    term: &mut dyn Terminal,
    invocation: &Invocation,
) -> Result<Transition> {
    match COMMANDS.resolve(invocation, services.privilege.current()) {
        Ok(spec) => {
            debug!(command = spec.name, "running command");
            (spec.handler)(services, term, invocation)
        }
        Err(err) => {
            term.write_colored(Color::Red, &err.to_string())?;
            Ok(Transition::Stay)
        }
    }
}

fn su_password(
    services: &mut Services,
    term: &mut dyn Terminal,
    target: Identity,
) -> Result<Transition> {
    term.write(&format!("Password for {target}: "))?;
    let line = term.read_line()?;
    match services.privilege.escalate(target, Some(&line)) {
        Ok(Switch::Switched { to, .. }) => {
            term.write_line(&format!(
                "Successfully switched to {to}! Use su prv to switch to the previous user."
            ))?;
            Ok(Transition::To(Mode::shell()))
        }
        Ok(Switch::AlreadyActive) => {
            term.write_line(&format!("You are already {target}!"))?;
            Ok(Transition::To(Mode::shell()))
        }
        Err(_) if line.trim() == "n" => Ok(Transition::To(Mode::shell())),
        Err(_) => {
            term.write_line("Retry. If you dont want to continue then type n")?;
            Ok(Transition::Stay)
        }
    }
}

fn product_key(services: &mut Services, term: &mut dyn Terminal) -> Result<Transition> {
    term.write("Write the product key here: ")?;
    let line = term.read_line()?;
    match services.activation.redeem(&line) {
        Ok(Redeem::Activated(key)) => {
            term.write_line(&format!(
                "Activated successfully! Your current product key is: {key}"
            ))?;
            Ok(Transition::To(Mode::shell()))
        }
        Ok(Redeem::Cancelled) => Ok(Transition::To(Mode::shell())),
        Err(err) => {
            term.write_line(&err.to_string())?;
            Ok(Transition::Stay)
        }
    }
}

fn help(_: &mut Services, term: &mut dyn Terminal, invocation: &Invocation) -> Result<Transition> {
    let page = invocation.arg(0).unwrap_or("1");
    match page {
        "grub" => {
            term.write_line("Current GRUB Arguments:")?;
            term.write_line(
                "--noclearafter = Terminal wont clear after finishing displaying the Welcome to GRUB! text.",
            )?;
        }
        "productman" => {
            term.write_line("Current Productman Arguments:")?;
            term.write_line(
                "--deactivate = Makes the system be no longer activated, which resets the product key to none.",
            )?;
        }
        _ => {
            let pages = COMMANDS.help_page_count();
            match page.parse::<u8>() {
                Ok(number) if (1..=pages).contains(&number) => {
                    if number == 1 {
                        term.write_line("List of Commands:")?;
                    } else {
                        term.write_line(&format!("List of commands (Page {number}):"))?;
                    }
                    for line in COMMANDS.help_lines(number) {
                        term.write_line(&line)?;
                    }
                }
                _ => term.write_colored(
                    Color::Red,
                    &format!(
                        "Invalid Help/Cmds Page. The Current Pages in Help/Cmds are: {pages}. \
                         If you want info about a specific command, then type man <command> \
                         (not all commands have arguments)"
                    ),
                )?,
            }
        }
    }
    Ok(Transition::Stay)
}

fn iptv(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line("i need IPTV ASAP!!!")?;
    Ok(Transition::Stay)
}

fn metamask(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line("Metamask Wallet got Hacked")?;
    Ok(Transition::Stay)
}

fn echo(_: &mut Services, term: &mut dyn Terminal, invocation: &Invocation) -> Result<Transition> {
    term.write_colored(Color::Green, &invocation.tail)?;
    Ok(Transition::Stay)
}

fn clear(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.clear()?;
    Ok(Transition::Stay)
}

fn grub(services: &mut Services, term: &mut dyn Terminal, invocation: &Invocation) -> Result<Transition> {
    term.clear()?;
    term.set_background(Color::White)?;
    term.set_foreground(Color::Black)?;
    term.write_line("Welcome to GRUB!")?;
    term.reset_colors()?;
    term.pause(services.config.grub_splash())?;
    if !invocation.has_flag("noclearafter") {
        term.clear()?;
    }
    Ok(Transition::Stay)
}

fn grubrescue(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    rescue::enter(term)
}

fn root(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line("R00T@K4L1 R00T@UBUNTU R00T@D3B14N")?;
    Ok(Transition::Stay)
}

fn blankspaces(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line(&format!(
        "{} is the Amount of blankspaces you used in this session!",
        services.blank_lines
    ))?;
    Ok(Transition::Stay)
}

fn unknown1(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    for _ in 0..15 {
        term.write_line(".")?;
        term.write_line(".")?;
        term.write(".")?;
    }
    term.write_line("")?;
    Ok(Transition::Stay)
}

fn rm(_: &mut Services, term: &mut dyn Terminal, invocation: &Invocation) -> Result<Transition> {
    let lines: &[&str] = match invocation.tail.trim_end() {
        "-rf /*" => &[
            "rm: it is dangerous to operate recursively on '/'",
            "rm: use --no-preserve-root to override this failsafe",
        ],
        "-rf /* --no-preserve-root" => &[
            "rm: could not remove /tmp: Device or resource busy",
            "rm: could not remove /dev/sda: Device or resource busy",
        ],
        "-rvf /* --no-preserve-root" => &[
            "Deleted /boot succesfully",
            "rm: could not remove /dev/sda: Device or resource busy",
            "Deleted /home succesfully",
        ],
        _ => {
            let err = CommandError::Unknown(invocation.head.clone());
            term.write_colored(Color::Red, &err.to_string())?;
            return Ok(Transition::Stay);
        }
    };
    for line in lines {
        term.write_line(line)?;
    }
    Ok(Transition::Stay)
}

fn number_46(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_colored(Color::Green, "The Number 46")?;
    Ok(Transition::Stay)
}

fn number_92(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_colored(Color::Blue, "The Number 92")?;
    Ok(Transition::Stay)
}

fn number_93(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_colored(Color::Red, "The Number 93")?;
    Ok(Transition::Stay)
}

fn game1(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    game::enter(term)
}

fn vga(_: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.clear()?;
    Ok(Transition::To(Mode::GuiShell))
}

fn whoami(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line(services.privilege.current().name())?;
    Ok(Transition::Stay)
}

fn logout(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.clear()?;
    term.write_line("Logging off...")?;
    term.pause(services.config.logout_pause())?;
    term.clear()?;
    info!(identity = %services.privilege.current(), "logged off");
    Ok(Transition::To(Mode::Boot(BootStage::Login(
        LoginStage::Identity {
            then: BootTarget::Normal,
        },
    ))))
}

fn su(services: &mut Services, term: &mut dyn Terminal, invocation: &Invocation) -> Result<Transition> {
    let current = services.privilege.current();
    match invocation.arg(0) {
        Some("prv") => match services.privilege.revert_to_previous() {
            Switch::AlreadyActive => term.write_line("You are already the previous user!")?,
            Switch::Switched { .. } => {
                term.write_line("Successfully switched to the previous user!")?
            }
        },
        Some(name) => match services.privilege.resolve(name) {
            Ok(target) if target == current => {
                term.write_line(&format!("You are already {target}!"))?
            }
            Ok(target) if target.requires_password() => {
                return Ok(Transition::To(Mode::NormalShell(ShellPrompt::SuPassword {
                    target,
                })));
            }
            Ok(target) => match services.privilege.escalate(target, None) {
                Ok(_) => term.write_line(&format!(
                    "Successfully switched to {target}! Use su prv to switch to the previous user."
                ))?,
                Err(err) => term.write_line(&err.to_string())?,
            },
            Err(err) => term.write_line(&err.to_string())?,
        },
        None => term.write_line("Usage: su <root|user|prv>")?,
    }
    Ok(Transition::Stay)
}

fn website(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line(&format!("-> {}", services.config.website))?;
    Ok(Transition::Stay)
}

fn infofetch(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    let uptime = Local::now().signed_duration_since(services.started_at);
    term.write_line(&format!("Version: Lebirun {}", services.config.version))?;
    term.write_line(&format!("User: {}@{}", services.privilege.current(), services.config.host_name))?;
    term.write_line(&format!(
        "Game 1 Coins: {}",
        format_amount(services.economy.balance())
    ))?;
    term.write_line(&format!("Product Key: {}", services.activation.current_key()))?;
    term.write_line(&format!(
        "Uptime: {}h {}m {}s (since {})",
        uptime.num_hours(),
        uptime.num_minutes() % 60,
        uptime.num_seconds() % 60,
        services.started_at.format("%Y-%m-%d %H:%M:%S")
    ))?;
    Ok(Transition::Stay)
}

fn productman(
    services: &mut Services,
    term: &mut dyn Terminal,
    invocation: &Invocation,
) -> Result<Transition> {
    if invocation.has_flag("deactivate") {
        match services.activation.deactivate() {
            Ok(()) => term.write_line("Successfully deactivated the system!")?,
            Err(err) => term.write_line(&err.to_string())?,
        }
        return Ok(Transition::Stay);
    }
    if services.activation.is_activated() {
        term.write_line("You already have a product key!")?;
        return Ok(Transition::Stay);
    }
    if invocation.has_flag("crack") {
        term.write_line("Activating...")?;
        let key = services.activation.instant_unlock(&mut services.rng);
        term.write_line(&format!("Activated! Current Product Key is: {key}"))?;
        return Ok(Transition::Stay);
    }
    Ok(Transition::To(Mode::NormalShell(ShellPrompt::ProductKey)))
}

fn knowledge(
    services: &mut Services,
    term: &mut dyn Terminal,
    invocation: &Invocation,
) -> Result<Transition> {
    let Some(topic) = invocation.arg(0).map(str::to_lowercase) else {
        return Ok(manual::enter(services, None));
    };
    if services.pager.has_topic(&topic) {
        return Ok(manual::enter(services, Some(&topic)));
    }
    let reply = match topic.as_str() {
        "knowledge" | "man" => "Dude.",
        "root" => "No need to explain, because it just prints a text.",
        known if COMMANDS.contains(known) => "No need to explain.",
        _ => "Unknown knowledge command.",
    };
    term.write_line(reply)?;
    Ok(Transition::Stay)
}

fn shutdown(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line("Shutting down...")?;
    services.power.shutdown();
    Ok(Transition::Stay)
}

fn reboot(services: &mut Services, term: &mut dyn Terminal, _: &Invocation) -> Result<Transition> {
    term.write_line("Rebooting...")?;
    services.power.reboot();
    Ok(Transition::Stay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        power::{PowerAction, PowerLatch},
        session::{
            tests::{run, shell_as, shell_with_latch},
            ModeKind,
        },
    };

    #[test]
    fn blank_lines_are_counted() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["", "  whoami", "blankspaces"])?;
        assert!(out.contains("2 is the Amount of blankspaces"));
        assert_eq!(machine.blank_lines(), 2);
        Ok(())
    }

    #[test]
    fn prompt_shows_identity_and_host() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["whoami"])?;
        assert_eq!(out, "user@lebirun >> whoami\nuser\n");
        Ok(())
    }

    #[test]
    fn unknown_command_is_reported_in_red() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["iptvv"])?;
        assert!(out.contains("Invalid IPTV Command. Type help or cmds for the list of commands."));
        assert_eq!(term.foreground(), Some(Color::White));
        assert_eq!(machine.mode(), Mode::shell());
        Ok(())
    }

    #[test]
    fn echo_keeps_raw_tail() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["echo  Hi   there"])?;
        assert!(out.ends_with("Hi   there\n"));
        Ok(())
    }

    #[test]
    fn rm_answers_only_the_known_invocations() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["rm -rf /*"])?;
        assert!(out.ends_with(
            "rm: it is dangerous to operate recursively on '/'\n\
             rm: use --no-preserve-root to override this failsafe\n"
        ));

        let out = run(&mut machine, &mut term, &["rm -rf /* --no-preserve-root"])?;
        assert!(out.contains("rm: could not remove /tmp: Device or resource busy"));

        let out = run(&mut machine, &mut term, &["rm -rvf /* --no-preserve-root"])?;
        assert!(out.contains("Deleted /boot succesfully"));
        assert!(out.ends_with("Deleted /home succesfully\n"));

        let out = run(&mut machine, &mut term, &["rm notes.txt"])?;
        assert!(out.contains("Invalid IPTV Command."));
        assert_eq!(machine.mode(), Mode::shell());
        Ok(())
    }

    #[test]
    fn help_pages_are_generated() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["help"])?;
        assert!(out.contains("List of Commands:"));
        assert!(out.contains("clear / minireboot = Clears the terminal"));
        assert!(!out.contains("unknown1"));

        let out = run(&mut machine, &mut term, &["cmds 2", "help 3", "help grub"])?;
        assert!(out.contains("List of commands (Page 2):"));
        assert!(out.contains("knowledge / man <command> = Get info about a specific command"));
        assert!(out.contains("The Current Pages in Help/Cmds are: 2."));
        assert!(out.contains("Current GRUB Arguments:"));
        Ok(())
    }

    #[test]
    fn su_root_prompts_until_right_password_or_cancel() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["su root", "guess", "n"])?;
        assert!(out.contains("Password for root: "));
        assert!(out.contains("Retry. If you dont want to continue then type n"));
        assert_eq!(machine.mode(), Mode::shell());
        assert_eq!(machine.privilege().current(), Identity::User);

        let out = run(&mut machine, &mut term, &["su root", "admin", "whoami"])?;
        assert!(out.contains("Successfully switched to root!"));
        assert!(out.ends_with("root\n"));
        assert_eq!(machine.privilege().previous(), Identity::User);
        Ok(())
    }

    #[test]
    fn su_prv_swaps_back_and_forth() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::Root)?;
        let out = run(&mut machine, &mut term, &["su prv", "su user", "su prv", "su prv"])?;
        assert!(out.contains("You are already the previous user!"));
        assert!(out.contains("Successfully switched to user!"));
        assert_eq!(out.matches("Successfully switched to the previous user!").count(), 2);
        assert_eq!(machine.privilege().current(), Identity::User);
        assert_eq!(machine.privilege().previous(), Identity::Root);
        Ok(())
    }

    #[test]
    fn power_commands_need_root() -> Result<()> {
        let latch = PowerLatch::new();
        let (mut machine, mut term) = shell_with_latch(Identity::User, latch.clone())?;
        let out = run(&mut machine, &mut term, &["reboot"])?;
        assert!(out.contains("Permission denied: reboot requires root."));
        assert_eq!(latch.requested(), None);

        run(&mut machine, &mut term, &["su root", "admin", "poweroff"])?;
        assert_eq!(latch.take(), Some(PowerAction::Shutdown));
        Ok(())
    }

    #[test]
    fn productman_wizard_and_flags() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(
            &mut machine,
            &mut term,
            &["productman --deactivate", "productman", "BOGUS", "N"],
        )?;
        assert!(out.contains("You dont have any product key!"));
        assert!(out.contains("Activation was unsuccessful."));
        assert!(!machine.activation().is_activated());
        assert_eq!(machine.mode(), Mode::shell());

        let out = run(
            &mut machine,
            &mut term,
            &["productman", "SK39K2-KS9-M39L", "productman --crack"],
        )?;
        assert!(out.contains("Your current product key is: SK39K2-KS9-M39L"));
        assert!(out.contains("You already have a product key!"));

        let out = run(
            &mut machine,
            &mut term,
            &["productman --deactivate", "productman --crack"],
        )?;
        assert!(out.contains("Successfully deactivated the system!"));
        assert!(out.contains("Activated! Current Product Key is: "));
        assert!(crate::activation::is_generated_shape(
            machine.activation().current_key()
        ));
        Ok(())
    }

    #[test]
    fn knowledge_routes_to_pager_or_replies() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(
            &mut machine,
            &mut term,
            &["knowledge whoami", "man man", "knowledge bogus"],
        )?;
        assert!(out.contains("No need to explain."));
        assert!(out.contains("Dude."));
        assert!(out.contains("Unknown knowledge command."));

        run(&mut machine, &mut term, &["knowledge su"])?;
        assert_eq!(machine.mode_kind(), ModeKind::ManPager);
        assert_eq!(machine.pager().page_index(), 6);
        Ok(())
    }

    #[test]
    fn logout_returns_to_login_keeping_identity() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let out = run(&mut machine, &mut term, &["logoff"])?;
        assert!(out.contains("Logging off..."));
        assert_eq!(
            machine.mode(),
            Mode::Boot(BootStage::Login(LoginStage::Identity {
                then: BootTarget::Normal
            }))
        );
        assert_eq!(machine.privilege().current(), Identity::User);
        Ok(())
    }

    #[test]
    fn grub_splash_clears_unless_asked_not_to() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        let before = term.clears();
        run(&mut machine, &mut term, &["grub"])?;
        assert_eq!(term.clears() - before, 2);
        run(&mut machine, &mut term, &["grub --noclearafter"])?;
        assert_eq!(term.clears() - before, 3);
        Ok(())
    }

    #[test]
    fn mode_entry_commands() -> Result<()> {
        let (mut machine, mut term) = shell_as(Identity::User)?;
        run(&mut machine, &mut term, &["grubrescue"])?;
        assert_eq!(machine.mode_kind(), ModeKind::RescueConsole);
        run(&mut machine, &mut term, &["exit", "game1"])?;
        assert_eq!(machine.mode_kind(), ModeKind::GameShell);
        run(&mut machine, &mut term, &["exit", "vga"])?;
        assert_eq!(machine.mode_kind(), ModeKind::GuiShell);
        Ok(())
    }
}
