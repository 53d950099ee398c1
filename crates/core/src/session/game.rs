//! The idle game shell (`game1 > `).

use anyhow::Result;
use tracing::warn;

use super::{
    machine::Services,
    state::{Mode, Transition},
};
use crate::{
    command::Invocation,
    console::{Color, Terminal},
    economy::{format_amount, Effect},
};

const MOD_MENU_LISTING: &str = "Mod Menu - 120000 Coins (ID: mod)";

/// Greet the player and hand the terminal to the game.
pub(crate) fn enter(term: &mut dyn Terminal) -> Result<Transition> {
    term.write_line("Entered Game 1! (Save with data save, or progress is lost after a reboot/shutdown)")?;
    Ok(Transition::To(Mode::GameShell))
}

pub(crate) fn step(services: &mut Services, term: &mut dyn Terminal) -> Result<Transition> {
    term.write("game1 > ")?;
    let line = term.read_line()?;

    let Some(invocation) = Invocation::parse(&line).filter(|_| !line.starts_with(' ')) else {
        let delta = services.economy.earn();
        term.write_line(&format!("+{} Coins", format_amount(delta)))?;
        return Ok(Transition::Stay);
    };

    match invocation.head.as_str() {
        "bal" | "balance" => term.write_line(&services.economy.balance_report())?,
        "data" => data(services, term, invocation.arg(0))?,
        "shop" => shop(services, term, invocation.arg(0))?,
        "buy" => buy(services, term, invocation.arg(0))?,
        "tutorial" | "guides" => {
            if invocation.head == "tutorial" && invocation.arg(0) == Some("1") {
                term.write_line("Press Enter on an empty line to earn coins.")?;
                term.write_line("The command bal or balance is to display the current amount of coins you have.")?;
                term.write_line("The shop command shows things to buy, and the buy command buys a thing (ID)")?;
                term.write_line("data save and data load keep your coins between runs.")?;
            } else {
                term.write_colored(
                    Color::Red,
                    "Failed. Current Pages in tutorial: 1, Current Pages in guides: 0",
                )?;
                services.economy.earn();
            }
        }
        "exit" => {
            term.write_line("Exiting the game (Unsaved data will be erased after a session end)")?;
            return Ok(Transition::To(Mode::shell()));
        }
        _ => term.write_line(
            "Invalid Command, Use the command tutorial for commands (or guides for some guides)",
        )?,
    }
    Ok(Transition::Stay)
}

fn data(services: &mut Services, term: &mut dyn Terminal, action: Option<&str>) -> Result<()> {
    let path = services.config.game_data_file.clone();
    match action {
        Some("save") => match services.economy.save(&*services.storage, &path) {
            Ok(()) => term.write_line("Game data saved successfully."),
            Err(err) => {
                warn!(path = %path, ?err, "economy save failed");
                term.write_colored(Color::Red, &format!("Error writing to file '{path}': {err}"))
            }
        },
        Some("load") => {
            services.economy.load(&*services.storage, &path);
            let state = services.economy.state();
            term.write_line(&format!(
                "Data Loaded: Coins={}, GetCoinsValue={}, GetCoinsMulti={}",
                format_amount(state.balance),
                format_amount(state.yield_base),
                format_amount(state.yield_multiplier)
            ))
        }
        _ => term.write_line("Usage: data <save|load>"),
    }
}

fn shop(services: &Services, term: &mut dyn Terminal, page: Option<&str>) -> Result<()> {
    if !matches!(page, None | Some("1")) {
        return term.write_colored(
            Color::Red,
            "Invalid Shop Pages / Shop Argument. Current Pages in shop: 1",
        );
    }
    for line in services.economy.catalog().listing() {
        term.write_line(&line)?;
    }
    term.write_line(MOD_MENU_LISTING)
}

fn buy(services: &mut Services, term: &mut dyn Terminal, id: Option<&str>) -> Result<()> {
    let Some(id) = id else {
        return term.write_colored(Color::Red, "Invalid ID");
    };

    if id == "mod" {
        term.write_line("In Progress...")?;
        services.economy.mod_menu_bonus();
        return Ok(());
    }

    let grants_key = services
        .economy
        .catalog()
        .get(id)
        .is_some_and(|upgrade| upgrade.effect == Effect::ProductKey);
    if grants_key && services.activation.is_activated() {
        return term.write_colored(Color::Red, "You already have a product key!");
    }

    match services.economy.purchase(id) {
        Ok(upgrade) => {
            term.write_line("Successful!")?;
            if upgrade.effect == Effect::ProductKey {
                let key = services.activation.instant_unlock(&mut services.rng);
                term.write_line(&format!("Your product key is: {key}"))?;
            }
            Ok(())
        }
        Err(err) => term.write_colored(Color::Red, &err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        activation::is_generated_shape, console::ScriptedConsole, economy::EconomyState,
        session::tests::services, storage::Storage,
    };

    fn run(services: &mut Services, lines: &[&str]) -> Result<(ScriptedConsole, Transition)> {
        let mut term = ScriptedConsole::new().lines(lines.iter().copied());
        let mut last = Transition::Stay;
        for _ in lines {
            last = step(services, &mut term)?;
        }
        Ok((term, last))
    }

    #[test]
    fn blank_and_space_lines_earn() -> Result<()> {
        let mut services = services();
        let (term, _) = run(&mut services, &["", " anything", "bal"])?;
        assert_eq!(services.economy.balance(), 2.0);
        assert!(term.transcript().contains("+1 Coins"));
        assert!(term.transcript().contains("You have 2 Coins."));
        Ok(())
    }

    #[test]
    fn purchase_needs_strictly_more_than_price() -> Result<()> {
        let mut services = services();
        services.economy = crate::economy::EconomyEngine::with_state(EconomyState {
            balance: 25.0,
            ..EconomyState::default()
        });
        let (term, _) = run(&mut services, &["buy 1", "", "buy 1"])?;
        assert!(term.transcript().contains("Not Enough Coins to buy this!"));
        assert!(term.transcript().contains("Successful!"));
        assert_eq!(services.economy.balance(), 1.0);
        assert!((services.economy.state().yield_multiplier - 2.03).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn product_key_purchase_activates_once() -> Result<()> {
        let mut services = services();
        services.economy = crate::economy::EconomyEngine::with_state(EconomyState {
            balance: 50_000.0,
            ..EconomyState::default()
        });
        let (term, _) = run(&mut services, &["buy 6", "buy 6"])?;
        assert!(services.activation.is_activated());
        assert!(is_generated_shape(services.activation.current_key()));
        assert!(term.transcript().contains("You already have a product key!"));
        assert_eq!(services.economy.balance(), 30_000.0);
        Ok(())
    }

    #[test]
    fn mod_menu_skips_price_check() -> Result<()> {
        let mut services = services();
        run(&mut services, &["buy mod"])?;
        assert!((services.economy.balance() - 10.4).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn unknown_ids_and_pages_are_reported() -> Result<()> {
        let mut services = services();
        let (term, _) = run(&mut services, &["buy 9", "buy", "shop 2", "dance"])?;
        let transcript = term.transcript();
        assert_eq!(transcript.matches("Invalid ID").count(), 2);
        assert!(transcript.contains("Current Pages in shop: 1"));
        assert!(transcript.contains("Invalid Command, Use the command tutorial"));
        assert_eq!(services.economy.balance(), 0.0);
        Ok(())
    }

    #[test]
    fn failed_tutorial_page_still_earns() -> Result<()> {
        let mut services = services();
        let (term, _) = run(&mut services, &["tutorial 1", "guides 1"])?;
        assert!(term.transcript().contains("bal or balance"));
        assert_eq!(services.economy.balance(), 1.0);
        Ok(())
    }

    #[test]
    fn shop_lists_catalog_and_mod_menu() -> Result<()> {
        let mut services = services();
        let (term, _) = run(&mut services, &["shop"])?;
        let transcript = term.transcript();
        assert!(transcript.contains("+1.03x coin multiplier - 25 coins (ID: 1)"));
        assert!(transcript.contains("Product Key - 20000 coins (ID: 6)"));
        assert!(transcript.contains(MOD_MENU_LISTING));
        Ok(())
    }

    #[test]
    fn save_and_load_through_storage() -> Result<()> {
        let mut services = services();
        let (_, _) = run(&mut services, &["", "", "data save"])?;
        let saved = services.storage.read_file("game1data.txt")?;
        assert_eq!(saved.as_deref(), Some("Coins:2\nGetCoinsValue:1\nGetCoinsMulti:1"));

        let (term, last) = run(&mut services, &["", "data load", "exit"])?;
        assert_eq!(services.economy.balance(), 2.0);
        assert!(term
            .transcript()
            .contains("Data Loaded: Coins=2, GetCoinsValue=1, GetCoinsMulti=1"));
        assert_eq!(last, Transition::To(Mode::shell()));
        Ok(())
    }
}
