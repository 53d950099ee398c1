use anyhow::Result;
use lebirun_core::{
    desktop::MenuItem,
    identity::Identity,
    session::{BootStage, BootTarget, LoginStage, ShellPrompt},
    AppConfig, Key, MemoryStorage, Mode, ModeKind, PowerAction, PowerLatch, ScriptedConsole,
    SessionMachine,
};

struct Harness {
    machine: SessionMachine,
    term: ScriptedConsole,
    power: PowerLatch,
}

impl Harness {
    fn new() -> Self {
        Self::with_storage(MemoryStorage::new())
    }

    fn with_storage(storage: MemoryStorage) -> Self {
        let power = PowerLatch::new();
        let machine = SessionMachine::with_seed(
            AppConfig::default(),
            Box::new(storage.clone()),
            Box::new(power.clone()),
            2024,
        );
        Self {
            machine,
            term: ScriptedConsole::new(),
            power,
        }
    }

    fn key(&mut self, key: Key) -> Result<&mut Self> {
        self.term.push_key(key);
        self.machine.dispatch_one_step(&mut self.term)?;
        Ok(self)
    }

    fn lines(&mut self, lines: &[&str]) -> Result<&mut Self> {
        for line in lines {
            self.term.push_line(line);
            self.machine.dispatch_one_step(&mut self.term)?;
        }
        Ok(self)
    }

    fn pointer(&mut self, x: i32, y: i32, pressed: bool) -> Result<&mut Self> {
        self.term.push_pointer(lebirun_core::PointerSample {
            x,
            y,
            pressed,
            key: None,
        });
        self.machine.dispatch_one_step(&mut self.term)?;
        Ok(self)
    }

    /// Press without releasing, for clicks that leave the desktop.
    fn press(&mut self, x: i32, y: i32) -> Result<&mut Self> {
        self.pointer(x, y, true)
    }

    fn click(&mut self, x: i32, y: i32) -> Result<&mut Self> {
        self.pointer(x, y, true)?.pointer(x, y, false)
    }

    fn output(&mut self) -> String {
        self.term.take_transcript()
    }
}

#[test]
fn boot_login_and_first_commands() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Char('1'))?;
    assert_eq!(
        h.machine.mode(),
        Mode::Boot(BootStage::Login(LoginStage::Identity {
            then: BootTarget::Normal
        }))
    );

    h.lines(&["user", "whoami", "infofetch"])?;
    let out = h.output();
    assert!(out.contains("Lebirun 0.1.0 Beta 2\n"));
    assert!(out.contains("user@lebirun >> whoami\nuser\n"));
    assert!(out.contains("Game 1 Coins: 0"));
    assert!(out.contains("Product Key: none"));
    assert_eq!(h.machine.mode(), Mode::NormalShell(ShellPrompt::Command));
    Ok(())
}

#[test]
fn game_progress_survives_leaving_and_reentering() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Enter)?.lines(&["user", "game1"])?;
    assert_eq!(h.machine.mode_kind(), ModeKind::GameShell);

    // 26 earns at 1 coin each, so the balance strictly exceeds the price of 25.
    let earns = vec![""; 26];
    h.lines(&earns)?.lines(&["buy mult1", "exit", "game1", "bal"])?;
    let out = h.output();
    assert!(out.contains("Successful!"));
    assert!(out.contains("You have 1 Coins."));
    assert_eq!(h.machine.economy().balance(), 1.0);
    Ok(())
}

#[test]
fn saved_economy_reloads_in_a_fresh_session() -> Result<()> {
    let storage = MemoryStorage::new();
    let mut first = Harness::with_storage(storage.clone());
    first
        .key(Key::Enter)?
        .lines(&["user", "game1", "", "", "", "data save"])?;
    assert_eq!(
        storage.get("game1data.txt").as_deref(),
        Some("Coins:3\nGetCoinsValue:1\nGetCoinsMulti:1")
    );

    let mut second = Harness::with_storage(storage);
    second
        .key(Key::Enter)?
        .lines(&["user", "game1", "data load", "exit", "infofetch"])?;
    assert!(second.output().contains("Game 1 Coins: 3"));
    Ok(())
}

#[test]
fn corrupt_save_falls_back_to_defaults() -> Result<()> {
    let storage = MemoryStorage::new();
    storage.insert("game1data.txt", "Coins:-5\nGetCoinsValue:abc");
    let mut h = Harness::with_storage(storage);
    h.key(Key::Enter)?.lines(&["user", "game1", "data load"])?;
    assert!(h
        .output()
        .contains("Data Loaded: Coins=0, GetCoinsValue=1, GetCoinsMulti=1"));
    Ok(())
}

#[test]
fn escalation_and_revert_through_the_shell() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Enter)?
        .lines(&["user", "su root", "wrong", "admin"])?;
    assert_eq!(h.machine.privilege().current(), Identity::Root);
    assert_eq!(h.machine.privilege().previous(), Identity::User);

    h.lines(&["su prv", "su prv"])?;
    assert_eq!(h.machine.privilege().current(), Identity::Root);
    h.lines(&["su prv"])?;
    assert_eq!(h.machine.privilege().current(), Identity::User);
    Ok(())
}

#[test]
fn pager_round_trip_keeps_shell_state() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Enter)?.lines(&["user", "", "man grubrescue"])?;
    assert_eq!(h.machine.mode_kind(), ModeKind::ManPager);
    assert_eq!(h.machine.pager().page_index(), 3);

    h.key(Key::Right)?.key(Key::Right)?.key(Key::Right)?.key(Key::Right)?;
    assert_eq!(h.machine.pager().page_index(), 0);
    h.key(Key::Left)?;
    assert_eq!(h.machine.pager().page_index(), 6);

    h.key(Key::Char('q'))?.key(Key::Char('y'))?;
    assert_eq!(h.machine.mode(), Mode::NormalShell(ShellPrompt::Command));
    h.lines(&["blankspaces"])?;
    assert!(h.output().contains("1 is the Amount of blankspaces"));
    Ok(())
}

#[test]
fn gui_boot_reaches_desktop_and_reboots_as_root() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Down)?.key(Key::Enter)?.lines(&["root", "admin"])?;
    assert_eq!(h.machine.mode_kind(), ModeKind::GuiShell);

    assert!(!h.machine.desktop().menu_open());
    h.click(20, 460)?;
    assert!(h.machine.desktop().menu_open());

    let reboot = MenuItem::Reboot.region();
    h.press(reboot.x + 10, reboot.y + 10)?;
    assert_eq!(h.power.take(), Some(PowerAction::Reboot));
    assert!(!h.machine.desktop().menu_open());
    assert_eq!(h.machine.mode(), Mode::NormalShell(ShellPrompt::Command));
    assert!(!h.term.scenes().is_empty());
    Ok(())
}

#[test]
fn desktop_power_items_are_refused_for_user() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Down)?.key(Key::Enter)?.lines(&["user"])?;
    h.click(20, 460)?;

    let shutdown = MenuItem::Shutdown.region();
    h.press(shutdown.x + 10, shutdown.y + 10)?;
    assert_eq!(h.power.requested(), None);
    assert!(h
        .output()
        .contains("Permission denied: shutdown requires root."));
    assert_eq!(h.machine.mode(), Mode::NormalShell(ShellPrompt::Command));
    Ok(())
}

#[test]
fn rescue_console_exits_back_to_shell() -> Result<()> {
    let mut h = Harness::new();
    h.key(Key::Enter)?
        .lines(&["user", "grubrescue", "help", "exit", "whoami"])?;
    let out = h.output();
    assert!(out.contains("grub rescue >> help\nInvalid GRUB Command"));
    assert!(out.contains("Goodbye!"));
    assert!(out.ends_with("user\n"));
    Ok(())
}
