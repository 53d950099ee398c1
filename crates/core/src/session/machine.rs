//! Mode routing and the services shared by every mode.

use anyhow::Result;
use chrono::{DateTime, Local};
use rand::{rngs::StdRng, SeedableRng};
use tracing::debug;

use super::{
    boot, game, gui, manual, rescue, shell,
    state::{Mode, ModeKind, Transition},
};
use crate::{
    activation::Activation,
    config::AppConfig,
    console::Terminal,
    desktop::DesktopShell,
    economy::EconomyEngine,
    identity::PrivilegeManager,
    pager::{builtin_pages, Pager},
    power::Power,
    storage::Storage,
};

/// State shared by every mode; survives mode changes for the whole run.
pub(crate) struct Services {
    pub(crate) config: AppConfig,
    pub(crate) privilege: PrivilegeManager,
    pub(crate) economy: EconomyEngine,
    pub(crate) activation: Activation,
    pub(crate) pager: Pager,
    pub(crate) pager_notice: Option<String>,
    pub(crate) desktop: DesktopShell,
    pub(crate) blank_lines: u64,
    pub(crate) started_at: DateTime<Local>,
    pub(crate) storage: Box<dyn Storage + Send>,
    pub(crate) power: Box<dyn Power + Send>,
    pub(crate) rng: StdRng,
}

impl Services {
    pub(crate) fn new(
        config: AppConfig,
        storage: Box<dyn Storage + Send>,
        power: Box<dyn Power + Send>,
        rng: StdRng,
    ) -> Self {
        Self {
            privilege: PrivilegeManager::new(config.root_password.clone()),
            economy: EconomyEngine::new(),
            activation: Activation::new(),
            pager: Pager::new(builtin_pages(), config.pager_visible_lines),
            pager_notice: None,
            desktop: DesktopShell::new(),
            blank_lines: 0,
            started_at: Local::now(),
            storage,
            power,
            rng,
            config,
        }
    }
}

/// Routes each unit of input to the one mode that owns the terminal.
pub struct SessionMachine {
    mode: Mode,
    services: Services,
}

impl SessionMachine {
    /// Fresh session at the boot menu, nobody logged in.
    pub fn new(
        config: AppConfig,
        storage: Box<dyn Storage + Send>,
        power: Box<dyn Power + Send>,
    ) -> Self {
        Self::with_rng(config, storage, power, StdRng::from_entropy())
    }

    /// Like [`SessionMachine::new`] with a deterministic random source.
    pub fn with_seed(
        config: AppConfig,
        storage: Box<dyn Storage + Send>,
        power: Box<dyn Power + Send>,
        seed: u64,
    ) -> Self {
        Self::with_rng(config, storage, power, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: AppConfig,
        storage: Box<dyn Storage + Send>,
        power: Box<dyn Power + Send>,
        rng: StdRng,
    ) -> Self {
        Self {
            mode: Mode::INITIAL,
            services: Services::new(config, storage, power, rng),
        }
    }

    /// Active mode with its payload.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Active mode tag.
    pub fn mode_kind(&self) -> ModeKind {
        self.mode.kind()
    }

    /// Current and previous identity.
    pub fn privilege(&self) -> &PrivilegeManager {
        &self.services.privilege
    }

    /// Game economy.
    pub fn economy(&self) -> &EconomyEngine {
        &self.services.economy
    }

    /// Activation state.
    pub fn activation(&self) -> &Activation {
        &self.services.activation
    }

    /// Manual pager.
    pub fn pager(&self) -> &Pager {
        &self.services.pager
    }

    /// Desktop state.
    pub fn desktop(&self) -> &DesktopShell {
        &self.services.desktop
    }

    /// Blank lines typed at the shell this run.
    pub fn blank_lines(&self) -> u64 {
        self.services.blank_lines
    }

    /// Configuration the session was started with.
    pub fn config(&self) -> &AppConfig {
        &self.services.config
    }

    /// Consume one unit of input in the active mode and apply the
    /// resulting transition.
    ///
    /// Errors come only from the terminal or storage collaborators; domain
    /// failures are reported on the terminal and recovered.
    pub fn dispatch_one_step(&mut self, term: &mut dyn Terminal) -> Result<()> {
        let services = &mut self.services;
        let transition = match self.mode {
            Mode::RescueConsole => rescue::step(services, term)?,
            Mode::GameShell => game::step(services, term)?,
            Mode::GuiShell => gui::step(services, term)?,
            Mode::Boot(stage) => boot::step(services, term, stage)?,
            Mode::ManPager => manual::step(services, term)?,
            Mode::NormalShell(prompt) => shell::step(services, term, prompt)?,
        };

        if let Transition::To(next) = transition {
            if next.kind() != self.mode.kind() {
                debug!(from = ?self.mode.kind(), to = ?next.kind(), "mode transition");
            }
            self.mode = next;
        }
        Ok(())
    }
}
