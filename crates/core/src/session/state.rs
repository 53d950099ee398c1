use crate::identity::Identity;

/// Where a successful login lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootTarget {
    /// The text shell.
    Normal,
    /// The pointer-driven desktop.
    Gui,
}

impl BootTarget {
    /// Boot menu entries, top to bottom.
    pub const MENU: [BootTarget; 2] = [BootTarget::Normal, BootTarget::Gui];

    /// Caption in the boot menu.
    pub fn label(self) -> &'static str {
        match self {
            BootTarget::Normal => "Normal Boot",
            BootTarget::Gui => "GUI Boot",
        }
    }

    /// Mode entered once the login succeeds.
    pub fn mode(self) -> Mode {
        match self {
            BootTarget::Normal => Mode::NormalShell(ShellPrompt::Command),
            BootTarget::Gui => Mode::GuiShell,
        }
    }
}

/// Steps of the login prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    /// Asking who is logging in.
    Identity {
        /// Destination after login.
        then: BootTarget,
    },
    /// Asking for the password of a privileged identity.
    Password {
        /// Identity being authenticated.
        identity: Identity,
        /// Destination after login.
        then: BootTarget,
    },
}

/// Steps before the shell is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    /// The boot selector, with the highlighted entry.
    Menu {
        /// Index into [`BootTarget::MENU`].
        selected: usize,
    },
    /// The login prompt.
    Login(LoginStage),
}

/// What the next line typed at the normal shell answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellPrompt {
    /// A command line.
    Command,
    /// The password for `su`.
    SuPassword {
        /// Identity being switched to.
        target: Identity,
    },
    /// A key for the activation wizard.
    ProductKey,
}

/// The modal sub-session that owns input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Boot selector and login.
    Boot(BootStage),
    /// The fake rescue console.
    RescueConsole,
    /// The idle game.
    GameShell,
    /// The desktop.
    GuiShell,
    /// The manual pager.
    ManPager,
    /// The command shell.
    NormalShell(ShellPrompt),
}

/// [`Mode`] without its payload.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    Boot,
    RescueConsole,
    GameShell,
    GuiShell,
    ManPager,
    NormalShell,
}

impl Mode {
    /// Initial mode of every session.
    pub const INITIAL: Mode = Mode::Boot(BootStage::Menu { selected: 0 });

    /// Payload-free tag.
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Boot(_) => ModeKind::Boot,
            Mode::RescueConsole => ModeKind::RescueConsole,
            Mode::GameShell => ModeKind::GameShell,
            Mode::GuiShell => ModeKind::GuiShell,
            Mode::ManPager => ModeKind::ManPager,
            Mode::NormalShell(_) => ModeKind::NormalShell,
        }
    }

    /// The shell's command prompt.
    pub fn shell() -> Mode {
        Mode::NormalShell(ShellPrompt::Command)
    }
}

/// A handler's verdict on the mode after its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the current mode unchanged.
    Stay,
    /// Switch to the given mode.
    To(Mode),
}
