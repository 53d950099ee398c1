//! Pointer-driven desktop used by the GUI mode.
//!
//! Geometry lives in a fixed 640x480 virtual space; hosts scale it to
//! whatever surface they draw on.

use crate::console::{Key, PointerSample};

/// Virtual desktop width.
pub const SCREEN_WIDTH: i32 = 640;
/// Virtual desktop height.
pub const SCREEN_HEIGHT: i32 = 480;

const TASKBAR: Region = Region::new(0, 445, SCREEN_WIDTH, 35);
const START_BUTTON: Region = Region::new(4, 450, 70, 25);
const MENU_PANEL: Region = Region::new(4, 280, 200, 165);
const MENU_ITEM_HEIGHT: i32 = 30;
const MENU_ITEM_GAP: i32 = 8;
const MENU_PADDING: i32 = 8;

/// Axis-aligned rectangle in desktop coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Region {
    /// Rectangle at `(x, y)` with the given size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive hit test.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Entries of the start menu, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Leave the desktop for the text shell.
    Terminal,
    /// Restart the machine.
    Reboot,
    /// Power off.
    Shutdown,
}

impl MenuItem {
    /// All items in display order.
    pub const ALL: [MenuItem; 3] = [MenuItem::Terminal, MenuItem::Reboot, MenuItem::Shutdown];

    /// Caption drawn on the item.
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Terminal => "Terminal",
            MenuItem::Reboot => "Reboot",
            MenuItem::Shutdown => "Shut down",
        }
    }

    /// Hit region inside the open menu panel.
    pub fn region(self) -> Region {
        let index = MenuItem::ALL
            .iter()
            .position(|item| *item == self)
            .unwrap_or_default() as i32;
        Region::new(
            MENU_PANEL.x + MENU_PADDING,
            MENU_PANEL.y + MENU_PADDING + index * (MENU_ITEM_HEIGHT + MENU_ITEM_GAP),
            MENU_PANEL.width - 2 * MENU_PADDING,
            MENU_ITEM_HEIGHT,
        )
    }
}

/// What a frame asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesktopAction {
    /// Nothing beyond redrawing.
    Idle,
    /// The start menu opened or closed.
    MenuToggled(bool),
    /// A menu item was clicked.
    Activate(MenuItem),
    /// Leave the desktop via the keyboard.
    Leave,
}

/// Everything a host needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopScene {
    /// Virtual width.
    pub width: i32,
    /// Virtual height.
    pub height: i32,
    /// Bar along the bottom edge.
    pub taskbar: Region,
    /// Button that toggles the menu.
    pub start_button: Region,
    /// Open menu panel and its items, if the menu is open.
    pub menu: Option<(Region, Vec<(MenuItem, Region)>)>,
    /// Pointer position.
    pub cursor: (i32, i32),
}

/// Desktop state that survives leaving and re-entering the GUI mode.
#[derive(Debug, Clone, Default)]
pub struct DesktopShell {
    menu_open: bool,
    button_was_down: bool,
}

impl DesktopShell {
    /// Closed menu, button released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the start menu is open.
    pub fn menu_open(&self) -> bool {
        self.menu_open
    }

    /// Fold one pointer frame into the desktop state.
    ///
    /// Only a released-to-pressed edge counts as a click, so holding the
    /// button across frames clicks once.
    pub fn frame(&mut self, sample: &PointerSample) -> DesktopAction {
        if matches!(sample.key, Some(Key::Esc)) {
            self.button_was_down = sample.pressed;
            return DesktopAction::Leave;
        }

        let clicked = sample.pressed && !self.button_was_down;
        self.button_was_down = sample.pressed;
        if !clicked {
            return DesktopAction::Idle;
        }

        if START_BUTTON.contains(sample.x, sample.y) {
            self.menu_open = !self.menu_open;
            return DesktopAction::MenuToggled(self.menu_open);
        }

        if self.menu_open {
            if let Some(item) = MenuItem::ALL
                .into_iter()
                .find(|item| item.region().contains(sample.x, sample.y))
            {
                self.menu_open = false;
                return DesktopAction::Activate(item);
            }
        }

        DesktopAction::Idle
    }

    /// Scene for the current state with the pointer at `sample`.
    pub fn scene(&self, sample: &PointerSample) -> DesktopScene {
        let menu = self.menu_open.then(|| {
            (
                MENU_PANEL,
                MenuItem::ALL
                    .into_iter()
                    .map(|item| (item, item.region()))
                    .collect(),
            )
        });
        DesktopScene {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            taskbar: TASKBAR,
            start_button: START_BUTTON,
            menu,
            cursor: (
                sample.x.clamp(0, SCREEN_WIDTH - 1),
                sample.y.clamp(0, SCREEN_HEIGHT - 1),
            ),
        }
    }
}
