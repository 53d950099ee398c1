//! Paginated manual viewer with its own keystroke-level input.

use tracing::debug;

use crate::console::Key;

/// Lines kept on screen when nothing is configured.
pub const DEFAULT_VISIBLE_LINES: usize = 23;

const CONFIRM_PROMPT: &str = "Are you sure you want to quit? (y/n)";
const LOCKED_NOTICE: &str = "Keybinds locked. Press V to unlock.";
const COMMAND_PREFIX: &str = "Command: ";

/// One manual page and the command names that open it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManPage {
    /// Command names routed to this page.
    pub topics: Vec<String>,
    /// Page body, one entry per line.
    pub lines: Vec<String>,
}

impl ManPage {
    /// Page with the given topics and body.
    pub fn new(topics: &[&str], lines: &[&str]) -> Self {
        Self {
            topics: topics.iter().map(|topic| topic.to_string()).collect(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }
}

/// Built-in manual pages, in page order.
pub fn builtin_pages() -> Vec<ManPage> {
    vec![
        ManPage::new(
            &["help", "cmds"],
            &[
                "About the Help / Cmds command",
                "",
                "Nothing much to explain, Help / Cmds command shows just the list of commands.",
            ],
        ),
        ManPage::new(
            &["clear", "minireboot"],
            &[
                "About the Clear / Minireboot Command",
                "",
                "Clear (aka Minireboot) is a command which just simply clears your console history, so nobody can see what commands you typed before.",
            ],
        ),
        ManPage::new(
            &["grub"],
            &[
                "The GRUB Command",
                "",
                "This command was inspired by the Welcome to GRUB! text in Debian.",
                "",
                "This command has arguments:",
                "--noclearafter keeps the Welcome to GRUB! text on screen until you run Clear (aka Minireboot).",
            ],
        ),
        ManPage::new(
            &["grubrescue"],
            &[
                "GRUBRescue",
                "",
                "This command enters a fake GRUB Rescue environment.",
                "",
                "You can exit the grubrescue environment by typing exit.",
            ],
        ),
        ManPage::new(
            &["game1"],
            &[
                "About Game1",
                "",
                "An idle game: press Enter to earn coins, spend them in the shop on upgrades.",
                "Use data save / data load to keep your progress between runs.",
            ],
        ),
        ManPage::new(
            &["productman"],
            &[
                "Productman - The Activator for Lebirun",
                "",
                "Productman asks for a product key and activates Lebirun when the key is valid.",
                "",
                "Productman has the following arguments:",
                "--deactivate, which removes the current Product Key assigned.",
                "There is also a secret argument which instantly activates Lebirun.",
            ],
        ),
        ManPage::new(
            &["su"],
            &[
                "The SU Command",
                "",
                "Switches the user in the current terminal without fully logging out.",
                "",
                "su root asks for the root password, su user switches right away,",
                "su prv goes back to the previous user.",
            ],
        ),
    ]
}

/// Input sub-mode of the pager.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PagerMode {
    /// Scrolling and page switching.
    #[default]
    PageView,
    /// Typing a pager command.
    CommandEntry {
        /// Characters typed so far.
        buffer: String,
    },
    /// Every key except `v` is ignored.
    Locked,
    /// Waiting for the quit confirmation.
    ConfirmExit,
}

/// Result of feeding one key to the pager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerEvent {
    /// Keep paging.
    Continue,
    /// Leave the pager.
    Exit,
    /// Keep paging and show a one-line message under the page.
    Notice(String),
}

/// Scrollable, paginated document set.
#[derive(Debug, Clone)]
pub struct Pager {
    pages: Vec<ManPage>,
    page_index: usize,
    scroll: usize,
    visible_lines: usize,
    mode: PagerMode,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(builtin_pages(), DEFAULT_VISIBLE_LINES)
    }
}

impl Pager {
    /// Pager over `pages`, showing `visible_lines` rows at a time.
    ///
    /// An empty page set gets a single blank page so indexing stays valid.
    pub fn new(pages: Vec<ManPage>, visible_lines: usize) -> Self {
        let pages = if pages.is_empty() {
            vec![ManPage::new(&[], &[])]
        } else {
            pages
        };
        Self {
            pages,
            page_index: 0,
            scroll: 0,
            visible_lines: visible_lines.max(1),
            mode: PagerMode::PageView,
        }
    }

    /// Index of the page on screen.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// First visible line of the current page.
    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Current input sub-mode.
    pub fn mode(&self) -> &PagerMode {
        &self.mode
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Whether some page is routed from `topic`.
    pub fn has_topic(&self, topic: &str) -> bool {
        self.page_for(topic).is_some()
    }

    /// Enter the pager: known topics jump to their page, anything else
    /// shows page 0. Scroll and sub-mode always reset.
    pub fn open(&mut self, topic: Option<&str>) {
        self.page_index = topic.and_then(|topic| self.page_for(topic)).unwrap_or(0);
        self.scroll = 0;
        self.mode = PagerMode::PageView;
        debug!(page = self.page_index, "pager opened");
    }

    /// Feed one keystroke.
    pub fn handle_key(&mut self, key: Key) -> PagerEvent {
        match std::mem::take(&mut self.mode) {
            PagerMode::PageView => self.page_view_key(key),
            PagerMode::CommandEntry { buffer } => self.command_key(buffer, key),
            PagerMode::Locked => {
                if !is_char(key, 'v') {
                    self.mode = PagerMode::Locked;
                }
                PagerEvent::Continue
            }
            PagerMode::ConfirmExit => {
                if is_char(key, 'y') {
                    PagerEvent::Exit
                } else {
                    PagerEvent::Continue
                }
            }
        }
    }

    /// Lines to draw for the current state, page body first.
    pub fn render(&self) -> Vec<String> {
        let lines = &self.pages[self.page_index].lines;
        let mut out: Vec<String> = lines
            .iter()
            .skip(self.scroll)
            .take(self.visible_lines)
            .cloned()
            .collect();
        match &self.mode {
            PagerMode::PageView => {}
            PagerMode::CommandEntry { buffer } => out.push(format!("{COMMAND_PREFIX}{buffer}")),
            PagerMode::Locked => out.push(LOCKED_NOTICE.to_string()),
            PagerMode::ConfirmExit => out.push(CONFIRM_PROMPT.to_string()),
        }
        out
    }

    fn page_view_key(&mut self, key: Key) -> PagerEvent {
        match key {
            Key::Up => self.scroll = self.scroll.saturating_sub(1),
            Key::Down => {
                if self.scroll < self.max_scroll() {
                    self.scroll += 1;
                }
            }
            Key::Left => self.switch_page(-1),
            Key::Right => self.switch_page(1),
            key if is_char(key, 'v') => self.mode = PagerMode::Locked,
            key if is_char(key, 'c') => {
                self.mode = PagerMode::CommandEntry {
                    buffer: String::new(),
                }
            }
            key if is_char(key, 'q') => self.mode = PagerMode::ConfirmExit,
            _ => {}
        }
        PagerEvent::Continue
    }

    fn command_key(&mut self, mut buffer: String, key: Key) -> PagerEvent {
        match key {
            Key::Esc => PagerEvent::Continue,
            Key::Enter => {
                if buffer.trim() == "exit" {
                    self.mode = PagerMode::ConfirmExit;
                    PagerEvent::Continue
                } else {
                    self.mode = PagerMode::CommandEntry {
                        buffer: String::new(),
                    };
                    PagerEvent::Notice("Unknown command.".to_string())
                }
            }
            Key::Backspace => {
                buffer.pop();
                self.mode = PagerMode::CommandEntry { buffer };
                PagerEvent::Continue
            }
            Key::Char(ch) => {
                buffer.push(ch);
                self.mode = PagerMode::CommandEntry { buffer };
                PagerEvent::Continue
            }
            _ => {
                self.mode = PagerMode::CommandEntry { buffer };
                PagerEvent::Continue
            }
        }
    }

    fn switch_page(&mut self, direction: isize) {
        let count = self.pages.len() as isize;
        self.page_index = (self.page_index as isize + direction).rem_euclid(count) as usize;
        self.scroll = 0;
    }

    fn max_scroll(&self) -> usize {
        self.pages[self.page_index]
            .lines
            .len()
            .saturating_sub(self.visible_lines)
    }

    fn page_for(&self, topic: &str) -> Option<usize> {
        let topic = topic.trim().to_lowercase();
        self.pages
            .iter()
            .position(|page| page.topics.iter().any(|known| *known == topic))
    }
}

fn is_char(key: Key, expected: char) -> bool {
    matches!(key, Key::Char(ch) if ch.eq_ignore_ascii_case(&expected))
}
