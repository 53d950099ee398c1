//! Line tokenizer and the command registry used by the normal shell.

use std::collections::HashMap;

use crate::{error::CommandError, identity::Identity};

/// One tokenized shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// First token, lower-cased.
    pub head: String,
    /// Remaining tokens that are not flags.
    pub args: Vec<String>,
    /// `--name` tokens, without the dashes, lower-cased.
    pub flags: Vec<String>,
    /// Everything after the head and its separating whitespace, verbatim.
    pub tail: String,
}

impl Invocation {
    /// Split a line; `None` for lines with no tokens.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let head_end = trimmed
            .find(char::is_whitespace)
            .unwrap_or(trimmed.len());
        let head = trimmed[..head_end].to_lowercase();
        if head.is_empty() {
            return None;
        }
        let tail = trimmed[head_end..]
            .trim_start()
            .trim_end_matches(['\r', '\n'])
            .to_string();

        let (flags, args): (Vec<&str>, Vec<&str>) = tail
            .split_whitespace()
            .partition(|token| token.starts_with("--") && token.len() > 2);
        Some(Self {
            head,
            args: args.into_iter().map(str::to_string).collect(),
            flags: flags
                .into_iter()
                .map(|flag| flag.trim_start_matches('-').to_lowercase())
                .collect(),
            tail,
        })
    }

    /// Positional argument `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Whether `--name` was given.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.iter().any(|flag| flag == name)
    }
}

/// Registration record for one command.
#[derive(Debug, Clone)]
pub struct CommandSpec<H> {
    /// Canonical name.
    pub name: &'static str,
    /// Alternative heads.
    pub aliases: &'static [&'static str],
    /// Lowest identity allowed to run it.
    pub privilege: Identity,
    /// Help page listing it; `None` keeps it off the help pages.
    pub help_page: Option<u8>,
    /// Usage fragment shown after the names on the help page, e.g. `<text>`.
    pub usage: &'static str,
    /// One-line description for the help page.
    pub summary: &'static str,
    /// Whatever the owner dispatches with.
    pub handler: H,
}

impl<H> CommandSpec<H> {
    /// Unlisted command open to everybody.
    pub fn new(name: &'static str, handler: H) -> Self {
        Self {
            name,
            aliases: &[],
            privilege: Identity::Nobody,
            help_page: None,
            usage: "",
            summary: "",
            handler,
        }
    }

    /// Extra heads resolving to this command.
    pub fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    /// Require at least `identity`.
    pub fn privilege(mut self, identity: Identity) -> Self {
        self.privilege = identity;
        self
    }

    /// List on help page `page` with a usage fragment and summary.
    pub fn help(mut self, page: u8, usage: &'static str, summary: &'static str) -> Self {
        self.help_page = Some(page);
        self.usage = usage;
        self.summary = summary;
        self
    }

    /// `name / alias <usage> = summary`.
    pub fn help_line(&self) -> String {
        let mut names = vec![self.name];
        names.extend_from_slice(self.aliases);
        let mut line = names.join(" / ");
        if !self.usage.is_empty() {
            line.push(' ');
            line.push_str(self.usage);
        }
        format!("{line} = {}", self.summary)
    }
}

/// Name and alias lookup over registered commands, in registration order.
#[derive(Debug, Clone)]
pub struct CommandRegistry<H> {
    specs: Vec<CommandSpec<H>>,
    index: HashMap<String, usize>,
}

impl<H> Default for CommandRegistry<H> {
    fn default() -> Self {
        Self {
            specs: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<H> CommandRegistry<H> {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command. A later registration wins any name clash.
    pub fn register(&mut self, spec: CommandSpec<H>) -> &mut Self {
        let slot = self.specs.len();
        self.index.insert(spec.name.to_lowercase(), slot);
        for alias in spec.aliases {
            self.index.insert(alias.to_lowercase(), slot);
        }
        self.specs.push(spec);
        self
    }

    /// Command registered under `head`, ignoring case.
    pub fn lookup(&self, head: &str) -> Option<&CommandSpec<H>> {
        self.index
            .get(&head.trim().to_lowercase())
            .map(|slot| &self.specs[*slot])
    }

    /// Whether `head` names a command.
    pub fn contains(&self, head: &str) -> bool {
        self.lookup(head).is_some()
    }

    /// Resolve an invocation and check it against the current identity.
    pub fn resolve(
        &self,
        invocation: &Invocation,
        current: Identity,
    ) -> Result<&CommandSpec<H>, CommandError> {
        let spec = self
            .lookup(&invocation.head)
            .ok_or_else(|| CommandError::Unknown(invocation.head.clone()))?;
        if current < spec.privilege {
            return Err(CommandError::PermissionDenied {
                command: spec.name.to_string(),
                required: spec.privilege,
            });
        }
        Ok(spec)
    }

    /// Help lines for `page`, in registration order.
    pub fn help_lines(&self, page: u8) -> Vec<String> {
        self.specs
            .iter()
            .filter(|spec| spec.help_page == Some(page))
            .map(CommandSpec::help_line)
            .collect()
    }

    /// Highest help page any command is listed on.
    pub fn help_page_count(&self) -> u8 {
        self.specs
            .iter()
            .filter_map(|spec| spec.help_page)
            .max()
            .unwrap_or(0)
    }

    /// All registered commands.
    pub fn iter(&self) -> impl Iterator<Item = &CommandSpec<H>> {
        self.specs.iter()
    }
}
