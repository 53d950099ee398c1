#![warn(clippy::all, missing_docs)]

//! Core of the Lebirun console.
//!
//! This crate hosts the session state machine and every sub-session it
//! routes input to, along with the collaborator traits a terminal host
//! implements. Nothing here touches stdout or the real filesystem except
//! through [`storage::FsStorage`] and [`config`].

pub mod activation;
pub mod command;
pub mod config;
pub mod console;
pub mod desktop;
pub mod economy;
pub mod error;
pub mod identity;
pub mod pager;
pub mod power;
pub mod session;
pub mod storage;

pub use config::AppConfig;
pub use console::{Color, Console, Desktop, Key, PointerSample, ScriptedConsole, Terminal};
pub use desktop::DesktopScene;
pub use power::{Power, PowerAction, PowerLatch};
pub use session::{Mode, ModeKind, SessionMachine};
pub use storage::{FsStorage, MemoryStorage, Storage};
