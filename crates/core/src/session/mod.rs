//! The session state machine.
//!
//! A single [`Mode`] decides which sub-session owns the terminal. Each call
//! to [`SessionMachine::dispatch_one_step`] hands one unit of input to that
//! sub-session's handler, which answers with a [`Transition`].

mod boot;
mod game;
mod gui;
mod machine;
mod manual;
mod rescue;
mod shell;
mod state;

pub use machine::SessionMachine;
pub use state::{BootStage, BootTarget, LoginStage, Mode, ModeKind, ShellPrompt, Transition};
