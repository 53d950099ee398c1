//! Man pager mode: one keystroke per step.

use anyhow::Result;

use super::{
    machine::Services,
    state::{Mode, Transition},
};
use crate::{
    console::Terminal,
    pager::PagerEvent,
};

/// Open the pager on `topic` and hand it the terminal.
pub(crate) fn enter(services: &mut Services, topic: Option<&str>) -> Transition {
    services.pager.open(topic);
    services.pager_notice = None;
    Transition::To(Mode::ManPager)
}

pub(crate) fn step(services: &mut Services, term: &mut dyn Terminal) -> Result<Transition> {
    term.clear()?;
    for line in services.pager.render() {
        term.write_line(&line)?;
    }
    if let Some(notice) = services.pager_notice.take() {
        term.write_line(&notice)?;
    }

    let key = term.read_key()?;
    match services.pager.handle_key(key) {
        PagerEvent::Continue => Ok(Transition::Stay),
        PagerEvent::Notice(notice) => {
            services.pager_notice = Some(notice);
            Ok(Transition::Stay)
        }
        PagerEvent::Exit => {
            term.clear()?;
            Ok(Transition::To(Mode::shell()))
        }
    }
}
