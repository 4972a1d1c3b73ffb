//! Relates the previous frame's contacts to the current frame's.
//!
//! Both lists are ordered by ribbon coordinate. When the counts match the
//! lists relate index by index; otherwise two cursors walk them and every
//! step decides whether the contact under the cursor on the longer side has
//! no partner (it appeared or vanished) or pairs up with the other cursor.

use core::cmp::Ordering;

use heapless::Vec;

use crate::{
    types::{Contact, ContactState, SessionId},
    CONTACT_MAX,
};

pub type ContactList = Vec<Contact, CONTACT_MAX>;

/// Monotonic session id source. Ids start at 1 and are never handed out
/// twice while the tracker lives.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionCounter {
    last: u32,
}

impl SessionCounter {
    pub fn next(&mut self) -> SessionId {
        self.last = self.last.wrapping_add(1);
        SessionId(self.last)
    }

    pub fn last_issued(&self) -> Option<SessionId> {
        (self.last != 0).then_some(SessionId(self.last))
    }
}

pub fn correspond(old: &mut [Contact], neu: &mut ContactList, sessions: &mut SessionCounter) {
    match neu.len().cmp(&old.len()) {
        Ordering::Equal => {
            for (tar, src) in neu.iter_mut().zip(old.iter()) {
                inherit(tar, src);
            }
        }
        Ordering::Less => relate_vanished(old, neu),
        Ordering::Greater => relate_appeared(old, neu, sessions),
    }
    neu.retain(|contact| contact.state != ContactState::Ignored);
}

fn relate_vanished(old: &mut [Contact], neu: &mut [Contact]) {
    let mut missing = old.len() - neu.len();
    let mut i = 0;
    let mut j = 0;
    while j < neu.len() {
        // Ties keep the pairing.
        if missing > 0
            && distance(neu[j].x, old[i + 1].x) < distance(neu[j].x, old[i].x)
        {
            old[i].state = ContactState::Disappeared;
            missing -= 1;
            i += 1;
            continue;
        }
        inherit(&mut neu[j], &old[i]);
        i += 1;
        j += 1;
    }
    for contact in &mut old[i..] {
        contact.state = ContactState::Disappeared;
    }
}

fn relate_appeared(old: &[Contact], neu: &mut [Contact], sessions: &mut SessionCounter) {
    let mut extra = neu.len() - old.len();
    let mut i = 0;
    let mut j = 0;
    while i < old.len() {
        if extra > 0 && distance(neu[j + 1].x, old[i].x) < distance(neu[j].x, old[i].x) {
            admit(&mut neu[j], sessions);
            extra -= 1;
            j += 1;
            continue;
        }
        inherit(&mut neu[j], &old[i]);
        i += 1;
        j += 1;
    }
    for contact in &mut neu[j..] {
        admit(contact, sessions);
    }
}

fn inherit(tar: &mut Contact, src: &Contact) {
    tar.session = src.session;
    tar.zone = src.zone;
    tar.state = ContactState::Persisted;
}

/// A contact without a predecessor needs to clear the full threshold to
/// count as a new touch; anything weaker is residual noise.
fn admit(tar: &mut Contact, sessions: &mut SessionCounter) {
    if tar.above_threshold {
        tar.session = Some(sessions.next());
        tar.zone = None;
        tar.state = ContactState::Appeared;
    } else {
        tar.state = ContactState::Ignored;
    }
}

fn distance(a: f32, b: f32) -> f32 {
    if a > b {
        a - b
    } else {
        b - a
    }
}
