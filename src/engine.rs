//! Downstream consumers of contact lifecycle events.
//!
//! Engines translate the per-frame events into a wire protocol. They run
//! inline within the tick, so they must not block.

use heapless::Vec;

use crate::{
    error::TrackError,
    types::{FrameInfo, Polarity, SessionId},
    zones::ZoneId,
    ENGINE_MAX,
};

/// Which per-contact hooks an engine implements. Absent hooks are skipped
/// by the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineHooks {
    pub on: bool,
    pub set: bool,
    pub off: bool,
}

impl EngineHooks {
    pub const ALL: Self = Self {
        on: true,
        set: true,
        off: true,
    };
    pub const NONE: Self = Self {
        on: false,
        set: false,
        off: false,
    };
}

pub trait Engine {
    fn hooks(&self) -> EngineHooks {
        EngineHooks::ALL
    }

    fn frame_start(&mut self, frame: &FrameInfo) {
        let _ = frame;
    }

    fn contact_on(
        &mut self,
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    ) {
        let _ = (session, zone, polarity, position, intensity);
    }

    fn contact_set(
        &mut self,
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    ) {
        let _ = (session, zone, polarity, position, intensity);
    }

    fn contact_off(&mut self, session: SessionId, zone: ZoneId, polarity: Polarity) {
        let _ = (session, zone, polarity);
    }

    /// Called after every contact event of the frame, e.g. to flush an
    /// alive list or close a bundle.
    fn frame_end(&mut self, frame: &FrameInfo) {
        let _ = frame;
    }
}

/// An ordered set of engines the tracker dispatches to.
pub trait EngineSet {
    fn for_each_engine(&mut self, f: &mut dyn FnMut(&mut dyn Engine));
}

impl EngineSet for [&mut dyn Engine] {
    fn for_each_engine(&mut self, f: &mut dyn FnMut(&mut dyn Engine)) {
        for engine in self.iter_mut() {
            f(&mut **engine);
        }
    }
}

impl<const N: usize> EngineSet for [&mut dyn Engine; N] {
    fn for_each_engine(&mut self, f: &mut dyn FnMut(&mut dyn Engine)) {
        self.as_mut_slice().for_each_engine(f);
    }
}

struct EngineSlot<'a> {
    engine: &'a mut dyn Engine,
    enabled: bool,
}

/// Engines attached at startup, dispatched in attach order while enabled.
#[derive(Default)]
pub struct EngineRegistry<'a> {
    slots: Vec<EngineSlot<'a>, ENGINE_MAX>,
}

impl<'a> EngineRegistry<'a> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Attaches a disabled engine and returns its slot index.
    pub fn attach(&mut self, engine: &'a mut dyn Engine) -> Result<usize, TrackError> {
        self.slots
            .push(EngineSlot {
                engine,
                enabled: false,
            })
            .map_err(|_| TrackError::EngineCapacity { limit: ENGINE_MAX })?;
        Ok(self.slots.len() - 1)
    }

    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> Result<(), TrackError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(TrackError::EngineSlot { index })?;
        slot.enabled = enabled;
        Ok(())
    }

    /// Applies one enable flag per attached slot, in attach order.
    pub fn update(&mut self, flags: &[bool]) {
        for (slot, &enabled) in self.slots.iter_mut().zip(flags) {
            slot.enabled = enabled;
        }
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.enabled)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.enabled).count()
    }
}

impl EngineSet for EngineRegistry<'_> {
    fn for_each_engine(&mut self, f: &mut dyn FnMut(&mut dyn Engine)) {
        for slot in self.slots.iter_mut().filter(|slot| slot.enabled) {
            f(&mut *slot.engine);
        }
    }
}

/// Writes every event to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEngine;

impl Engine for LogEngine {
    fn frame_start(&mut self, frame: &FrameInfo) {
        log::info!(
            "frame: fid={} now={} offset={} old={} new={}",
            frame.frame_id,
            frame.now,
            frame.offset,
            frame.old_count,
            frame.new_count
        );
    }

    fn contact_on(
        &mut self,
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    ) {
        log::info!(
            "on: sid={} gid={} pid={:?} x={} p={}",
            session.0,
            zone.0,
            polarity,
            position,
            intensity
        );
    }

    fn contact_set(
        &mut self,
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    ) {
        log::info!(
            "set: sid={} gid={} pid={:?} x={} p={}",
            session.0,
            zone.0,
            polarity,
            position,
            intensity
        );
    }

    fn contact_off(&mut self, session: SessionId, zone: ZoneId, polarity: Polarity) {
        log::info!("off: sid={} gid={} pid={:?}", session.0, zone.0, polarity);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    FrameStart(FrameInfo),
    On {
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    },
    Set {
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    },
    Off {
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
    },
    FrameEnd {
        frame_id: u32,
    },
}

/// Bounded capture of dispatched events for replay and diagnostics. Once
/// full, the oldest events make room and `overflow` is latched.
pub struct EventRecorder<const N: usize> {
    events: Vec<RecordedEvent, N>,
    overflow: bool,
    hooks: EngineHooks,
}

impl<const N: usize> Default for EventRecorder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> EventRecorder<N> {
    pub fn new() -> Self {
        Self::with_hooks(EngineHooks::ALL)
    }

    pub fn with_hooks(hooks: EngineHooks) -> Self {
        Self {
            events: Vec::new(),
            overflow: false,
            hooks,
        }
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn overflowed(&self) -> bool {
        self.overflow
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.overflow = false;
    }

    fn record(&mut self, event: RecordedEvent) {
        if let Err(event) = self.events.push(event) {
            self.overflow = true;
            if !self.events.is_empty() {
                self.events.remove(0);
                let _ = self.events.push(event);
            }
        }
    }
}

impl<const N: usize> Engine for EventRecorder<N> {
    fn hooks(&self) -> EngineHooks {
        self.hooks
    }

    fn frame_start(&mut self, frame: &FrameInfo) {
        self.record(RecordedEvent::FrameStart(*frame));
    }

    fn contact_on(
        &mut self,
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    ) {
        self.record(RecordedEvent::On {
            session,
            zone,
            polarity,
            position,
            intensity,
        });
    }

    fn contact_set(
        &mut self,
        session: SessionId,
        zone: ZoneId,
        polarity: Polarity,
        position: f32,
        intensity: f32,
    ) {
        self.record(RecordedEvent::Set {
            session,
            zone,
            polarity,
            position,
            intensity,
        });
    }

    fn contact_off(&mut self, session: SessionId, zone: ZoneId, polarity: Polarity) {
        self.record(RecordedEvent::Off {
            session,
            zone,
            polarity,
        });
    }

    fn frame_end(&mut self, frame: &FrameInfo) {
        self.record(RecordedEvent::FrameEnd {
            frame_id: frame.frame_id,
        });
    }
}
