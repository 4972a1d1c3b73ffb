use crate::{
    calibration::CalibrationCurve,
    config::{RangeTable, TrackerConfig},
    correspond::{correspond, ContactList, SessionCounter},
    engine::{Engine, EngineSet},
    error::TrackError,
    interpolate::Interpolator,
    pacer::HeartbeatPacer,
    peaks::SampleBuffer,
    types::{Contact, ContactState, FrameInfo, Timestamp},
    zones::{classify, ZoneTable},
};

/// Tracking session: everything that lives from startup to device reset.
///
/// The two contact lists swap roles after every tick, so the current frame
/// becomes the next tick's previous frame without copying.
pub struct Tracker {
    config: TrackerConfig,
    range: RangeTable,
    curve: CalibrationCurve,
    samples: SampleBuffer,
    zones: ZoneTable,
    lists: [ContactList; 2],
    old: usize,
    sessions: SessionCounter,
    frame_id: u32,
    pacer: HeartbeatPacer,
}

impl Tracker {
    pub fn new(config: TrackerConfig, range: RangeTable, curve: CalibrationCurve) -> Self {
        Self {
            config,
            samples: SampleBuffer::new(range.sensor_count()),
            range,
            curve,
            zones: ZoneTable::new(),
            lists: [ContactList::new(), ContactList::new()],
            old: 0,
            sessions: SessionCounter::default(),
            frame_id: 0,
            pacer: HeartbeatPacer::new(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TrackerConfig) {
        self.config = config;
    }

    pub fn range(&self) -> &RangeTable {
        &self.range
    }

    /// Replaces the range table; the previous frame is kept, so contacts
    /// carry over if the sensor count is unchanged.
    pub fn set_range(&mut self, range: RangeTable) {
        if range.sensor_count() != self.samples.sensor_count() {
            self.samples = SampleBuffer::new(range.sensor_count());
        }
        self.range = range;
    }

    pub fn set_curve(&mut self, curve: CalibrationCurve) {
        self.curve = curve;
    }

    pub fn zones(&self) -> &ZoneTable {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut ZoneTable {
        &mut self.zones
    }

    /// Contacts of the last processed tick.
    pub fn contacts(&self) -> &[Contact] {
        &self.lists[self.old]
    }

    /// Id of the last emitted frame; 0 until the first one goes out.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    /// Runs one scan tick and returns whether a frame went out.
    ///
    /// A tick rejected with an error leaves the session untouched.
    pub fn process<E>(
        &mut self,
        now: Timestamp,
        offset: Timestamp,
        deviations: &[i16],
        engines: &mut E,
    ) -> Result<bool, TrackError>
    where
        E: EngineSet + ?Sized,
    {
        let peaks = match self.samples.load(deviations, &self.range) {
            Ok(peaks) => peaks,
            Err(err) => {
                log::warn!("tracker: tick rejected: {}", err);
                return Err(err);
            }
        };

        let [first, second] = &mut self.lists;
        let (old, neu) = if self.old == 0 {
            (first, second)
        } else {
            (second, first)
        };

        neu.clear();
        let interpolator = Interpolator {
            buffer: &self.samples,
            curve: &self.curve,
            lookup: self.config.curve_lookup,
        };
        for &peak in &peaks {
            // Both lists share the peak list's capacity.
            let _ = neu.push(interpolator.contact(peak, self.config.interpolation));
        }

        let active = !old.is_empty() || !neu.is_empty();
        if active {
            correspond(old, neu, &mut self.sessions);
            classify(&self.zones, old, neu, &mut self.sessions);
        }

        let heartbeat = self.pacer.tick(active, self.config.pacemaker);
        let emit = active || heartbeat;
        if emit {
            self.frame_id = match self.frame_id.wrapping_add(1) {
                0 => 1,
                id => id,
            };
            let frame = FrameInfo {
                frame_id: self.frame_id,
                now,
                offset,
                old_count: old.len(),
                new_count: neu.len(),
            };
            log::trace!(
                "tracker: frame {} old={} new={}",
                frame.frame_id,
                frame.old_count,
                frame.new_count
            );
            let (old, neu): (&[Contact], &[Contact]) = (old, neu);
            engines.for_each_engine(&mut |engine| dispatch(engine, &frame, old, neu));
        }

        self.old ^= 1;
        Ok(emit)
    }
}

fn dispatch(engine: &mut dyn Engine, frame: &FrameInfo, old: &[Contact], neu: &[Contact]) {
    let hooks = engine.hooks();
    engine.frame_start(frame);

    if hooks.on || hooks.set {
        for contact in neu {
            let (Some(session), Some(zone)) = (contact.session, contact.zone) else {
                continue;
            };
            match contact.state {
                ContactState::Appeared if hooks.on => engine.contact_on(
                    session,
                    zone,
                    contact.polarity,
                    contact.position,
                    contact.intensity,
                ),
                ContactState::Persisted if hooks.set => engine.contact_set(
                    session,
                    zone,
                    contact.polarity,
                    contact.position,
                    contact.intensity,
                ),
                _ => {}
            }
        }
    }

    if hooks.off {
        for contact in old {
            if contact.state != ContactState::Disappeared {
                continue;
            }
            if let (Some(session), Some(zone)) = (contact.session, contact.zone) {
                engine.contact_off(session, zone, contact.polarity);
            }
        }
    }

    engine.frame_end(frame);
}

#[cfg(test)]
mod tests;
