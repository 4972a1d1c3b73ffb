use crate::{
    calibration::clamp_unit,
    correspond::{ContactList, SessionCounter},
    error::TrackError,
    types::{Contact, ContactState, PolarityMask},
    ZONE_MAX,
};

/// Serialized size of one zone: id, polarity mask, `x0`, `x1`, scale.
pub const ZONE_RECORD_LEN: usize = 16;
pub const ZONE_TABLE_BYTES: usize = ZONE_RECORD_LEN * ZONE_MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(pub u16);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    pub polarity: PolarityMask,
    pub x0: f32,
    pub x1: f32,
    /// Always `1 / (x1 - x0)`.
    pub scale: f32,
}

impl Zone {
    const fn full(id: u16) -> Self {
        Self {
            id: ZoneId(id),
            polarity: PolarityMask::BOTH,
            x0: 0.0,
            x1: 1.0,
            scale: 1.0,
        }
    }

    pub fn accepts(&self, contact: &Contact) -> bool {
        self.polarity.accepts(contact.polarity) && contact.x >= self.x0 && contact.x <= self.x1
    }

    fn is_identity(&self) -> bool {
        self.x0 == 0.0 && self.scale == 1.0
    }

    fn relative(&self, x: f32) -> f32 {
        if self.is_identity() {
            x
        } else {
            clamp_unit((x - self.x0) * self.scale)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ZoneTable {
    zones: [Zone; ZONE_MAX],
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneTable {
    pub fn new() -> Self {
        let mut zones = [Zone::full(0); ZONE_MAX];
        for (idx, zone) in zones.iter_mut().enumerate() {
            zone.id = ZoneId(idx as u16);
        }
        Self { zones }
    }

    /// Every zone back to both polarities over the full range.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn get(&self, index: usize) -> Result<(PolarityMask, f32, f32), TrackError> {
        let zone = self.zones.get(index).ok_or(TrackError::ZoneIndex { index })?;
        Ok((zone.polarity, zone.x0, zone.x1))
    }

    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    pub fn set(
        &mut self,
        index: usize,
        polarity: PolarityMask,
        x0: f32,
        x1: f32,
    ) -> Result<(), TrackError> {
        let zone = self
            .zones
            .get_mut(index)
            .ok_or(TrackError::ZoneIndex { index })?;
        *zone = bounded_zone(index as u16, polarity, x0, x1)?;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// First zone in table order accepting the contact.
    pub fn find(&self, contact: &Contact) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.accepts(contact))
    }

    /// Little-endian zone records for persistence or transfer.
    pub fn write_bytes(&self, out: &mut [u8]) -> Result<usize, TrackError> {
        let out = out
            .get_mut(..ZONE_TABLE_BYTES)
            .ok_or(TrackError::ZoneBuffer {
                needed: ZONE_TABLE_BYTES,
            })?;
        for (zone, record) in self.zones.iter().zip(out.chunks_exact_mut(ZONE_RECORD_LEN)) {
            record[0..2].copy_from_slice(&zone.id.0.to_le_bytes());
            record[2..4].copy_from_slice(&zone.polarity.bits().to_le_bytes());
            record[4..8].copy_from_slice(&zone.x0.to_le_bytes());
            record[8..12].copy_from_slice(&zone.x1.to_le_bytes());
            record[12..16].copy_from_slice(&zone.scale.to_le_bytes());
        }
        Ok(ZONE_TABLE_BYTES)
    }

    /// Restores a table written by [`ZoneTable::write_bytes`]. Ids follow the
    /// record position and the scale is recomputed; the table is left as is
    /// when any record is invalid.
    pub fn read_bytes(&mut self, bytes: &[u8]) -> Result<(), TrackError> {
        let bytes = bytes.get(..ZONE_TABLE_BYTES).ok_or(TrackError::ZoneBuffer {
            needed: ZONE_TABLE_BYTES,
        })?;
        let mut zones = self.zones;
        for (idx, record) in bytes.chunks_exact(ZONE_RECORD_LEN).enumerate() {
            let polarity = PolarityMask::from_bits(u16::from_le_bytes([record[2], record[3]]));
            let x0 = f32::from_le_bytes([record[4], record[5], record[6], record[7]]);
            let x1 = f32::from_le_bytes([record[8], record[9], record[10], record[11]]);
            zones[idx] = bounded_zone(idx as u16, polarity, x0, x1)?;
        }
        self.zones = zones;
        Ok(())
    }
}

fn bounded_zone(id: u16, polarity: PolarityMask, x0: f32, x1: f32) -> Result<Zone, TrackError> {
    // Also rejects NaN.
    if !(0.0..=1.0).contains(&x0) || !(0.0..=1.0).contains(&x1) || x0 >= x1 {
        return Err(TrackError::ZoneBounds);
    }
    Ok(Zone {
        id: ZoneId(id),
        polarity,
        x0,
        x1,
        scale: 1.0 / (x1 - x0),
    })
}

/// Sorts every current contact into its zone and rescales its position.
///
/// A contact whose inherited zone differs from the matched one starts a new
/// session: its predecessor is marked disappeared and it appears under a
/// fresh id. Contacts no zone accepts are dropped, and their predecessor is
/// marked disappeared.
pub fn classify(
    zones: &ZoneTable,
    old: &mut [Contact],
    neu: &mut ContactList,
    sessions: &mut SessionCounter,
) {
    let mut kept = 0;
    for idx in 0..neu.len() {
        let mut contact = neu[idx];
        let Some(zone) = zones.find(&contact) else {
            if contact.state == ContactState::Persisted {
                retire(old, &contact);
            }
            log::debug!("zones: drop contact at x={} outside every zone", contact.x);
            continue;
        };

        if contact.zone.is_some_and(|prev| prev != zone.id) {
            retire(old, &contact);
            let renewed = sessions.next();
            log::debug!(
                "zones: sid {:?} moved to zone {}, renewed as {}",
                contact.session,
                zone.id.0,
                renewed.0
            );
            contact.session = Some(renewed);
            contact.state = ContactState::Appeared;
        }
        contact.zone = Some(zone.id);
        contact.position = zone.relative(contact.x);

        neu[kept] = contact;
        kept += 1;
    }
    neu.truncate(kept);
}

fn retire(old: &mut [Contact], contact: &Contact) {
    if let Some(prev) = old
        .iter_mut()
        .find(|prev| prev.session.is_some() && prev.session == contact.session)
    {
        prev.state = ContactState::Disappeared;
    }
}
