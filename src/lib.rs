//! Blob detection and tracking for a linear magnetic-sensor ribbon.
//!
//! Once per sensor scan the [`Tracker`] turns the per-sensor deviation vector
//! into a set of identity-stable contacts and fans their lifecycle events out
//! to the registered downstream [`Engine`]s.

#![cfg_attr(not(test), no_std)]

pub mod calibration;
pub mod config;
pub mod correspond;
pub mod engine;
pub mod error;
pub mod interpolate;
pub mod pacer;
pub mod peaks;
pub mod tracker;
pub mod types;
pub mod zones;

pub use calibration::{CalibrationCurve, CURVE_LEN};
pub use config::{CurveLookup, Interpolation, RangeTable, TrackerConfig};
pub use engine::{
    Engine, EngineHooks, EngineRegistry, EngineSet, EventRecorder, LogEngine, RecordedEvent,
};
pub use error::TrackError;
pub use tracker::Tracker;
pub use types::{Contact, ContactState, FrameInfo, Polarity, PolarityMask, SessionId, Timestamp};
pub use zones::{Zone, ZoneId, ZoneTable};

/// Sensor slots available to the range table and the sample buffer.
pub const SENSOR_MAX: usize = 160;
/// Guard slots on each side of the ribbon. The cubic strategy reads two
/// samples past the peak, so every peak has two readable neighbours per side.
pub const SENSOR_GUARD: usize = 2;
/// Contacts per frame; also bounds the number of peaks a scan may produce.
pub const CONTACT_MAX: usize = 32;
pub const ZONE_MAX: usize = 8;
pub const ENGINE_MAX: usize = 8;
