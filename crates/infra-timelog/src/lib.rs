// Shotlink Timelog Infrastructure
//
// File-backed TimeAccountant: keeps a per-day JSON log of publish
// timestamps and turns the gap since the previous publish into a Timelog
// entity on the tracking service.

mod accountant;

pub use accountant::{
    format_duration, parse_day_start, parse_duration, FileTimeAccountant, TimelogConfig,
};
