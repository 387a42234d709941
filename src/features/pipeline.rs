//! Encoding pipeline: login events → time breakdown + vocabulary codes + frequencies → table.

use super::{login_time, CategoryVocabulary, FeatureTable, FeatureVector};
use crate::error::EncodeError;
use crate::event::LoginEvent;
use std::collections::HashMap;

/// Frequency value used on every serving path.
///
/// The classifier was fit on real per-user/device/location login counts, but the
/// serving paths have no running counts and send this constant instead. Changing
/// it here without retraining shifts every prediction.
pub const PLACEHOLDER_FREQUENCY: i64 = 1;

#[derive(Debug, Clone, Copy)]
struct Frequencies {
    user: i64,
    device: i64,
    location: i64,
}

const PLACEHOLDER: Frequencies = Frequencies {
    user: PLACEHOLDER_FREQUENCY,
    device: PLACEHOLDER_FREQUENCY,
    location: PLACEHOLDER_FREQUENCY,
};

/// Stateless encoder over two frozen vocabularies; share it behind `Arc`.
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    geo: CategoryVocabulary,
    device: CategoryVocabulary,
}

impl FeatureEncoder {
    pub fn new(geo: CategoryVocabulary, device: CategoryVocabulary) -> Self {
        Self { geo, device }
    }

    pub fn geo_vocabulary(&self) -> &CategoryVocabulary {
        &self.geo
    }

    pub fn device_vocabulary(&self) -> &CategoryVocabulary {
        &self.device
    }

    /// Serving-path encoding of a single event.
    pub fn encode_one(&self, event: &LoginEvent) -> Result<FeatureVector, EncodeError> {
        self.row(event, PLACEHOLDER)
    }

    /// Serving-path encoding of a batch. Same per-record rules as [`Self::encode_one`].
    pub fn encode(&self, events: &[LoginEvent]) -> Result<FeatureTable, EncodeError> {
        events
            .iter()
            .enumerate()
            .map(|(index, ev)| self.row(ev, PLACEHOLDER).map_err(|e| at(index, e)))
            .collect::<Result<Vec<_>, _>>()
            .map(FeatureTable::new)
    }

    /// Training-path encoding: frequencies are the observed counts of each
    /// user, device and location within `events`.
    pub fn encode_observed(&self, events: &[LoginEvent]) -> Result<FeatureTable, EncodeError> {
        let mut users: HashMap<&str, i64> = HashMap::new();
        let mut devices: HashMap<&str, i64> = HashMap::new();
        let mut locations: HashMap<&str, i64> = HashMap::new();
        for (index, ev) in events.iter().enumerate() {
            let user = ev
                .user_id
                .as_deref()
                .ok_or_else(|| at(index, EncodeError::missing("user_id")))?;
            *users.entry(user).or_default() += 1;
            *devices.entry(ev.device_id.as_str()).or_default() += 1;
            *locations.entry(ev.geo_location.as_str()).or_default() += 1;
        }

        let mut rows = Vec::with_capacity(events.len());
        for (index, ev) in events.iter().enumerate() {
            let freq = Frequencies {
                user: ev.user_id.as_deref().and_then(|u| users.get(u)).copied().unwrap_or(0),
                device: devices.get(ev.device_id.as_str()).copied().unwrap_or(0),
                location: locations.get(ev.geo_location.as_str()).copied().unwrap_or(0),
            };
            rows.push(self.row(ev, freq).map_err(|e| at(index, e))?);
        }
        Ok(FeatureTable::new(rows))
    }

    fn row(&self, ev: &LoginEvent, freq: Frequencies) -> Result<FeatureVector, EncodeError> {
        ev.validate()?;
        let t = login_time(&ev.timestamp).ok_or_else(|| {
            EncodeError::InvalidInput(format!("unparseable timestamp `{}`", ev.timestamp))
        })?;
        Ok(FeatureVector {
            login_hour: t.hour.into(),
            login_day: t.day.into(),
            login_month: t.month.into(),
            login_year: t.year.into(),
            login_weekday: t.weekday.into(),
            is_new_device: ev.is_new_device.into(),
            bytes_in: saturating_i64(ev.bytes_in),
            bytes_out: saturating_i64(ev.bytes_out),
            success: ev.success.into(),
            geo_location_encoded: self.geo.code_or_unknown(&ev.geo_location),
            device_id_encoded: self.device.code_or_unknown(&ev.device_id),
            user_login_frequency: freq.user,
            device_login_frequency: freq.device,
            location_login_frequency: freq.location,
        })
    }
}

fn at(index: usize, source: EncodeError) -> EncodeError {
    EncodeError::Record {
        index,
        source: Box::new(source),
    }
}

fn saturating_i64(v: u64) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> FeatureEncoder {
        FeatureEncoder::new(
            CategoryVocabulary::fit("geo_location", ["Canada", "Germany"]),
            CategoryVocabulary::fit("device_id", ["DF_1", "DF_2"]),
        )
    }

    fn event(user: &str, geo: &str, device: &str) -> LoginEvent {
        LoginEvent {
            user_id: Some(user.to_string()),
            timestamp: "2025-06-15 14:30:00".to_string(),
            ip_address: None,
            geo_location: geo.to_string(),
            device_id: device.to_string(),
            is_new_device: 0,
            bytes_in: 10,
            bytes_out: 20,
            success: 1,
        }
    }

    #[test]
    fn observed_frequencies_count_within_batch() {
        let events = vec![
            event("U1", "Canada", "DF_1"),
            event("U1", "Germany", "DF_1"),
            event("U2", "Canada", "DF_2"),
        ];
        let table = encoder().encode_observed(&events).unwrap();
        let first = table.rows()[0];
        assert_eq!(first.user_login_frequency, 2);
        assert_eq!(first.device_login_frequency, 2);
        assert_eq!(first.location_login_frequency, 2);
        assert_eq!(table.rows()[2].user_login_frequency, 1);
    }

    #[test]
    fn serving_path_keeps_placeholder_even_for_repeats() {
        let events = vec![event("U1", "Canada", "DF_1"), event("U1", "Canada", "DF_1")];
        let table = encoder().encode(&events).unwrap();
        for row in table.rows() {
            assert_eq!(row.user_login_frequency, PLACEHOLDER_FREQUENCY);
            assert_eq!(row.device_login_frequency, PLACEHOLDER_FREQUENCY);
            assert_eq!(row.location_login_frequency, PLACEHOLDER_FREQUENCY);
        }
    }

    #[test]
    fn batch_error_names_record() {
        let mut bad = event("U1", "Canada", "DF_1");
        bad.timestamp = "not a time".to_string();
        let err = encoder()
            .encode(&[event("U1", "Canada", "DF_1"), bad])
            .unwrap_err();
        assert!(matches!(err, EncodeError::Record { index: 1, .. }));
    }

    #[test]
    fn observed_requires_user_id() {
        let mut ev = event("U1", "Canada", "DF_1");
        ev.user_id = None;
        assert!(encoder().encode_observed(&[ev]).is_err());
    }
}
