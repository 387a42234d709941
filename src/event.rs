//! Raw login events as they arrive over HTTP (JSON) or from batch files (CSV/JSON).

use crate::error::EncodeError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One login attempt. `user_id` and `ip_address` are carried for reporting only;
/// the model never sees them (except `user_id` for training-time frequencies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    pub geo_location: String,
    pub device_id: String,
    pub is_new_device: u8,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub success: u8,
}

impl LoginEvent {
    /// Strict field-by-field extraction from a JSON object. Unknown keys are ignored.
    pub fn from_json(value: &Value) -> Result<Self, EncodeError> {
        let obj = value
            .as_object()
            .ok_or_else(|| EncodeError::InvalidInput("login event must be a JSON object".to_string()))?;
        Ok(Self {
            user_id: optional_string(obj, "user_id")?,
            timestamp: required_string(obj, "timestamp")?,
            ip_address: optional_string(obj, "ip_address")?,
            geo_location: required_string(obj, "geo_location")?,
            device_id: required_string(obj, "device_id")?,
            is_new_device: flag(obj, "is_new_device")?,
            bytes_in: byte_count(obj, "bytes_in")?,
            bytes_out: byte_count(obj, "bytes_out")?,
            success: flag(obj, "success")?,
        })
    }

    /// Range checks for records that came through serde (CSV), where `u8` admits 2..=255.
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.is_new_device > 1 {
            return Err(EncodeError::wrong_type("is_new_device", "0 or 1"));
        }
        if self.success > 1 {
            return Err(EncodeError::wrong_type("success", "0 or 1"));
        }
        Ok(())
    }
}

/// Training CSV row: a login event plus its ground-truth label.
#[derive(Debug, Clone, Deserialize)]
pub struct LabeledLoginEvent {
    #[serde(default)]
    pub user_id: Option<String>,
    pub timestamp: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub geo_location: String,
    pub device_id: String,
    pub is_new_device: u8,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub success: u8,
    pub is_anomaly: u8,
}

impl LabeledLoginEvent {
    pub fn into_parts(self) -> (LoginEvent, u8) {
        let event = LoginEvent {
            user_id: self.user_id,
            timestamp: self.timestamp,
            ip_address: self.ip_address,
            geo_location: self.geo_location,
            device_id: self.device_id,
            is_new_device: self.is_new_device,
            bytes_in: self.bytes_in,
            bytes_out: self.bytes_out,
            success: self.success,
        };
        (event, self.is_anomaly)
    }
}

fn present<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required_string(obj: &Map<String, Value>, field: &'static str) -> Result<String, EncodeError> {
    match present(obj, field) {
        None => Err(EncodeError::missing(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(EncodeError::wrong_type(field, "a string")),
    }
}

fn optional_string(obj: &Map<String, Value>, field: &'static str) -> Result<Option<String>, EncodeError> {
    match present(obj, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(EncodeError::wrong_type(field, "a string")),
    }
}

fn flag(obj: &Map<String, Value>, field: &'static str) -> Result<u8, EncodeError> {
    let value = present(obj, field).ok_or_else(|| EncodeError::missing(field))?;
    let parsed = match value {
        Value::Bool(b) => Some(u8::from(*b)),
        Value::Number(n) => match n.as_u64() {
            Some(v) => Some(v),
            None => n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64),
        }
        .filter(|v| *v <= 1)
        .map(|v| v as u8),
        _ => None,
    };
    parsed.ok_or_else(|| EncodeError::wrong_type(field, "0 or 1"))
}

fn byte_count(obj: &Map<String, Value>, field: &'static str) -> Result<u64, EncodeError> {
    let value = present(obj, field).ok_or_else(|| EncodeError::missing(field))?;
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        _ => None,
    };
    parsed.ok_or_else(|| EncodeError::wrong_type(field, "a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "user_id": "U1234",
            "timestamp": "2025-06-15 14:30:00",
            "ip_address": "192.168.1.100",
            "geo_location": "United States of America",
            "device_id": "DF_5555",
            "login_hour": 14,
            "is_new_device": 0,
            "bytes_in": 150000,
            "bytes_out": 250000,
            "success": 1
        })
    }

    #[test]
    fn parses_full_event() {
        let ev = LoginEvent::from_json(&sample()).unwrap();
        assert_eq!(ev.user_id.as_deref(), Some("U1234"));
        assert_eq!(ev.bytes_in, 150000);
        assert_eq!(ev.success, 1);
    }

    #[test]
    fn string_byte_count_is_schema_error() {
        let mut v = sample();
        v["bytes_in"] = json!("150000");
        let err = LoginEvent::from_json(&v).unwrap_err();
        assert!(matches!(err, EncodeError::Schema { field: "bytes_in", .. }));
    }

    #[test]
    fn missing_device_is_schema_error() {
        let mut v = sample();
        v.as_object_mut().unwrap().remove("device_id");
        let err = LoginEvent::from_json(&v).unwrap_err();
        assert_eq!(err, EncodeError::missing("device_id"));
    }

    #[test]
    fn flags_accept_bools_and_reject_out_of_range() {
        let mut v = sample();
        v["is_new_device"] = json!(true);
        assert_eq!(LoginEvent::from_json(&v).unwrap().is_new_device, 1);
        v["success"] = json!(2);
        assert!(LoginEvent::from_json(&v).is_err());
    }

    #[test]
    fn negative_bytes_rejected() {
        let mut v = sample();
        v["bytes_out"] = json!(-5);
        assert!(LoginEvent::from_json(&v).is_err());
    }

    #[test]
    fn user_and_ip_are_optional() {
        let mut v = sample();
        let obj = v.as_object_mut().unwrap();
        obj.remove("user_id");
        obj.remove("ip_address");
        let ev = LoginEvent::from_json(&v).unwrap();
        assert!(ev.user_id.is_none());
    }
}
