//! Serde adapters for the proof wire format.
//!
//! The wire format encodes every buffer with standard padded base64, the
//! way Go's `encoding/json` encodes `[]byte`. Lists may be sent as `null`
//! and an unset time as `0001-01-01T00:00:00Z`.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Seconds from the Unix epoch back to `0001-01-01T00:00:00Z`, the zero time
/// a Go service sends for a reference without one.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

/// Decodes `null` as the type's default, e.g. an empty list.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes an optional time, mapping `null` and the zero time to `None`.
pub fn optional_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let time = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(time.filter(|t| !(t.timestamp() == ZERO_TIME_SECS && t.timestamp_subsec_nanos() == 0)))
}

/// A single `Vec<u8>` field.
pub mod bytes {
    use super::*;

    pub fn serialize<S>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        // `null` decodes as empty, matching a nil slice
        let encoded = Option::<String>::deserialize(deserializer)?;
        match encoded {
            Some(s) => STANDARD.decode(s.as_bytes()).map_err(de::Error::custom),
            None => Ok(Vec::new()),
        }
    }
}

/// A `Vec<Vec<u8>>` field.
pub mod bytes_seq {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S>(data: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        for buf in data {
            seq.serialize_element(&STANDARD.encode(buf))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Option::<Vec<Option<String>>>::deserialize(deserializer)?;
        encoded
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item {
                Some(s) => STANDARD.decode(s.as_bytes()).map_err(de::Error::custom),
                None => Ok(Vec::new()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Holder {
        #[serde(with = "super::bytes", default)]
        one: Vec<u8>,
        #[serde(with = "super::bytes_seq", default)]
        many: Vec<Vec<u8>>,
    }

    #[derive(Deserialize, Debug)]
    struct Lists {
        #[serde(deserialize_with = "super::null_as_default", default)]
        ints: Vec<i64>,
        #[serde(deserialize_with = "super::null_as_default", default)]
        name: String,
        #[serde(deserialize_with = "super::optional_time", default)]
        at: Option<chrono::DateTime<chrono::Utc>>,
    }

    #[test]
    fn test_null_lists_and_strings_decode_as_empty() {
        let l: Lists = serde_json::from_str(r#"{"ints":null,"name":null,"at":null}"#).unwrap();
        assert!(l.ints.is_empty());
        assert!(l.name.is_empty());
        assert!(l.at.is_none());

        let l: Lists = serde_json::from_str(r#"{"ints":[-1,2],"name":"x"}"#).unwrap();
        assert_eq!(l.ints, vec![-1, 2]);
        assert_eq!(l.name, "x");
    }

    #[test]
    fn test_zero_time_decodes_as_none() {
        let l: Lists = serde_json::from_str(r#"{"at":"0001-01-01T00:00:00Z"}"#).unwrap();
        assert!(l.at.is_none());

        let l: Lists = serde_json::from_str(r#"{"at":"0001-01-01T00:00:01Z"}"#).unwrap();
        assert!(l.at.is_some());

        let l: Lists = serde_json::from_str(r#"{"at":"2017-03-01T12:30:00Z"}"#).unwrap();
        assert_eq!(l.at.map(|t| t.timestamp()), Some(1_488_371_400));
    }

    #[test]
    fn test_encodes_standard_base64() {
        let h = Holder {
            one: vec![0xfb, 0xff],
            many: vec![b"ab".to_vec(), vec![1, 2, 3]],
        };
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"{"one":"+/8=","many":["YWI=","AQID"]}"#);
    }

    #[test]
    fn test_null_and_missing_decode_as_empty() {
        let h: Holder = serde_json::from_str(r#"{"one":null,"many":[null,"AQID"]}"#).unwrap();
        assert!(h.one.is_empty());
        assert_eq!(h.many, vec![Vec::new(), vec![1, 2, 3]]);

        let h: Holder = serde_json::from_str("{}").unwrap();
        assert!(h.one.is_empty() && h.many.is_empty());
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(serde_json::from_str::<Holder>(r#"{"one":"not base64!"}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"many":["%%%"]}"#).is_err());
    }
}
