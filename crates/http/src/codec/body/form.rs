use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

use crate::protocol::FieldMap;

/// Parses `a=1&b=2` pairs, percent- and `+`-decoded. The last duplicate wins.
pub(crate) fn parse_urlencoded(input: &[u8]) -> FieldMap {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(input) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            debug!(cause = %e, "can't parse urlencoded input");
            FieldMap::new()
        }
    }
}

/// Top-level members of a JSON object; strings are kept as is, other values as JSON text.
pub(super) fn parse_json_fields(body: &Bytes) -> FieldMap {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(members)) => members
            .into_iter()
            .map(|(name, value)| match value {
                Value::String(s) => (name, s),
                other => (name, other.to_string()),
            })
            .collect(),
        Ok(_) => FieldMap::new(),
        Err(e) => {
            debug!(cause = %e, "can't parse json body");
            FieldMap::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_duplicate_wins() {
        let fields = parse_urlencoded(b"a=1&b=2&a=3");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["a"], "3");
    }

    #[test]
    fn percent_decoding() {
        let fields = parse_urlencoded(b"name=%E4%BD%A0%E5%A5%BD&empty=&flag");
        assert_eq!(fields["name"], "你好");
        assert_eq!(fields["empty"], "");
        assert_eq!(fields["flag"], "");
    }
}
