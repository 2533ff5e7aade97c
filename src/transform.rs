use crate::data::ResponseData;
use std::fmt::Debug;

/// Governs when a response transform runs relative to recording and replay.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransformMode {
    /// Never transform.
    None,
    /// Transform before persisting in record mode; replayed responses are
    /// served as stored.
    OnRecord,
    /// Transform before persisting in record mode and again on every replay.
    Always,
    /// Keep the stored fixture untransformed but transform the in-memory
    /// response the caller sees, in both modes.
    Runtime,
    /// Transform only replayed responses; recordings stay raw.
    OnReplay,
}

impl TransformMode {
    /// Record mode: transform before the response fixture is written?
    pub(crate) fn applies_before_record_store(self) -> bool {
        matches!(self, TransformMode::OnRecord | TransformMode::Always)
    }

    /// Record mode: transform the in-memory response after the (raw) fixture
    /// was written?
    pub(crate) fn applies_after_record_store(self) -> bool {
        self == TransformMode::Runtime
    }

    /// Replay mode: transform the loaded response before returning it?
    pub(crate) fn applies_on_replay(self) -> bool {
        matches!(
            self,
            TransformMode::Always | TransformMode::Runtime | TransformMode::OnReplay
        )
    }
}

/// Rewrites a response after it is received (record) or loaded (replay).
/// Transforms are best-effort: they must leave the response untouched
/// rather than fail.
pub trait ResponseTransform: Debug {
    fn transform(&self, data: &mut ResponseData);
}

/// Applies the given transforms in order.
#[derive(Debug)]
pub struct ComposedTransform {
    transforms: Vec<Box<dyn ResponseTransform + Send + Sync>>,
}

impl ComposedTransform {
    pub fn new(transforms: Vec<Box<dyn ResponseTransform + Send + Sync>>) -> Self {
        Self { transforms }
    }
}

impl ResponseTransform for ComposedTransform {
    fn transform(&self, data: &mut ResponseData) {
        for transform in &self.transforms {
            transform.transform(data);
        }
    }
}

/// Re-indents a JSON body so recorded fixtures are readable in diffs.
/// Non-JSON or malformed bodies pass through unchanged.
#[derive(Debug)]
pub struct JsonPrettyPrintTransform;

impl ResponseTransform for JsonPrettyPrintTransform {
    fn transform(&self, data: &mut ResponseData) {
        let value: serde_json::Value = match serde_json::from_slice(&data.body) {
            Ok(value) => value,
            Err(_) => return,
        };

        if let Ok(pretty) = serde_json::to_vec_pretty(&value) {
            data.body = pretty;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::{HeaderMap, StatusCode};

    fn sample_response(body: &[u8]) -> ResponseData {
        ResponseData {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.to_vec(),
        }
    }

    #[test]
    fn json_pretty_print_reindents_valid_json() {
        let mut data = sample_response(br#"{"age":30,"name":"John"}"#);
        JsonPrettyPrintTransform.transform(&mut data);

        let expected = "{\n  \"age\": 30,\n  \"name\": \"John\"\n}";
        assert_eq!(String::from_utf8(data.body).unwrap(), expected);
    }

    #[test]
    fn json_pretty_print_passes_malformed_bodies_through() {
        let mut data = sample_response(b"\"wassup");
        JsonPrettyPrintTransform.transform(&mut data);
        assert_eq!(data.body, b"\"wassup".to_vec());

        let mut binary = sample_response(&[0xff, 0xfe, 0x00]);
        JsonPrettyPrintTransform.transform(&mut binary);
        assert_eq!(binary.body, vec![0xff, 0xfe, 0x00]);
    }

    #[test]
    fn composed_transform_applies_in_order() {
        #[derive(Debug)]
        struct ReplaceBody(&'static str);

        impl ResponseTransform for ReplaceBody {
            fn transform(&self, data: &mut ResponseData) {
                data.body = self.0.as_bytes().to_vec();
            }
        }

        let composed = ComposedTransform::new(vec![
            Box::new(ReplaceBody(r#"{"initial":"transformation"}"#)),
            Box::new(JsonPrettyPrintTransform),
        ]);

        let mut data = sample_response(b"\"wassup");
        composed.transform(&mut data);

        let expected = "{\n  \"initial\": \"transformation\"\n}";
        assert_eq!(String::from_utf8(data.body).unwrap(), expected);
    }

    #[test]
    fn transform_mode_matrix() {
        use TransformMode::*;

        assert!(!None.applies_before_record_store());
        assert!(OnRecord.applies_before_record_store());
        assert!(Always.applies_before_record_store());
        assert!(!Runtime.applies_before_record_store());
        assert!(!OnReplay.applies_before_record_store());

        assert!(Runtime.applies_after_record_store());
        assert!(!Always.applies_after_record_store());

        assert!(!None.applies_on_replay());
        assert!(!OnRecord.applies_on_replay());
        assert!(Always.applies_on_replay());
        assert!(Runtime.applies_on_replay());
        assert!(OnReplay.applies_on_replay());
    }
}
