use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;

/// Reserved metadata key. Its value must be an array of strings; the entries
/// become server-side tags on the reported issue. Non-string entries are
/// dropped, a non-array value yields no tags at all.
pub const TAGS_KEY: &str = "tags";

/// Host-supplied hook producing custom metadata for the next issue report.
/// Invoked lazily, only at report-assembly time.
pub type MetadataBlock = Box<dyn Fn() -> BTreeMap<String, JsonValue> + Send + Sync>;

/// Single-slot holder for the metadata block. Replacing discards the previous
/// block; there is no subscriber list.
#[derive(Default)]
pub(crate) struct MetadataSlot {
    block: Mutex<Option<MetadataBlock>>,
}

impl MetadataSlot {
    pub(crate) fn replace(&self, block: MetadataBlock) {
        *self.block.lock().expect("metadata slot mutex poisoned") = Some(block);
    }

    /// Invoke the block (if any) and split out the reserved tags entry.
    /// A panicking block degrades to "no metadata" rather than failing the
    /// surrounding issue submission.
    pub(crate) fn collect(&self) -> (BTreeMap<String, JsonValue>, Vec<String>) {
        let guard = self.block.lock().expect("metadata slot mutex poisoned");
        let Some(block) = guard.as_ref() else {
            return (BTreeMap::new(), Vec::new());
        };
        match catch_unwind(AssertUnwindSafe(|| block())) {
            Ok(fields) => split_tags(fields),
            Err(_) => {
                log::warn!("metadata block panicked; attaching no metadata to this report");
                (BTreeMap::new(), Vec::new())
            }
        }
    }
}

fn split_tags(
    mut fields: BTreeMap<String, JsonValue>,
) -> (BTreeMap<String, JsonValue>, Vec<String>) {
    let tags = match fields.remove(TAGS_KEY) {
        Some(JsonValue::Array(values)) => {
            let mut tags = Vec::with_capacity(values.len());
            let mut dropped = 0usize;
            for value in values {
                match value {
                    JsonValue::String(tag) => tags.push(tag),
                    _ => dropped += 1,
                }
            }
            if dropped > 0 {
                log::debug!("dropped {dropped} non-string tag entries from metadata");
            }
            tags
        }
        Some(_) => {
            log::debug!("metadata tags entry is not an array; ignoring it");
            Vec::new()
        }
        None => Vec::new(),
    };
    (fields, tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block_returning(value: JsonValue) -> MetadataBlock {
        Box::new(move || {
            let JsonValue::Object(map) = value.clone() else {
                return BTreeMap::new();
            };
            map.into_iter().collect()
        })
    }

    #[test]
    fn empty_slot_collects_nothing() {
        let slot = MetadataSlot::default();
        let (fields, tags) = slot.collect();
        assert!(fields.is_empty());
        assert!(tags.is_empty());
    }

    #[test]
    fn non_string_tag_entries_are_dropped() {
        let slot = MetadataSlot::default();
        slot.replace(block_returning(json!({ "tags": ["a", 3, "b"], "plan": "paid" })));
        let (fields, tags) = slot.collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(fields.get("plan"), Some(&json!("paid")));
        assert!(!fields.contains_key(TAGS_KEY));
    }

    #[test]
    fn non_array_tags_value_yields_no_tags() {
        let slot = MetadataSlot::default();
        slot.replace(block_returning(json!({ "tags": "not-an-array" })));
        let (fields, tags) = slot.collect();
        assert!(tags.is_empty());
        assert!(!fields.contains_key(TAGS_KEY));
    }

    #[test]
    fn replacement_discards_the_previous_block() {
        let slot = MetadataSlot::default();
        slot.replace(block_returning(json!({ "generation": "first" })));
        slot.replace(block_returning(json!({ "generation": "second" })));
        let (fields, _) = slot.collect();
        assert_eq!(fields.get("generation"), Some(&json!("second")));
    }

    #[test]
    fn panicking_block_degrades_to_no_metadata() {
        let slot = MetadataSlot::default();
        slot.replace(Box::new(|| panic!("host bug")));
        let (fields, tags) = slot.collect();
        assert!(fields.is_empty());
        assert!(tags.is_empty());
    }
}
