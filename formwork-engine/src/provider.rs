use formwork_model::Schema;
use formwork_palette::SelectorValueProvider;
use serde_json::Value;

use crate::session::EditSession;

/// Session-backed selector value source.
///
/// On a submission, the freshly posted value wins over the stored
/// snapshot so the palette reflects what the user just picked — except
/// for `submit_on_change` fields, whose post is the trigger of the very
/// reload being handled, where the stored value is authoritative.
pub struct SessionValueProvider<'a> {
    schema: &'a Schema,
    session: &'a EditSession,
}

impl<'a> SessionValueProvider<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, session: &'a EditSession) -> Self {
        Self { schema, session }
    }
}

impl SelectorValueProvider for SessionValueProvider<'_> {
    fn get(&self, field: &str, record_suffix: Option<&str>) -> Option<Value> {
        let submit_on_change = self
            .schema
            .field(field)
            .is_some_and(|f| f.eval.submit_on_change);

        if self.session.is_submission() && !submit_on_change {
            let key = match record_suffix {
                Some(suffix) => format!("{field}_{suffix}"),
                None => field.to_string(),
            };
            // An absent post is a real signal (an unchecked checkbox is
            // simply not submitted), so no fallback to the snapshot here.
            return self.session.posted(&key).cloned();
        }

        self.session.current(field).cloned()
    }
}
