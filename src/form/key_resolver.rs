use crate::FieldDescriptor;
use crate::FieldKey;

/// Gives every field without a usable key its position as key.
///
/// Declared truthy keys are left alone, so running it twice changes nothing.
pub fn resolve_keys(fields: &mut [FieldDescriptor]) {
    for (index, field) in fields.iter_mut().enumerate() {
        if field.key.as_ref().map_or(true, FieldKey::is_falsy) {
            field.key = Some(FieldKey::from(index));
        }
    }
}
