//! Type-guard predicates composed into per-field checks
//!
//! Each check pushes at most one error into the shared list and never
//! returns early from the caller, so one bad field does not hide the next.

use serde_json::{Map, Value};

/// JSON type name used in error messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

/// Absent and `null` are both "not provided"
pub fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn field_path(path: &str, field: &str) -> String {
    format!("{}.{}", path, field)
}

fn wrong_type(errors: &mut Vec<String>, path: &str, field: &str, expected: &str, got: &Value) {
    errors.push(format!(
        "{}: expected {}, got {}",
        field_path(path, field),
        expected,
        type_name(got)
    ));
}

/// Field must be present and a string
pub fn require_string(obj: &Map<String, Value>, field: &str, path: &str, errors: &mut Vec<String>) {
    match obj.get(field) {
        Some(value) if is_string(value) => {}
        Some(Value::Null) | None => {
            errors.push(format!("{}: required string is missing", field_path(path, field)))
        }
        Some(other) => wrong_type(errors, path, field, "string", other),
    }
}

/// Field may be absent or null; otherwise a string
pub fn optional_string(obj: &Map<String, Value>, field: &str, path: &str, errors: &mut Vec<String>) {
    match obj.get(field) {
        Some(value) if !is_absent(Some(value)) && !is_string(value) => {
            wrong_type(errors, path, field, "string or null", value)
        }
        _ => {}
    }
}

/// Field must be present and a boolean
pub fn require_bool(obj: &Map<String, Value>, field: &str, path: &str, errors: &mut Vec<String>) {
    match obj.get(field) {
        Some(Value::Bool(_)) => {}
        Some(Value::Null) | None => {
            errors.push(format!("{}: required boolean is missing", field_path(path, field)))
        }
        Some(other) => wrong_type(errors, path, field, "boolean", other),
    }
}

/// Song numbers and durations arrive either as strings or numbers
pub fn optional_text_or_number(
    obj: &Map<String, Value>,
    field: &str,
    path: &str,
    errors: &mut Vec<String>,
) {
    match obj.get(field) {
        None | Some(Value::Null) | Some(Value::String(_)) | Some(Value::Number(_)) => {}
        Some(other) => wrong_type(errors, path, field, "string, number or null", other),
    }
}

/// Field must be one of `allowed`
pub fn require_enum(
    obj: &Map<String, Value>,
    field: &str,
    allowed: &[&str],
    path: &str,
    errors: &mut Vec<String>,
) {
    match obj.get(field) {
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => {}
        Some(Value::String(s)) => errors.push(format!(
            "{}: expected one of {}, got \"{}\"",
            field_path(path, field),
            allowed.join(", "),
            s
        )),
        Some(Value::Null) | None => {
            errors.push(format!("{}: required value is missing", field_path(path, field)))
        }
        Some(other) => wrong_type(errors, path, field, "string", other),
    }
}

/// Person reference: absent, null, a name string, or `{nome, id?}`
pub fn optional_person(obj: &Map<String, Value>, field: &str, path: &str, errors: &mut Vec<String>) {
    let Some(value) = obj.get(field) else {
        return;
    };
    match value {
        Value::Null | Value::String(_) => {}
        Value::Object(person) => {
            let person_path = field_path(path, field);
            require_string(person, "nome", &person_path, errors);
            optional_string(person, "id", &person_path, errors);
        }
        other => wrong_type(errors, path, field, "person (string or object)", other),
    }
}

/// Nested object, validated only when present
pub fn optional_object<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    path: &str,
    errors: &mut Vec<String>,
) -> Option<&'a Map<String, Value>> {
    match obj.get(field) {
        Some(Value::Object(nested)) => Some(nested),
        Some(Value::Null) | None => None,
        Some(other) => {
            wrong_type(errors, path, field, "object or null", other);
            None
        }
    }
}

/// Nested array, validated only when present; `len_range` bounds its length
pub fn optional_array<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    len_range: std::ops::RangeInclusive<usize>,
    path: &str,
    errors: &mut Vec<String>,
) -> Option<&'a [Value]> {
    match obj.get(field) {
        Some(Value::Array(items)) => {
            if !len_range.contains(&items.len()) {
                errors.push(format!(
                    "{}: expected {} to {} items, got {}",
                    field_path(path, field),
                    len_range.start(),
                    len_range.end(),
                    items.len()
                ));
            }
            Some(items.as_slice())
        }
        Some(Value::Null) | None => None,
        Some(other) => {
            wrong_type(errors, path, field, "array or null", other);
            None
        }
    }
}

/// Array of strings, validated only when present
pub fn optional_string_array(
    obj: &Map<String, Value>,
    field: &str,
    path: &str,
    errors: &mut Vec<String>,
) {
    match obj.get(field) {
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                if !is_string(item) {
                    errors.push(format!(
                        "{}[{}]: expected string, got {}",
                        field_path(path, field),
                        i,
                        type_name(item)
                    ));
                }
            }
        }
        Some(Value::Null) | None => {}
        Some(other) => wrong_type(errors, path, field, "array of strings or null", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_require_string() {
        let record = obj(json!({"a": "x", "b": 1, "c": null}));
        let mut errors = Vec::new();
        require_string(&record, "a", "r", &mut errors);
        assert!(errors.is_empty());
        require_string(&record, "b", "r", &mut errors);
        require_string(&record, "c", "r", &mut errors);
        require_string(&record, "d", "r", &mut errors);
        assert_eq!(
            errors,
            vec![
                "r.b: expected string, got number",
                "r.c: required string is missing",
                "r.d: required string is missing",
            ]
        );
    }

    #[test]
    fn test_optional_string_accepts_null_and_absent() {
        let record = obj(json!({"a": null, "b": "x", "c": true}));
        let mut errors = Vec::new();
        for field in ["a", "b", "z"] {
            optional_string(&record, field, "r", &mut errors);
        }
        assert!(errors.is_empty());
        optional_string(&record, "c", "r", &mut errors);
        assert_eq!(errors, vec!["r.c: expected string or null, got boolean"]);
    }

    #[test]
    fn test_require_enum() {
        let record = obj(json!({"t": "fim_semana", "u": "outro_tipo"}));
        let mut errors = Vec::new();
        require_enum(&record, "t", &["meio_semana", "fim_semana"], "r", &mut errors);
        assert!(errors.is_empty());
        require_enum(&record, "u", &["meio_semana", "fim_semana"], "r", &mut errors);
        assert_eq!(
            errors,
            vec!["r.u: expected one of meio_semana, fim_semana, got \"outro_tipo\""]
        );
    }

    #[test]
    fn test_optional_person_shapes() {
        let record = obj(json!({
            "a": null,
            "b": "Célio Horn",
            "c": {"id": "p1", "nome": "Célio Horn"},
            "d": {"id": null, "nome": "Loni"},
            "e": {"id": "p1"},
            "f": 42,
        }));
        let mut errors = Vec::new();
        for field in ["a", "b", "c", "d", "missing"] {
            optional_person(&record, field, "r", &mut errors);
        }
        assert!(errors.is_empty(), "{:?}", errors);

        optional_person(&record, "e", "r", &mut errors);
        optional_person(&record, "f", "r", &mut errors);
        assert_eq!(
            errors,
            vec![
                "r.e.nome: required string is missing",
                "r.f: expected person (string or object), got number",
            ]
        );
    }

    #[test]
    fn test_optional_array_bounds() {
        let record = obj(json!({"partes": [], "ok": [1, 2]}));
        let mut errors = Vec::new();
        assert!(optional_array(&record, "ok", 1..=4, "r", &mut errors).is_some());
        assert!(errors.is_empty());
        assert!(optional_array(&record, "partes", 1..=4, "r", &mut errors).is_some());
        assert_eq!(errors, vec!["r.partes: expected 1 to 4 items, got 0"]);
    }

    #[test]
    fn test_optional_string_array() {
        let record = obj(json!({"nomes": ["a", 2, "c"]}));
        let mut errors = Vec::new();
        optional_string_array(&record, "nomes", "r", &mut errors);
        assert_eq!(errors, vec!["r.nomes[1]: expected string, got number"]);
    }
}
