use serde::de::DeserializeOwned;
use serde_json::Value;

/// A deserialization failure with the JSON path where it happened.
#[derive(Debug, Clone)]
pub struct PathError {
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at JSON path {} → {}", self.path, self.message)
    }
}

impl std::error::Error for PathError {}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, PathError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(into_path_error)
}

pub fn from_value_with_path<T: DeserializeOwned>(value: &Value) -> Result<T, PathError> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(into_path_error)
}

fn into_path_error<E: std::fmt::Display>(err: serde_path_to_error::Error<E>) -> PathError {
    PathError {
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Case {
        #[allow(unused)]
        name: String,
        count: u32,
    }

    #[test]
    fn error_names_the_failing_path() {
        let src = r#"[{"name":"a","count":1},{"name":"b","count":"x"}]"#;
        let err = from_str_with_path::<Vec<Case>>(src).unwrap_err();
        assert_eq!(err.path, "[1].count");
        assert!(err.to_string().starts_with("at JSON path [1].count"));
    }

    #[test]
    fn value_input_is_supported() {
        let v = serde_json::json!({"name": "a", "count": 3});
        let case: Case = from_value_with_path(&v).unwrap();
        assert_eq!(case.count, 3);
    }
}
