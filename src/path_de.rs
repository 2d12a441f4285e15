use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize with JSON-path context in error messages.
/// `origin` names where the text came from (file path, `<stdin>`, ...).
pub fn from_str_with_path<T: DeserializeOwned>(src: &str, origin: &str) -> anyhow::Result<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        anyhow::anyhow!("{origin}: at JSON path {path} → {}", err.into_inner())
    })
}

/// Same, for a value that is already parsed (e.g. jq output).
pub fn from_value_with_path<T: DeserializeOwned>(value: Value, origin: &str) -> anyhow::Result<T> {
    serde_path_to_error::deserialize::<_, T>(value).map_err(|err| {
        let path = err.path().to_string();
        anyhow::anyhow!("{origin}: at JSON path {path} → {}", err.into_inner())
    })
}
