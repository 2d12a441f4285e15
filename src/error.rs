use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Scalar kind with no entry in the type map (functions, symbols, ...).
    #[error("unsupported validation type `{kind}`")]
    UnsupportedType { kind: String },

    #[error("cannot convert route {method} {path}")]
    Route {
        method: String,
        path: String,
        #[source]
        source: Box<ConvertError>,
    },
}

impl ConvertError {
    pub(crate) fn in_route(self, method: &str, path: &str) -> Self {
        ConvertError::Route {
            method: method.to_string(),
            path: path.to_string(),
            source: Box::new(self),
        }
    }
}

pub type Result<T, E = ConvertError> = std::result::Result<T, E>;
