use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures of the host/DOM layer. Gameplay itself never errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("element `{0}` has an unexpected type")]
    ElementType(&'static str),
    #[error("DOM call failed: {0}")]
    Dom(String),
    #[error("invalid log level `{0}`")]
    LogLevel(String),
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        Error::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
