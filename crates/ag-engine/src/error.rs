// error.rs — Hard engine errors.
//
// Business-rule failures are never errors; they travel as validation
// reports. Only caller bugs (an unregistered platform key) raise here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no manifest is registered for platform '{platform_key}'")]
    UnknownPlatform { platform_key: String },
}
