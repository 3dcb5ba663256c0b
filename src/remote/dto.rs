use serde::Deserialize;

/// Error bodies from the data and auth endpoints. The data API sends
/// `message`; the auth API uses `msg` or `error_description` depending on
/// the route.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.msg).or(self.error_description).or(self.details)
    }
}
