//! Post-verification callback reference

use cg_shared::config::CallbackConfig;
use url::form_urlencoded::byte_serialize;

use crate::domain::value_objects::OtpCode;

/// Fill the callback template with url-encoded values
pub fn build_callback_url(config: &CallbackConfig, code: &OtpCode, email: &str) -> String {
    config
        .template
        .replace("{provider}", &encode(&config.provider))
        .replace("{code}", &encode(code.as_str()))
        .replace("{email}", &encode(email))
        .replace("{callback_url}", &encode(&config.return_to))
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}
