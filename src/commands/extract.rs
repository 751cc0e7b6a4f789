//! Extraction of a lookup key from free-form user input.
//!
//! Users paste either a raw identifier/email or a full connection link.
//! Any failure to decode a link yields `None`, which the caller reports
//! as "not found".

use std::sync::LazyLock;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use regex::Regex;
use serde::Deserialize;

static VLESS_ID: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"vless://([^@]*)@").ok());

/// Standard alphabet, accepting links with or without `=` padding.
const VMESS_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Length of the `vmess://` scheme prefix.
const VMESS_PREFIX_LEN: usize = 8;

#[derive(Deserialize)]
struct VmessConfig {
    id: Option<String>,
}

/// Returns the uid between `vless://` and the next `@`.
#[must_use]
pub fn extract_vless(link: &str) -> Option<String> {
    let regex = VLESS_ID.as_ref()?;
    let id = regex.captures(link)?.get(1)?.as_str();
    (!id.is_empty()).then(|| id.to_owned())
}

/// Returns the `id` field of a base64-encoded vmess link.
#[must_use]
pub fn extract_vmess(link: &str) -> Option<String> {
    let encoded = link.trim().get(VMESS_PREFIX_LEN..)?;
    let decoded = VMESS_BASE64.decode(encoded.trim()).ok()?;
    let config: VmessConfig = serde_json::from_slice(&decoded).ok()?;
    config.id.filter(|id| !id.is_empty())
}

/// Classifies `text` and extracts the key to look up.
#[must_use]
pub fn extract_identifier(text: &str) -> Option<String> {
    if text.contains("vless") {
        extract_vless(text)
    } else if text.contains("vmess") {
        extract_vmess(text)
    } else {
        let key = text.trim();
        (!key.is_empty()).then(|| key.to_owned())
    }
}
