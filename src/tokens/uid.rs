//! Subject ids as they travel in links
//!
//! Ids are base64url-encoded without padding before being placed next to a
//! token in a URL. Decoding fails closed: anything that is not valid
//! base64url of UTF-8 yields `None`.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

pub fn encode_uid(id: &str) -> String {
    URL_SAFE_NO_PAD.encode(id.as_bytes())
}

pub fn decode_uid(encoded: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok().filter(|s| !s.is_empty())
}
