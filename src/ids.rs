//! Identifiers minted by the server.
//!
//! - [`RequestId`]: per-request ULID carried through middleware, dispatcher
//!   and handler log lines
//! - [`new_record_id`]: UUID v4 assigned to records created through `POST`

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Strongly typed request identifier backed by ULID, used to correlate log lines.
///
/// ULIDs sort by creation time, so log lines for consecutive requests stay in
/// order when grepped by id.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    /// Mint a new identifier from the current time and random bits.
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse a client-supplied `x-request-id` when it is a valid ULID, otherwise mint one.
    ///
    /// # Arguments
    ///
    /// * `header_value` - Raw `x-request-id` header value, if the client sent one
    ///
    /// # Returns
    ///
    /// The parsed id, or a fresh one when the header is absent or not a ULID.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = ulid::Ulid::from_string(s)?;
        Ok(RequestId(id))
    }
}

/// Fresh record identifier (UUID v4, hyphenated).
///
/// # Returns
///
/// A 36-character string such as `"67e55044-10b1-426f-9247-bb680e5fe0c8"`.
/// Ids never repeat across calls, so client-supplied ids on `POST` are
/// always replaced with one of these.
#[must_use]
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
