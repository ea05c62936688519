//! Client token generation

use uuid::Uuid;

/// Fresh client token for correlating a request with its response.
///
/// Responses on shared `accepted`/`rejected` topics echo the token, so a
/// caller with several requests in flight can tell the answers apart.
pub fn new_client_token() -> String {
	Uuid::new_v4().to_string()
}
