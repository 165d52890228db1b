use super::VendorApi;
use crate::error::MzoneError;
use common::model::routine::Client;
use log::debug;
use std::collections::HashMap;

/// Hands out bearer tokens for stored clients during one run.
///
/// Successful tokens are remembered per client id until the broker is dropped, so routines that
/// share a client authenticate once. Failures are not remembered.
pub struct CredentialBroker<'a> {
    vendor: &'a dyn VendorApi,
    tokens: HashMap<String, String>,
}

impl<'a> CredentialBroker<'a> {
    pub fn new(vendor: &'a dyn VendorApi) -> Self {
        Self {
            vendor,
            tokens: HashMap::new(),
        }
    }

    pub async fn token_for(&mut self, client: &Client) -> Result<String, MzoneError> {
        let key = cache_key(client);
        if let Some(token) = self.tokens.get(&key) {
            return Ok(token.clone());
        }

        debug!("Authenticating client '{}'", client.name);
        let token = self
            .vendor
            .authenticate(&client.login, client.password.expose())
            .await?;
        self.tokens.insert(key, token.clone());
        Ok(token)
    }
}

fn cache_key(client: &Client) -> String {
    if client.id.is_empty() {
        client.login.clone()
    } else {
        client.id.clone()
    }
}
