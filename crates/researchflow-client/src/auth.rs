//! Login, registration and logout

use crate::client::ApiClient;
use crate::response::{read_body, read_json, transport};
use crate::wire::{Credentials, Registration, TokenResponse};
use researchflow_core::{validate, Error, Result};
use researchflow_storage::keys;

impl ApiClient {
    /// Exchange credentials for a token and store it
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        validate::login(username, password)?;
        let response = self
            .http()
            .post(self.endpoint("login/"))
            .json(&Credentials {
                username: username.trim(),
                password,
            })
            .send()
            .await
            .map_err(transport)?;
        let body: TokenResponse = read_json(response).await?;
        let token = body
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Backend("login response did not include a token".to_string()))?;
        self.store.set(keys::AUTH_TOKEN, &token)?;
        tracing::info!(username = username.trim(), "logged in");
        Ok(())
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        validate::registration(username, email, password, confirm)?;
        let response = self
            .http()
            .post(self.endpoint("register/"))
            .json(&Registration {
                username,
                email,
                password,
            })
            .send()
            .await
            .map_err(transport)?;
        read_body(response).await?;
        tracing::info!(username, "registered");
        Ok(())
    }

    /// End the session. Local user data is cleared even when the server
    /// cannot be told.
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.token()? {
            let sent = self
                .http()
                .post(self.endpoint("logout/"))
                .header(reqwest::header::AUTHORIZATION, format!("Token {token}"))
                .send()
                .await;
            match sent {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(status = response.status().as_u16(), "logout rejected by server");
                }
                Ok(_) => {}
                Err(err) => tracing::warn!(error = %err, "logout request failed"),
            }
        }
        for key in keys::USER_SCOPED {
            self.store.remove(key)?;
        }
        tracing::info!("logged out");
        Ok(())
    }
}
