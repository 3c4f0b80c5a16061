//! `RestGateway` — ProfileGateway over the hosted backend's REST and
//! object-storage APIs.
//!
//! Profile rows live behind a PostgREST-style interface
//! (`/rest/v1/<table>?id=eq.<uuid>`); photos go to the storage API
//! (`/storage/v1/object/<bucket>/<path>`) and are served from the public
//! object URL.

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use reqwest::{RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::photo::crop::CroppedImage;
use crate::profile::model::{BasicInfo, Location, ProfileStatus, SkillEntry};

use super::traits::ProfileGateway;

/// Pattern of a public object URL; used to recover the storage path when
/// deleting a previously uploaded photo.
const PUBLIC_OBJECT_URL: &str = r"/storage/v1/object/public/(?P<bucket>[^/]+)/(?P<path>.+)$";

pub struct RestGateway {
    http: reqwest::Client,
    config: GatewayConfig,
    object_url: Regex,
}

impl RestGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            // Static pattern, checked by the unit tests below.
            object_url: Regex::new(PUBLIC_OBJECT_URL).expect("object URL pattern compiles"),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let key = self.config.service_key.expose_secret();
        builder.header("apikey", key).bearer_auth(key)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.config.base_url)
    }

    fn profiles_url(&self, owner: Uuid) -> String {
        format!("{}?id=eq.{owner}", self.rest_url("profiles"))
    }

    async fn expect_success(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // The backend reports failures as {"message": "..."}.
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from));
        match message {
            Some(message) => Err(GatewayError::Rejected(message)),
            None => Err(GatewayError::UnexpectedStatus {
                status: status.as_u16(),
                endpoint: endpoint.to_string(),
            }),
        }
    }

    async fn patch_profile(
        &self,
        owner: Uuid,
        body: serde_json::Value,
    ) -> Result<(), GatewayError> {
        let url = self.profiles_url(owner);
        let response = self
            .authed(self.http.patch(&url))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        self.expect_success(response, "profiles").await?;
        Ok(())
    }

    async fn insert_rows(
        &self,
        table: &str,
        rows: serde_json::Value,
    ) -> Result<(), GatewayError> {
        let url = self.rest_url(table);
        let response = self
            .authed(self.http.post(&url))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&rows)
            .send()
            .await?;
        self.expect_success(response, table).await?;
        Ok(())
    }

    /// Storage path of a previously uploaded photo, if `url` points into
    /// our bucket.
    fn object_path(&self, url: &str) -> Option<String> {
        let captures = self.object_url.captures(url)?;
        if &captures["bucket"] != self.config.photo_bucket {
            return None;
        }
        Some(captures["path"].to_string())
    }

    async fn fetch_photo_url(&self, owner: Uuid) -> Result<Option<String>, GatewayError> {
        let url = format!("{}&select=profile_photo_url", self.profiles_url(owner));
        let response = self.authed(self.http.get(&url)).send().await?;
        let response = self.expect_success(response, "profiles").await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(rows
            .first()
            .and_then(|row| row.get("profile_photo_url"))
            .and_then(|v| v.as_str())
            .map(String::from))
    }
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    #[serde(default)]
    profile_setup_completed: Option<bool>,
    #[serde(default)]
    last_completed_step: Option<String>,
}

#[async_trait]
impl ProfileGateway for RestGateway {
    async fn save_basic_info(&self, owner: Uuid, info: &BasicInfo) -> Result<(), GatewayError> {
        self.patch_profile(
            owner,
            json!({
                "full_name": info.full_name,
                "bio": info.bio,
                "updated_at": Utc::now(),
            }),
        )
        .await
    }

    async fn save_location(&self, owner: Uuid, location: &Location) -> Result<(), GatewayError> {
        self.insert_rows(
            "locations",
            json!({
                "user_id": owner,
                "address_text": location.address_text,
                "latitude": location.latitude,
                "longitude": location.longitude,
                "is_primary": true,
            }),
        )
        .await
    }

    async fn save_skill_offers(
        &self,
        owner: Uuid,
        skills: &[SkillEntry],
    ) -> Result<(), GatewayError> {
        let rows: Vec<serde_json::Value> = skills
            .iter()
            .map(|s| {
                json!({
                    "user_id": owner,
                    "title": s.title,
                    "description": s.description,
                    "exchange_kind": s.exchange_kind,
                })
            })
            .collect();
        self.insert_rows("skill_offers", json!(rows)).await
    }

    async fn save_skill_requests(
        &self,
        owner: Uuid,
        skills: &[SkillEntry],
    ) -> Result<(), GatewayError> {
        let rows: Vec<serde_json::Value> = skills
            .iter()
            .map(|s| {
                json!({
                    "user_id": owner,
                    "title": s.title,
                    "description": s.description,
                    "exchange_kind": s.exchange_kind,
                })
            })
            .collect();
        self.insert_rows("skill_requests", json!(rows)).await
    }

    async fn upload_photo(&self, file: &CroppedImage) -> Result<String, GatewayError> {
        let ext = std::path::Path::new(&file.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png");
        let object_path = format!("public/{}.{ext}", Utc::now().timestamp_millis());
        let endpoint = format!(
            "{}/storage/v1/object/{}/{object_path}",
            self.config.base_url, self.config.photo_bucket
        );

        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("cacheControl", "3600");

        let response = self
            .authed(self.http.post(&endpoint))
            .header("x-upsert", "true")
            .multipart(form)
            .send()
            .await?;
        let response = self.expect_success(response, "storage/upload").await?;

        // A successful upload reports the stored object key.
        let payload: serde_json::Value = response.json().await?;
        if payload.get("Key").and_then(|k| k.as_str()).is_none() {
            return Err(GatewayError::MissingUrl);
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{object_path}",
            self.config.base_url, self.config.photo_bucket
        ))
    }

    async fn save_photo_url(&self, owner: Uuid, url: &str) -> Result<(), GatewayError> {
        self.patch_profile(
            owner,
            json!({
                "profile_photo_url": url,
                "updated_at": Utc::now(),
            }),
        )
        .await
    }

    async fn delete_photo(&self, owner: Uuid) -> Result<(), GatewayError> {
        // Look up the stored URL first so the object can be removed after
        // the row is cleared. A failed lookup still clears the row.
        let old_url = match self.fetch_photo_url(owner).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch photo URL before deletion");
                None
            }
        };

        self.patch_profile(
            owner,
            json!({
                "profile_photo_url": null,
                "updated_at": Utc::now(),
            }),
        )
        .await?;

        // Storage removal is best-effort once the row is cleared.
        if let Some(path) = old_url.as_deref().and_then(|url| self.object_path(url)) {
            let endpoint = format!(
                "{}/storage/v1/object/{}/{path}",
                self.config.base_url, self.config.photo_bucket
            );
            match self.authed(self.http.delete(&endpoint)).send().await {
                Ok(response) => {
                    if let Err(e) = self.expect_success(response, "storage/delete").await {
                        tracing::warn!(error = %e, path, "Failed to delete photo object");
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, path, "Failed to delete photo object");
                }
            }
        }

        Ok(())
    }

    async fn profile_status(&self, owner: Uuid) -> Result<ProfileStatus, GatewayError> {
        let url = format!(
            "{}&select=profile_setup_completed,last_completed_step",
            self.profiles_url(owner)
        );
        let response = self.authed(self.http.get(&url)).send().await?;
        let response = self.expect_success(response, "profiles").await?;
        let rows: Vec<StatusRow> = response.json().await?;
        let row = match rows.into_iter().next() {
            Some(row) => row,
            None => return Ok(ProfileStatus::default()),
        };
        Ok(ProfileStatus {
            completed: row.profile_setup_completed.unwrap_or(false),
            last_completed_step: row
                .last_completed_step
                .and_then(|s| s.parse().ok()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> RestGateway {
        RestGateway::new(GatewayConfig::new(
            "https://backend.example.com",
            "service-key",
            "profile-photos",
        ))
    }

    #[test]
    fn object_path_is_recovered_from_public_url() {
        let gw = gateway();
        let url =
            "https://backend.example.com/storage/v1/object/public/profile-photos/public/17.png";
        assert_eq!(gw.object_path(url).as_deref(), Some("public/17.png"));
    }

    #[test]
    fn object_path_ignores_other_buckets_and_shapes() {
        let gw = gateway();
        assert!(gw
            .object_path("https://backend.example.com/storage/v1/object/public/other/x.png")
            .is_none());
        assert!(gw.object_path("https://elsewhere.example.com/x.png").is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = GatewayConfig::new("https://backend.example.com/", "k", "b");
        assert_eq!(config.base_url, "https://backend.example.com");
    }
}
