use crate::gateway::{GatewayError, RecordGateway};
use kursverwaltung_api_types::{Record, RecordFields};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// [RecordGateway] implementation for the LivingApps REST API.
///
/// Each entity collection is a LivingApps app, identified by [RecordFields::APP_ID]. The records
/// of an app are available at `{base_url}apps/{app_id}/records`.
pub struct LivingAppsGateway {
    client: reqwest::Client,
    base_url: Url,
}

/// A record as transferred by the API. The record id is not part of the record body, but given by
/// the URL or the key in the listing.
#[derive(Deserialize)]
struct RecordPayload<F> {
    createdat: String,
    #[serde(default)]
    updatedat: Option<String>,
    #[serde(default)]
    fields: F,
}

impl<F> RecordPayload<F> {
    fn into_record(self, record_id: String) -> Record<F> {
        Record {
            record_id,
            createdat: self.createdat,
            updatedat: self.updatedat,
            fields: self.fields,
        }
    }
}

#[derive(Serialize)]
struct FieldsBody<'a, F> {
    fields: &'a F,
}

#[derive(Deserialize)]
struct CreatedRecord {
    id: String,
}

impl LivingAppsGateway {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("kursverwaltung/{}", crate::get_version()))
            .build()
            .map_err(|e| GatewayError::ConnectionError(format!("HTTP client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    fn records_url(&self, app_id: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["apps", app_id, "records"]);
        }
        url
    }

    fn record_url(&self, app_id: &str, record_id: &str) -> Url {
        let mut url = self.records_url(app_id);
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(record_id);
        }
        url
    }
}

/// Make sure the base URL ends with a slash and has no query, so that path segments can be
/// appended.
fn normalize_base_url(mut base_url: Url) -> Url {
    base_url.set_query(None);
    base_url.set_fragment(None);
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url
}

/// Convert the listing of an app (a JSON object, keyed by record id) into a record snapshot.
///
/// Each record is decoded on its own. Records which do not match the field types are skipped with a
/// warning, so they do not hide the rest of the collection.
fn records_from_listing<F: RecordFields>(
    listing: BTreeMap<String, serde_json::Value>,
) -> Vec<Record<F>> {
    listing
        .into_iter()
        .filter_map(
            |(record_id, payload)| match serde_json::from_value::<RecordPayload<F>>(payload) {
                Ok(payload) => Some(payload.into_record(record_id)),
                Err(e) => {
                    warn!(
                        "Skipping undecodable record {} of {}: {}",
                        record_id,
                        F::COLLECTION_NAME,
                        e
                    );
                    None
                }
            },
        )
        .collect()
}

impl RecordGateway for LivingAppsGateway {
    async fn list<F: RecordFields>(&self) -> Result<Vec<Record<F>>, GatewayError> {
        let url = self.records_url(F::APP_ID);
        debug!("GET {} ({})", url, F::COLLECTION_NAME);
        let listing: BTreeMap<String, serde_json::Value> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records_from_listing(listing))
    }

    async fn get<F: RecordFields>(&self, record_id: &str) -> Result<Record<F>, GatewayError> {
        let url = self.record_url(F::APP_ID, record_id);
        debug!("GET {} ({})", url, F::COLLECTION_NAME);
        let payload: RecordPayload<F> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(payload.into_record(record_id.to_owned()))
    }

    async fn create<F: RecordFields>(&self, fields: F) -> Result<Record<F>, GatewayError> {
        let url = self.records_url(F::APP_ID);
        debug!("POST {} ({})", url, F::COLLECTION_NAME);
        let created: CreatedRecord = self
            .client
            .post(url)
            .json(&FieldsBody { fields: &fields })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        self.get(&created.id).await
    }

    async fn update<F: RecordFields>(
        &self,
        record_id: &str,
        fields: F,
    ) -> Result<Record<F>, GatewayError> {
        let url = self.record_url(F::APP_ID, record_id);
        debug!("PATCH {} ({})", url, F::COLLECTION_NAME);
        self.client
            .patch(url)
            .json(&FieldsBody { fields: &fields })
            .send()
            .await?
            .error_for_status()?;
        self.get(record_id).await
    }

    async fn delete<F: RecordFields>(&self, record_id: &str) -> Result<(), GatewayError> {
        let url = self.record_url(F::APP_ID, record_id);
        debug!("DELETE {} ({})", url, F::COLLECTION_NAME);
        self.client.delete(url).send().await?.error_for_status()?;
        Ok(())
    }
}
