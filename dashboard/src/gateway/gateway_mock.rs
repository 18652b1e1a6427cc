use crate::gateway::{GatewayError, RecordGateway};
use kursverwaltung_api_types::{Record, RecordFields};
use std::collections::HashMap;
use std::sync::Mutex;

/**
 * A mock [RecordGateway] implementation for testing.
 *
 * The simulated record storage consists of the [GatewayMockData] structure, holding the records of
 * each collection as JSON values, keyed by collection id. Updates are merged into the stored JSON
 * object key by key, like the real storage does. Tests can fill the collections with
 * [GatewayMock::insert] and inspect them directly.
 *
 * The [GatewayMockData.next_error] attribute can be set to simulate a failure of the next call.
 */
#[derive(Default)]
pub struct GatewayMock {
    pub data: Mutex<GatewayMockData>,
}

#[derive(Default)]
pub struct GatewayMockData {
    pub collections: HashMap<&'static str, Vec<Record<serde_json::Value>>>,
    /// If not none, the next call to a gateway method will return this error.
    pub next_error: Option<GatewayError>,
    /// If not none, the next call to [RecordGateway::list] for this collection will fail.
    pub fail_list_of: Option<&'static str>,
    pub list_calls: usize,
    pub mutation_calls: usize,
    next_id: u32,
}

impl GatewayMock {
    pub fn insert<F: RecordFields>(&self, record_id: &str, fields: F) {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        data.collections
            .entry(F::APP_ID)
            .or_default()
            .push(Record {
                record_id: record_id.to_owned(),
                createdat: "2025-01-01T00:00:00".to_owned(),
                updatedat: None,
                fields: serde_json::to_value(fields).expect("Fields must be serializable"),
            });
    }

    pub fn records<F: RecordFields>(&self) -> Vec<Record<F>> {
        let data = self.data.lock().expect("Error while locking mutex.");
        data.collections
            .get(F::APP_ID)
            .map(|records| records.iter().map(|r| typed_record(r).unwrap()).collect())
            .unwrap_or_default()
    }
}

fn typed_record<F: RecordFields>(
    record: &Record<serde_json::Value>,
) -> Result<Record<F>, GatewayError> {
    Ok(Record {
        record_id: record.record_id.clone(),
        createdat: record.createdat.clone(),
        updatedat: record.updatedat.clone(),
        fields: serde_json::from_value(record.fields.clone())?,
    })
}

impl RecordGateway for GatewayMock {
    async fn list<F: RecordFields>(&self) -> Result<Vec<Record<F>>, GatewayError> {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        data.list_calls += 1;
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        if data.fail_list_of == Some(F::APP_ID) {
            data.fail_list_of = None;
            return Err(GatewayError::ConnectionError(format!(
                "Simulated failure of {}",
                F::COLLECTION_NAME
            )));
        }
        data.collections
            .get(F::APP_ID)
            .map(|records| records.iter().map(typed_record::<F>).collect())
            .unwrap_or(Ok(Vec::new()))
    }

    async fn get<F: RecordFields>(&self, record_id: &str) -> Result<Record<F>, GatewayError> {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.collections
            .get(F::APP_ID)
            .and_then(|records| records.iter().find(|r| r.record_id == record_id))
            .ok_or(GatewayError::NotExisting)
            .and_then(typed_record::<F>)
    }

    async fn create<F: RecordFields>(&self, fields: F) -> Result<Record<F>, GatewayError> {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        data.mutation_calls += 1;
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        data.next_id += 1;
        let record = Record {
            record_id: format!("mock{:020}", data.next_id),
            createdat: chrono::Utc::now().to_rfc3339(),
            updatedat: None,
            fields: serde_json::to_value(fields)?,
        };
        let result = typed_record(&record)?;
        data.collections.entry(F::APP_ID).or_default().push(record);
        Ok(result)
    }

    async fn update<F: RecordFields>(
        &self,
        record_id: &str,
        fields: F,
    ) -> Result<Record<F>, GatewayError> {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        data.mutation_calls += 1;
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let patch = serde_json::to_value(fields)?;
        let record = data
            .collections
            .get_mut(F::APP_ID)
            .and_then(|records| records.iter_mut().find(|r| r.record_id == record_id))
            .ok_or(GatewayError::NotExisting)?;
        if let (Some(existing), serde_json::Value::Object(patch)) =
            (record.fields.as_object_mut(), patch)
        {
            existing.extend(patch);
        }
        record.updatedat = Some(chrono::Utc::now().to_rfc3339());
        typed_record(record)
    }

    async fn delete<F: RecordFields>(&self, record_id: &str) -> Result<(), GatewayError> {
        let mut data = self.data.lock().expect("Error while locking mutex.");
        data.mutation_calls += 1;
        if let Some(e) = data.next_error.take() {
            return Err(e);
        }
        let records = data.collections.entry(F::APP_ID).or_default();
        let previous_len = records.len();
        records.retain(|r| r.record_id != record_id);
        if records.len() == previous_len {
            return Err(GatewayError::NotExisting);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kursverwaltung_api_types::{KursFields, RaumFields};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_update_merges_fields() {
        let gateway = GatewayMock::default();
        gateway.insert(
            "k1",
            KursFields {
                titel: Some("Töpfern".to_string()),
                preis: Some(Decimal::new(5000, 2)),
                ..Default::default()
            },
        );

        let updated = gateway
            .update(
                "k1",
                KursFields {
                    preis: Some(Decimal::new(6000, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.fields.titel.as_deref(), Some("Töpfern"));
        assert_eq!(updated.fields.preis, Some(Decimal::new(6000, 2)));
        assert!(updated.updatedat.is_some());
        assert_eq!(gateway.records::<KursFields>()[0], updated);
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let gateway = GatewayMock::default();
        let created = gateway
            .create(RaumFields {
                raumname: Some("Werkstatt".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(!created.record_id.is_empty());
        assert_eq!(gateway.list::<RaumFields>().await.unwrap(), vec![created.clone()]);

        gateway.delete::<RaumFields>(&created.record_id).await.unwrap();
        assert!(gateway.list::<RaumFields>().await.unwrap().is_empty());
        assert!(matches!(
            gateway.delete::<RaumFields>(&created.record_id).await,
            Err(GatewayError::NotExisting)
        ));
    }

    #[tokio::test]
    async fn test_next_error() {
        let gateway = GatewayMock::default();
        gateway.data.lock().unwrap().next_error =
            Some(GatewayError::ConnectionError("offline".to_string()));
        assert!(gateway.list::<KursFields>().await.is_err());
        assert!(gateway.list::<KursFields>().await.unwrap().is_empty());
    }
}
