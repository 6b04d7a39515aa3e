//! In-memory stores.
//!
//! Volunteers are kept as an insertion-ordered list of individually locked
//! records. The outer `RwLock` is only taken for writing when a new volunteer
//! is appended; pairing transitions lock just the one record they touch, so
//! concurrent matches for different volunteers never serialize on each other.
//!
//! Both stores can be loaded from and saved to a JSON snapshot file.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::traits::{BaseRequestStore, BaseVolunteerStore};
use crate::common::{PairingError, RequestId, Result, VolunteerId};
use crate::domains::requests::HelpRequest;
use crate::domains::volunteers::VolunteerRecord;

type Slot = Arc<Mutex<VolunteerRecord>>;

#[derive(Default)]
struct Slots {
    order: Vec<Slot>,
    index: HashMap<VolunteerId, usize>,
}

// =============================================================================
// Volunteers
// =============================================================================

#[derive(Default)]
pub struct MemoryVolunteerStore {
    slots: RwLock<Slots>,
}

impl MemoryVolunteerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records, keeping their order.
    ///
    /// A later record with a repeated id replaces the earlier one in place.
    pub fn from_records(records: impl IntoIterator<Item = VolunteerRecord>) -> Self {
        let mut slots = Slots::default();
        for record in records {
            match slots.index.get(&record.id) {
                Some(&position) => slots.order[position] = Arc::new(Mutex::new(record)),
                None => {
                    slots.index.insert(record.id, slots.order.len());
                    slots.order.push(Arc::new(Mutex::new(record)));
                }
            }
        }
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Load a JSON array of `VolunteerRecord`s.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let records: Vec<VolunteerRecord> = serde_json::from_slice(&bytes)?;
        info!(
            path = %path.as_ref().display(),
            count = records.len(),
            "Loaded volunteer snapshot"
        );
        Ok(Self::from_records(records))
    }

    /// Write every record, paired or not, as a JSON array.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let records = self.snapshot().await;
        let json = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(path.as_ref(), json).await?;
        debug!(path = %path.as_ref().display(), count = records.len(), "Saved volunteer snapshot");
        Ok(())
    }

    /// Copy of every record in insertion order.
    pub async fn snapshot(&self) -> Vec<VolunteerRecord> {
        let mut records = Vec::new();
        for slot in self.slots_in_order().await {
            records.push(slot.lock().await.clone());
        }
        records
    }

    pub async fn len(&self) -> usize {
        self.slots.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn slots_in_order(&self) -> Vec<Slot> {
        self.slots.read().await.order.clone()
    }

    async fn slot(&self, id: VolunteerId) -> Result<Slot> {
        let slots = self.slots.read().await;
        let slot = slots
            .index
            .get(&id)
            .map(|&position| slots.order[position].clone());
        slot.ok_or(PairingError::VolunteerNotFound(id))
    }
}

#[async_trait]
impl BaseVolunteerStore for MemoryVolunteerStore {
    async fn list_eligible(&self) -> Result<Vec<VolunteerRecord>> {
        let mut eligible = Vec::new();
        for slot in self.slots_in_order().await {
            let record = slot.lock().await;
            if record.is_available() {
                eligible.push(record.clone());
            }
        }
        Ok(eligible)
    }

    async fn get(&self, id: VolunteerId) -> Result<VolunteerRecord> {
        let slot = self.slot(id).await?;
        let record = slot.lock().await;
        Ok(record.clone())
    }

    async fn try_assign(&self, id: VolunteerId, request_id: RequestId) -> Result<bool> {
        let slot = self.slot(id).await?;
        let mut record = slot.lock().await;
        if record.current_pairing.is_some() {
            debug!(volunteer_id = %id, request_id = %request_id, "Volunteer already paired");
            return Ok(false);
        }
        record.current_pairing = Some(request_id);
        Ok(true)
    }

    async fn release(&self, id: VolunteerId) -> Result<()> {
        let slot = self.slot(id).await?;
        let mut record = slot.lock().await;
        record.current_pairing = None;
        Ok(())
    }

    async fn upsert(&self, mut record: VolunteerRecord) -> Result<()> {
        if let Ok(slot) = self.slot(record.id).await {
            let mut existing = slot.lock().await;
            record.current_pairing = existing.current_pairing;
            *existing = record;
            return Ok(());
        }

        let mut slots = self.slots.write().await;
        // Another upsert may have appended the same id while we waited.
        if let Some(&position) = slots.index.get(&record.id) {
            let slot = slots.order[position].clone();
            drop(slots);
            let mut existing = slot.lock().await;
            record.current_pairing = existing.current_pairing;
            *existing = record;
            return Ok(());
        }
        let position = slots.order.len();
        slots.index.insert(record.id, position);
        slots.order.push(Arc::new(Mutex::new(record)));
        Ok(())
    }
}

// =============================================================================
// Requests
// =============================================================================

#[derive(Default)]
pub struct MemoryRequestStore {
    requests: RwLock<HashMap<RequestId, HelpRequest>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let requests: Vec<HelpRequest> = serde_json::from_slice(&bytes)?;
        Ok(Self {
            requests: RwLock::new(requests.into_iter().map(|r| (r.id, r)).collect()),
        })
    }

    /// Write all requests, oldest first.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let requests = self.snapshot().await;
        tokio::fs::write(path.as_ref(), serde_json::to_vec_pretty(&requests)?).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<HelpRequest> {
        let mut requests: Vec<HelpRequest> = self.requests.read().await.values().cloned().collect();
        requests.sort_by_key(|r| (r.created_at, r.id));
        requests
    }
}

#[async_trait]
impl BaseRequestStore for MemoryRequestStore {
    async fn insert(&self, request: HelpRequest) -> Result<()> {
        let mut requests = self.requests.write().await;
        if requests.contains_key(&request.id) {
            return Err(PairingError::Other(anyhow::anyhow!(
                "help request {} already exists",
                request.id
            )));
        }
        requests.insert(request.id, request);
        Ok(())
    }

    async fn get(&self, id: RequestId) -> Result<HelpRequest> {
        self.requests
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(PairingError::RequestNotFound(id))
    }

    async fn mark_escalated(&self, id: RequestId) -> Result<HelpRequest> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&id)
            .ok_or(PairingError::RequestNotFound(id))?;
        request.escalate()?;
        Ok(request.clone())
    }

    async fn accept_if_pending(&self, id: RequestId, volunteer_id: VolunteerId) -> Result<bool> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&id)
            .ok_or(PairingError::RequestNotFound(id))?;
        match request.accept(volunteer_id) {
            Ok(()) => Ok(true),
            Err(PairingError::InvalidState { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn complete(&self, id: RequestId) -> Result<VolunteerId> {
        let mut requests = self.requests.write().await;
        let request = requests
            .get_mut(&id)
            .ok_or(PairingError::RequestNotFound(id))?;
        request.complete()
    }
}
