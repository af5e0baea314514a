//! Typed convenience API over the record store, one method family per
//! portal collection. Everything here is a thin delegation; the generic
//! operations on [`RecordStore`] remain available for schemaless callers.

use crate::record_store::RecordStore;
use brokerbase_commons::document::Document;
use brokerbase_commons::error::Result;
use brokerbase_commons::records::{Claim, MedicalRecord, Policy, Quote};
use brokerbase_commons::schema::Collection;
use serde::de::DeserializeOwned;
use serde::Serialize;

impl RecordStore {
    async fn save_typed<T>(&self, collection: Collection, record: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let doc = Document::from_typed(record)?;
        let stored = self.save(collection, doc.into_value()).await?;
        stored.to_typed()
    }

    async fn get_all_typed<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>> {
        self.get_all(collection)
            .await?
            .iter()
            .map(Document::to_typed)
            .collect()
    }

    async fn search_typed<T: DeserializeOwned>(
        &self,
        collection: Collection,
        index: &str,
        value: &str,
    ) -> Result<Vec<T>> {
        self.search_by_index(collection, index, value)
            .await?
            .iter()
            .map(Document::to_typed)
            .collect()
    }

    // --- quotes ---

    pub async fn save_quote(&self, quote: &Quote) -> Result<Quote> {
        self.save_typed(Collection::Quotes, quote).await
    }

    pub async fn quotes(&self) -> Result<Vec<Quote>> {
        self.get_all_typed(Collection::Quotes).await
    }

    pub async fn delete_quote(&self, id: &str) -> Result<()> {
        self.delete(Collection::Quotes, id).await
    }

    // --- policies ---

    pub async fn save_policy(&self, policy: &Policy) -> Result<Policy> {
        self.save_typed(Collection::Policies, policy).await
    }

    pub async fn policies(&self) -> Result<Vec<Policy>> {
        self.get_all_typed(Collection::Policies).await
    }

    /// Policies with exactly this policy number.
    pub async fn search_policies(&self, policy_number: &str) -> Result<Vec<Policy>> {
        self.search_typed(Collection::Policies, "policyNumber", policy_number)
            .await
    }

    /// Policies bought under this PAN.
    pub async fn policies_by_pan(&self, pan_number: &str) -> Result<Vec<Policy>> {
        self.search_typed(Collection::Policies, "panNumber", pan_number)
            .await
    }

    pub async fn delete_policy(&self, id: &str) -> Result<()> {
        self.delete(Collection::Policies, id).await
    }

    // --- claims ---

    pub async fn save_claim(&self, claim: &Claim) -> Result<Claim> {
        self.save_typed(Collection::Claims, claim).await
    }

    pub async fn claims(&self) -> Result<Vec<Claim>> {
        self.get_all_typed(Collection::Claims).await
    }

    /// Claims with exactly this claim id (external id, not the record id).
    pub async fn search_claims(&self, claim_id: &str) -> Result<Vec<Claim>> {
        self.search_typed(Collection::Claims, "claimId", claim_id)
            .await
    }

    /// All claims filed against a policy number.
    pub async fn claims_for_policy(&self, policy_number: &str) -> Result<Vec<Claim>> {
        self.search_typed(Collection::Claims, "policyNumber", policy_number)
            .await
    }

    pub async fn delete_claim(&self, id: &str) -> Result<()> {
        self.delete(Collection::Claims, id).await
    }

    // --- medical records ---

    pub async fn save_medical_record(&self, record: &MedicalRecord) -> Result<MedicalRecord> {
        self.save_typed(Collection::MedicalRecords, record).await
    }

    pub async fn medical_records(&self) -> Result<Vec<MedicalRecord>> {
        self.get_all_typed(Collection::MedicalRecords).await
    }

    pub async fn delete_medical_record(&self, id: &str) -> Result<()> {
        self.delete(Collection::MedicalRecords, id).await
    }
}
