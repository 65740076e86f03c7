//! Registry snapshot: every registered name with its record and owner.

use futures::future::try_join_all;
use tracing::debug;
use xns_chain_client::{NameContract, ProviderError};
use xns_types::{DomainRecord, WalletAddress};

/// Point-in-time view of the registry. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    records: Vec<DomainRecord>,
}

impl RegistrySnapshot {
    pub fn records(&self) -> &[DomainRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&DomainRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn editable_by<'a>(
        &'a self,
        account: &'a WalletAddress,
    ) -> impl Iterator<Item = &'a DomainRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.is_owned_by(account))
    }
}

impl From<Vec<DomainRecord>> for RegistrySnapshot {
    fn from(records: Vec<DomainRecord>) -> Self {
        Self { records }
    }
}

/// Enumerates all names, then looks up record and owner for every name
/// concurrently. Any failed lookup fails the whole fetch.
pub async fn fetch_all<C: NameContract>(contract: &C) -> Result<RegistrySnapshot, ProviderError> {
    let names = contract.all_names().await?;
    debug!("fetching records for {} names", names.len());

    let lookups = names.into_iter().enumerate().map(|(id, name)| async move {
        let (record, owner) = futures::try_join!(contract.record(&name), contract.owner(&name))?;
        Ok::<_, ProviderError>(DomainRecord {
            id,
            name,
            record,
            owner,
        })
    });

    Ok(RegistrySnapshot {
        records: try_join_all(lookups).await?,
    })
}
