// Client (station) endpoints
//
// Listing is paged; block/unblock are site-level commands under `cmd/`.

use serde_json::Value;
use tracing::debug;

use crate::client::OmadaClient;
use crate::error::Error;
use crate::models::Client;
use crate::pager::Pager;

impl OmadaClient {
    /// `GET /sites/{site}/clients/{mac}`
    pub async fn get_client(&self, mac: &str) -> Result<Client, Error> {
        self.get_as(&self.site_path(&format!("/clients/{mac}")), &[]).await
    }

    /// Every active client, all pages.
    pub async fn get_clients(&self) -> Result<Vec<Client>, Error> {
        self.page_clients(None, None).all().await
    }

    /// Pager over `GET /sites/{site}/clients`.
    pub fn page_clients(
        &self,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Pager<'_, Self, Client> {
        let query = self.page_query(self.site_path("/clients"), page_size, Vec::new());
        self.pager(query, page)
    }

    /// `PATCH /sites/{site}/clients/{mac}` with a partial client object,
    /// e.g. `{"name": "..."}`.
    pub async fn update_client(&self, mac: &str, data: &Value) -> Result<Value, Error> {
        debug!(mac, "updating client");
        self.patch(&self.site_path(&format!("/clients/{mac}")), data).await
    }

    /// `POST /sites/{site}/cmd/clients/{mac}/block`
    pub async fn block_client(&self, mac: &str) -> Result<(), Error> {
        debug!(mac, "blocking client");
        self.post(&self.site_path(&format!("/cmd/clients/{mac}/block")), None)
            .await?;
        Ok(())
    }

    /// `POST /sites/{site}/cmd/clients/{mac}/unblock`
    pub async fn unblock_client(&self, mac: &str) -> Result<(), Error> {
        debug!(mac, "unblocking client");
        self.post(&self.site_path(&format!("/cmd/clients/{mac}/unblock")), None)
            .await?;
        Ok(())
    }
}
