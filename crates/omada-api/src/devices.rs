// Device endpoints
//
// The device list is not paged. Switches and APs have their own detail
// endpoints; reboot/upgrade are commands under `cmd/devices`.

use tracing::debug;

use crate::client::OmadaClient;
use crate::error::Error;
use crate::models::{Device, SwitchPort};

impl OmadaClient {
    /// `GET /sites/{site}/devices`
    pub async fn get_devices(&self) -> Result<Vec<Device>, Error> {
        self.get_as(&self.site_path("/devices"), &[]).await
    }

    /// `POST /sites/{site}/cmd/devices/{mac}/reboot`
    pub async fn reboot_device(&self, mac: &str) -> Result<(), Error> {
        debug!(mac, "rebooting device");
        self.post(&self.site_path(&format!("/cmd/devices/{mac}/reboot")), None)
            .await?;
        Ok(())
    }

    /// Start a firmware upgrade from the controller's online catalog.
    ///
    /// `POST /sites/{site}/cmd/devices/{mac}/onlineUpgrade`
    pub async fn upgrade_device(&self, mac: &str) -> Result<(), Error> {
        debug!(mac, "starting online upgrade");
        self.post(
            &self.site_path(&format!("/cmd/devices/{mac}/onlineUpgrade")),
            None,
        )
        .await?;
        Ok(())
    }

    /// `GET /sites/{site}/switches/{mac}`
    pub async fn get_switch(&self, mac: &str) -> Result<Device, Error> {
        self.get_as(&self.site_path(&format!("/switches/{mac}")), &[]).await
    }

    /// `GET /sites/{site}/switches/{mac}/ports`
    pub async fn get_switch_ports(&self, mac: &str) -> Result<Vec<SwitchPort>, Error> {
        self.get_as(&self.site_path(&format!("/switches/{mac}/ports")), &[]).await
    }

    /// `GET /sites/{site}/eaps/{mac}`
    pub async fn get_ap(&self, mac: &str) -> Result<Device, Error> {
        self.get_as(&self.site_path(&format!("/eaps/{mac}")), &[]).await
    }
}
