use std::collections::HashMap;

use log::{debug, info};
use zbus::{dbus_proxy, Connection};
use zvariant::Value;

use crate::reconcile::ApplyRequest;
use crate::resources::{Resources, ResourcesWire};

/// `(crtc, mode, x, y, transform, outputs, properties)`
pub type CrtcConfigWire = (u32, i32, i32, i32, u32, Vec<u32>, HashMap<String, Value<'static>>);

/// `(output, properties)`
pub type OutputConfigWire = (u32, HashMap<String, Value<'static>>);

#[dbus_proxy(
    interface = "org.gnome.Mutter.DisplayConfig",
    default_service = "org.gnome.Mutter.DisplayConfig",
    default_path = "/org/gnome/Mutter/DisplayConfig"
)]
trait DisplayConfig {
    fn get_resources(&self) -> zbus::Result<ResourcesWire>;

    fn apply_configuration(
        &self,
        serial: u32,
        persistent: bool,
        crtcs: &[CrtcConfigWire],
        outputs: &[OutputConfigWire],
    ) -> zbus::Result<()>;

    #[dbus_proxy(signal)]
    fn monitors_changed(&self) -> zbus::Result<()>;
}

/// Converts a request into `ApplyConfiguration` arguments.
pub fn request_to_wire(request: &ApplyRequest) -> (Vec<CrtcConfigWire>, Vec<OutputConfigWire>) {
    let crtcs = request
        .crtcs
        .iter()
        .map(|c| {
            (
                c.crtc,
                c.mode as i32,
                c.x,
                c.y,
                c.transform,
                c.outputs.clone(),
                HashMap::new(),
            )
        })
        .collect();
    let outputs = request
        .outputs
        .iter()
        .map(|o| {
            let mut properties = HashMap::new();
            if let Some(primary) = o.primary {
                properties.insert("primary".to_owned(), Value::from(primary));
            }
            (o.output, properties)
        })
        .collect();
    (crtcs, outputs)
}

/// Display backend talking to the compositor over the session bus.
pub struct MutterBackend {
    proxy: DisplayConfigProxy<'static>,
}

impl MutterBackend {
    pub async fn connect(connection: &Connection) -> zbus::Result<MutterBackend> {
        let proxy = DisplayConfigProxy::new(connection).await?;
        Ok(MutterBackend { proxy })
    }

    pub async fn snapshot(&self) -> zbus::Result<Resources> {
        let resources = Resources::from_wire(self.proxy.get_resources().await?);
        debug!("resources: {:#?}", resources);
        Ok(resources)
    }

    pub async fn apply(&self, request: &ApplyRequest) -> zbus::Result<()> {
        let (crtcs, outputs) = request_to_wire(request);
        info!(
            "Applying configuration (serial {}, {} crtcs, {} outputs)",
            request.serial,
            crtcs.len(),
            outputs.len()
        );
        self.proxy
            .apply_configuration(request.serial, request.persistent, &crtcs, &outputs)
            .await
    }

    pub async fn monitors_changed(&self) -> zbus::Result<MonitorsChangedStream<'static>> {
        self.proxy.receive_monitors_changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{CrtcAssignment, OutputAssignment};

    #[test]
    fn passthrough_outputs_carry_no_properties() {
        let request = ApplyRequest {
            serial: 3,
            persistent: true,
            crtcs: vec![CrtcAssignment {
                crtc: 60,
                mode: 100,
                x: 1920,
                y: 0,
                transform: 1,
                outputs: vec![71],
            }],
            outputs: vec![
                OutputAssignment {
                    output: 70,
                    primary: None,
                },
                OutputAssignment {
                    output: 71,
                    primary: Some(true),
                },
            ],
        };

        let (crtcs, outputs) = request_to_wire(&request);
        assert_eq!(crtcs.len(), 1);
        let (crtc, mode, x, y, transform, driven, properties) = &crtcs[0];
        assert_eq!((*crtc, *mode, *x, *y, *transform), (60, 100, 1920, 0, 1));
        assert_eq!(driven, &vec![71]);
        assert!(properties.is_empty());

        assert!(outputs[0].1.is_empty());
        assert_eq!(outputs[1].1.get("primary"), Some(&Value::from(true)));
    }
}
