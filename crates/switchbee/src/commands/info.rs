//! Central unit handlers: `info` and `stats`.

use std::collections::BTreeMap;

use serde::Serialize;

use switchbee_core::{Controller, ControllerConfig, ZoneId};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct InfoView {
    name: String,
    mac: String,
    version: String,
    last_conf_change: i64,
    devices: usize,
    zones: Vec<ZoneSummary>,
    /// Unit id → hardware on that module.
    modules: BTreeMap<u32, String>,
}

#[derive(Debug, Serialize)]
struct ZoneSummary {
    id: ZoneId,
    name: String,
    devices: usize,
}

pub async fn handle_info(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let view = Controller::oneshot(config, |c| async move {
        let cu = c.central_unit().await?;
        let snapshot = c.snapshot().await?;
        let modules = snapshot
            .modules()
            .keys()
            .filter_map(|unit| snapshot.module_display(*unit).map(|name| (*unit, name)))
            .collect();
        let zones = snapshot
            .zones()
            .map(|z| ZoneSummary {
                id: z.id,
                name: z.name.clone(),
                devices: z.devices.len(),
            })
            .collect();
        Ok(InfoView {
            name: cu.name.clone(),
            mac: cu.mac.clone(),
            version: cu.version.clone(),
            last_conf_change: cu.last_conf_change,
            devices: snapshot.len(),
            zones,
            modules,
        })
    })
    .await?;

    let out = output::render_single(&global.output, &view, detail, |v| v.mac.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(v: &InfoView) -> String {
    let mut lines = vec![
        format!("Name:     {}", v.name),
        format!("MAC:      {}", v.mac),
        format!("Firmware: {}", v.version),
        format!("Devices:  {}", v.devices),
    ];
    if !v.zones.is_empty() {
        lines.push("Zones:".into());
        lines.extend(
            v.zones
                .iter()
                .map(|z| format!("  {:<3} {} ({} devices)", z.id.to_string(), z.name, z.devices)),
        );
    }
    if !v.modules.is_empty() {
        lines.push("Modules:".into());
        lines.extend(v.modules.iter().map(|(unit, name)| format!("  {unit:<5} {name}")));
    }
    lines.join("\n")
}

pub async fn handle_stats(config: ControllerConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = Controller::oneshot(config, |c| async move { c.get_stats().await }).await?;

    // Stats have no fixed shape; the table view is pretty JSON.
    let out = output::render_single(
        &global.output,
        &stats,
        |s| serde_json::to_string_pretty(s).unwrap_or_default(),
        ToString::to_string,
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
