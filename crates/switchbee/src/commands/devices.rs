//! Device listing handlers: `get_devices` and `get_states`.

use std::sync::Arc;
use std::time::Duration;

use tabled::Tabled;

use switchbee_core::{Controller, ControllerConfig, Device};

use crate::cli::{GetDevicesArgs, GetStatesArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Hardware")]
    hardware: String,
    #[tabled(rename = "State")]
    state: String,
}

fn row(d: &Arc<Device>, color: bool) -> DeviceRow {
    DeviceRow {
        id: d.id.to_string(),
        name: d.name.clone(),
        zone: d.zone_name.clone(),
        dtype: d.device_type().display_name().into(),
        hardware: d.hardware.display_name().into(),
        state: output::state_cell(d.state.as_ref(), color),
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_list(
    config: ControllerConfig,
    args: &GetDevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut devices = Controller::oneshot(config, |c| async move { c.devices().await }).await?;
    if let Some(ty) = args.device_type {
        devices.retain(|d| d.device_type() == ty);
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &devices,
        |d| row(d, color),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Pause between `get_states --delay` rounds.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub async fn handle_states(
    config: ControllerConfig,
    args: &GetStatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let controller = Controller::new(config);
    controller.connect().await?;
    let result = poll_states(&controller, args, global).await;
    controller.disconnect().await;
    result
}

/// Fetch and print every state `args.delay` times.
async fn poll_states(
    controller: &Controller,
    args: &GetStatesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    for round in 0..args.delay {
        if round > 0 {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        let report = controller.refresh_states().await?;
        if !report.is_complete() && !global.quiet {
            let failed: Vec<String> = report.failed.iter().map(ToString::to_string).collect();
            eprintln!("Could not read state of: {}", failed.join(", "));
        }

        let devices = select_states(controller.devices().await?, args.only_on);
        let out = output::render_list(
            &global.output,
            &devices,
            |d| row(d, color),
            |d| d.id.to_string(),
        )?;
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

/// Devices with a readable state, optionally only those that are on.
fn select_states(devices: Vec<Arc<Device>>, only_on: bool) -> Vec<Arc<Device>> {
    devices
        .into_iter()
        .filter(|d| d.is_pollable())
        .filter(|d| !only_on || d.is_on())
        .collect()
}
