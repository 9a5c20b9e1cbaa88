//! `set_state` handler.

use std::sync::Arc;

use switchbee_core::{Controller, ControllerConfig, Device, Power, StateValue, ThermostatSetting};

use crate::cli::{GlobalOpts, SetStateArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    config: ControllerConfig,
    args: SetStateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let value = requested_value(&args)?;
    let id = args.device_id;
    tracing::debug!(%id, %value, "setting state");

    let device = Controller::oneshot(config, move |c| async move {
        c.set_state(id, &value).await?;
        c.find_device(id).await
    })
    .await?;

    let out = output::render_single(&global.output, &device, detail, |d| d.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(d: &Arc<Device>) -> String {
    let state = d
        .state
        .as_ref()
        .map_or_else(|| "sent".into(), ToString::to_string);
    format!("{} ({}): {state}", d.name, d.id)
}

/// Combine `--state` with the thermostat options into one request.
fn requested_value(args: &SetStateArgs) -> Result<StateValue, CliError> {
    let thermostat = args.mode.is_some() || args.fan.is_some() || args.temperature.is_some();
    if !thermostat {
        return args.state.clone().ok_or_else(|| CliError::Validation {
            field: "state".into(),
            reason: "a value is required".into(),
        });
    }

    let power = match args.state {
        None => None,
        Some(StateValue::On) => Some(Power::On),
        Some(StateValue::Off) => Some(Power::Off),
        Some(ref other) => {
            return Err(CliError::Validation {
                field: "state".into(),
                reason: format!(
                    "'{other}' cannot be combined with thermostat options, use ON or OFF"
                ),
            });
        }
    };

    Ok(StateValue::Thermostat(ThermostatSetting {
        power,
        mode: args.mode.clone(),
        fan: args.fan.clone(),
        target_temperature: args.temperature,
    }))
}
