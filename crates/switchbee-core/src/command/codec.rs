// ── Per-variant validation and wire encoding ──
//
// Wire forms by variant:
//   on/off      "ON" | "OFF"
//   percent     integer 0-100 (reported "ON"/"OFF" read as 100/0)
//   timer       "OFF" | minutes left as an integer (a bare "ON" is
//               accepted when reading)
//   thermostat  {"power","mode","fan","configuredTemperature",
//               "roomTemperature"}
//   trigger     "ON"

use serde_json::{Map, Value, json};

use super::{StateValue, ThermostatSetting};
use crate::error::CoreError;
use crate::model::{Device, DeviceKind, DeviceState, Power, StateDomain, ThermostatState};

pub const MIN_TARGET_TEMPERATURE: i32 = 16;
pub const MAX_TARGET_TEMPERATURE: i32 = 31;

const KEY_POWER: &str = "power";
const KEY_MODE: &str = "mode";
const KEY_FAN: &str = "fan";
const KEY_TARGET: &str = "configuredTemperature";
const KEY_ROOM: &str = "roomTemperature";

/// A validated command ready for `OPERATE`.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedCommand {
    /// The `value` field of the `OPERATE` params.
    pub value: Value,
    /// State to record once the central unit accepts the command.
    /// `None` for triggers, and for thermostat updates without a power
    /// value when no previous thermostat state is known.
    pub optimistic: Option<DeviceState>,
}

/// A request checked against its variant's domain.
enum Resolved {
    Power(Power),
    Percent(u8),
    TimerOff,
    TimerOn(Option<u32>),
    Thermostat(ThermostatSetting),
    Trigger,
}

/// Validate `requested` for `device` and encode it.
///
/// Fails with [`CoreError::InvalidState`] when the value is outside the
/// variant's domain.
pub fn encode(device: &Device, requested: &StateValue) -> Result<EncodedCommand, CoreError> {
    let resolved = resolve(&device.kind, requested).map_err(|message| CoreError::InvalidState {
        device: format!("{} ({})", device.name, device.id),
        message,
    })?;

    Ok(EncodedCommand {
        value: wire_value(&resolved),
        optimistic: optimistic_state(resolved, device.state.as_ref()),
    })
}

fn resolve(kind: &DeviceKind, requested: &StateValue) -> Result<Resolved, String> {
    match (kind.domain(), requested) {
        (StateDomain::OnOff, StateValue::On) => Ok(Resolved::Power(Power::On)),
        (StateDomain::OnOff, StateValue::Off) => Ok(Resolved::Power(Power::Off)),
        (StateDomain::OnOff, other) => Err(format!("expects ON or OFF, got {other}")),

        (StateDomain::Percent, StateValue::Percent(p)) => percent(u32::from(*p)),
        (StateDomain::Percent, StateValue::Number(n)) => percent(*n),
        (StateDomain::Percent, StateValue::On | StateValue::Off) => {
            Err("expects a percentage between 0 and 100, not ON/OFF".into())
        }
        (StateDomain::Percent, other) => {
            Err(format!("expects a percentage between 0 and 100, got {other}"))
        }

        (StateDomain::Timer, StateValue::Off) => Ok(Resolved::TimerOff),
        (StateDomain::Timer, StateValue::On) => Ok(Resolved::TimerOn(None)),
        (StateDomain::Timer, StateValue::Minutes(m) | StateValue::Number(m)) => {
            if *m == 0 {
                Err("minute count must be positive".into())
            } else {
                Ok(Resolved::TimerOn(Some(*m)))
            }
        }
        (StateDomain::Timer, other) => {
            Err(format!("expects OFF, ON or a positive minute count, got {other}"))
        }

        (StateDomain::Thermostat, value) => {
            let setting = match value {
                StateValue::Thermostat(setting) => setting.clone(),
                StateValue::On | StateValue::Off => ThermostatSetting {
                    power: Some(if *value == StateValue::On { Power::On } else { Power::Off }),
                    ..ThermostatSetting::default()
                },
                StateValue::Number(n) => ThermostatSetting {
                    target_temperature: Some(i32::try_from(*n).unwrap_or(i32::MAX)),
                    ..ThermostatSetting::default()
                },
                other => return Err(format!("expects a thermostat setting, got {other}")),
            };
            thermostat(kind, setting).map(Resolved::Thermostat)
        }

        (StateDomain::Trigger, StateValue::On) => Ok(Resolved::Trigger),
        (StateDomain::Trigger, other) => {
            Err(format!("can only be triggered with ON, got {other}"))
        }

        (StateDomain::Stateless, _) => {
            Err(format!("{} devices do not accept state commands", kind.device_type()))
        }
    }
}

fn percent(n: u32) -> Result<Resolved, String> {
    match u8::try_from(n) {
        Ok(p) if p <= 100 => Ok(Resolved::Percent(p)),
        _ => Err(format!("percentage must be between 0 and 100, got {n}")),
    }
}

fn thermostat(
    kind: &DeviceKind,
    mut setting: ThermostatSetting,
) -> Result<ThermostatSetting, String> {
    if setting.is_empty() {
        return Err("thermostat setting is empty".into());
    }
    if let Some(target) = setting.target_temperature {
        if !(MIN_TARGET_TEMPERATURE..=MAX_TARGET_TEMPERATURE).contains(&target) {
            return Err(format!(
                "target temperature must be between {MIN_TARGET_TEMPERATURE} and \
                 {MAX_TARGET_TEMPERATURE}, got {target}"
            ));
        }
    }
    if let (Some(mode), DeviceKind::Thermostat { modes, .. }) = (&setting.mode, kind) {
        if !modes.is_empty() {
            let Some(advertised) = modes.iter().find(|m| m.eq_ignore_ascii_case(mode)) else {
                return Err(format!("mode {mode} not supported (available: {})", modes.join(", ")));
            };
            setting.mode = Some(advertised.clone());
        }
    }
    Ok(setting)
}

fn wire_value(resolved: &Resolved) -> Value {
    match resolved {
        Resolved::Power(power) => json!(power.as_ref()),
        Resolved::Percent(p) => json!(p),
        Resolved::TimerOff => json!(Power::Off.as_ref()),
        Resolved::TimerOn(None) | Resolved::Trigger => json!(Power::On.as_ref()),
        Resolved::TimerOn(Some(m)) => json!(m),
        Resolved::Thermostat(setting) => {
            let mut obj = Map::new();
            if let Some(power) = setting.power {
                obj.insert(KEY_POWER.into(), json!(power.as_ref()));
            }
            if let Some(mode) = &setting.mode {
                obj.insert(KEY_MODE.into(), json!(mode));
            }
            if let Some(fan) = &setting.fan {
                obj.insert(KEY_FAN.into(), json!(fan));
            }
            if let Some(target) = setting.target_temperature {
                obj.insert(KEY_TARGET.into(), json!(target));
            }
            Value::Object(obj)
        }
    }
}

fn optimistic_state(resolved: Resolved, previous: Option<&DeviceState>) -> Option<DeviceState> {
    match resolved {
        Resolved::Power(power) => Some(DeviceState::OnOff { power }),
        Resolved::Percent(value) => Some(DeviceState::Percent { value }),
        Resolved::TimerOff => Some(DeviceState::Timer {
            power: Power::Off,
            minutes_left: Some(0),
        }),
        Resolved::TimerOn(minutes_left) => Some(DeviceState::Timer {
            power: Power::On,
            minutes_left,
        }),
        Resolved::Thermostat(setting) => {
            let base = match previous {
                Some(DeviceState::Thermostat(t)) => Some(t.clone()),
                _ => None,
            };
            let power = setting.power.or(base.as_ref().map(|b| b.power))?;
            let base = base.unwrap_or(ThermostatState {
                power,
                mode: None,
                fan: None,
                target_temperature: None,
                room_temperature: None,
            });
            Some(DeviceState::Thermostat(ThermostatState {
                power,
                mode: setting.mode.or(base.mode),
                fan: setting.fan.or(base.fan),
                target_temperature: setting.target_temperature.or(base.target_temperature),
                room_temperature: base.room_temperature,
            }))
        }
        Resolved::Trigger => None,
    }
}

// ── Decoding ─────────────────────────────────────────────────────────

/// Decode a reported state for a device variant.
///
/// Fails with [`CoreError::Protocol`] when the payload does not fit the
/// variant.
pub fn decode(kind: &DeviceKind, raw: &Value) -> Result<DeviceState, CoreError> {
    let bad = || {
        CoreError::protocol(format!(
            "unexpected state {raw} for {} device",
            kind.device_type()
        ))
    };

    match kind.domain() {
        StateDomain::OnOff => match power_token(raw) {
            Some(power) => Ok(DeviceState::OnOff { power }),
            None => Err(bad()),
        },
        StateDomain::Percent => {
            let value = match power_token(raw) {
                Some(Power::On) => 100,
                Some(Power::Off) => 0,
                None => integer(raw)
                    .and_then(|n| u8::try_from(n).ok())
                    .filter(|p| *p <= 100)
                    .ok_or_else(bad)?,
            };
            Ok(DeviceState::Percent { value })
        }
        StateDomain::Timer => match power_token(raw) {
            Some(Power::Off) => Ok(DeviceState::Timer {
                power: Power::Off,
                minutes_left: Some(0),
            }),
            Some(Power::On) => Ok(DeviceState::Timer {
                power: Power::On,
                minutes_left: None,
            }),
            None => {
                let minutes = integer(raw).ok_or_else(bad)?;
                let power = if minutes == 0 { Power::Off } else { Power::On };
                Ok(DeviceState::Timer {
                    power,
                    minutes_left: Some(minutes),
                })
            }
        },
        StateDomain::Thermostat => {
            let obj = raw.as_object().ok_or_else(bad)?;
            let power = obj.get(KEY_POWER).and_then(power_token).ok_or_else(bad)?;
            Ok(DeviceState::Thermostat(ThermostatState {
                power,
                mode: obj.get(KEY_MODE).and_then(Value::as_str).map(str::to_owned),
                fan: obj.get(KEY_FAN).and_then(Value::as_str).map(str::to_owned),
                target_temperature: obj
                    .get(KEY_TARGET)
                    .and_then(integer)
                    .and_then(|t| i32::try_from(t).ok()),
                room_temperature: obj.get(KEY_ROOM).and_then(float),
            }))
        }
        StateDomain::Trigger | StateDomain::Stateless => Err(CoreError::protocol(format!(
            "{} devices have no readable state",
            kind.device_type()
        ))),
    }
}

fn power_token(raw: &Value) -> Option<Power> {
    raw.as_str().and_then(|s| s.parse().ok())
}

/// Non-negative integer, given as a JSON number or a numeric string.
fn integer(raw: &Value) -> Option<u32> {
    match raw {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceId, HardwareType, TemperatureUnit, ZoneId};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn device(kind: DeviceKind) -> Device {
        Device {
            id: DeviceId::new(10),
            name: "test".into(),
            kind,
            hardware: HardwareType::RegularSwitch,
            zone_id: ZoneId::new(0),
            zone_name: "Zone".into(),
            state: None,
        }
    }

    fn thermostat() -> DeviceKind {
        DeviceKind::Thermostat {
            modes: vec!["COOL".into(), "HEAT".into()],
            unit: TemperatureUnit::Celsius,
        }
    }

    fn invalid(kind: DeviceKind, value: StateValue) -> bool {
        matches!(encode(&device(kind), &value), Err(CoreError::InvalidState { .. }))
    }

    // ── Validation ───────────────────────────────────────────────────

    #[test]
    fn switch_accepts_only_on_off() {
        let enc = encode(&device(DeviceKind::Switch), &StateValue::On).unwrap();
        assert_eq!(enc.value, json!("ON"));
        assert!(invalid(DeviceKind::Switch, StateValue::Percent(50)));
        assert!(invalid(DeviceKind::TwoWay, StateValue::Number(1)));
    }

    #[test]
    fn percent_bounds() {
        assert_eq!(
            encode(&device(DeviceKind::Dimmer), &StateValue::Number(100)).unwrap().value,
            json!(100)
        );
        assert!(invalid(DeviceKind::Dimmer, StateValue::Number(101)));
        assert!(invalid(DeviceKind::Shutter, StateValue::Percent(200)));
        assert!(invalid(DeviceKind::Shutter, StateValue::Number(70_000)));
    }

    #[test]
    fn boolean_to_percent_device_is_invalid() {
        assert!(invalid(DeviceKind::Dimmer, StateValue::On));
        assert!(invalid(DeviceKind::Shutter, StateValue::Off));
    }

    #[test]
    fn timer_rules() {
        let dev = device(DeviceKind::TimedPower);
        assert_eq!(encode(&dev, &StateValue::Off).unwrap().value, json!("OFF"));
        assert_eq!(encode(&dev, &StateValue::On).unwrap().value, json!("ON"));
        assert_eq!(encode(&dev, &StateValue::Minutes(30)).unwrap().value, json!(30));
        assert!(invalid(DeviceKind::TimedPower, StateValue::Minutes(0)));
        assert!(invalid(DeviceKind::TimedPower, StateValue::Percent(30)));
    }

    #[test]
    fn thermostat_rules() {
        let enc = encode(
            &device(thermostat()),
            &StateValue::Thermostat(ThermostatSetting {
                power: Some(Power::On),
                mode: Some("cool".into()),
                fan: Some("HIGH".into()),
                target_temperature: Some(22),
            }),
        )
        .unwrap();
        assert_eq!(
            enc.value,
            json!({ "power": "ON", "mode": "COOL", "fan": "HIGH", "configuredTemperature": 22 })
        );

        assert!(invalid(thermostat(), StateValue::Number(15)));
        assert!(invalid(thermostat(), StateValue::Number(32)));
        assert!(invalid(
            thermostat(),
            StateValue::Thermostat(ThermostatSetting {
                mode: Some("DRY".into()),
                ..ThermostatSetting::default()
            })
        ));
        assert!(invalid(
            thermostat(),
            StateValue::Thermostat(ThermostatSetting::default())
        ));
    }

    #[test]
    fn scenarios_trigger_only() {
        let enc = encode(&device(DeviceKind::Scenario), &StateValue::On).unwrap();
        assert_eq!(enc.optimistic, None);
        assert!(invalid(DeviceKind::RollingScenario, StateValue::Off));
    }

    #[test]
    fn stateless_devices_reject_everything() {
        assert!(invalid(DeviceKind::Somfy, StateValue::On));
        assert!(invalid(DeviceKind::IrDevice, StateValue::Number(1)));
        assert!(invalid(DeviceKind::Repeater, StateValue::Off));
        assert!(invalid(DeviceKind::LockGroup, StateValue::On));
    }

    #[test]
    fn partial_thermostat_update_merges_into_previous() {
        let mut dev = device(thermostat());
        dev.state = Some(DeviceState::Thermostat(ThermostatState {
            power: Power::On,
            mode: Some("HEAT".into()),
            fan: Some("LOW".into()),
            target_temperature: Some(20),
            room_temperature: Some(18.5),
        }));

        let enc = encode(&dev, &StateValue::Number(24)).unwrap();
        assert_eq!(enc.value, json!({ "configuredTemperature": 24 }));
        let Some(DeviceState::Thermostat(t)) = enc.optimistic else {
            panic!("expected thermostat state");
        };
        assert_eq!(t.target_temperature, Some(24));
        assert_eq!(t.mode.as_deref(), Some("HEAT"));
        assert_eq!(t.room_temperature, Some(18.5));

        // Without a known state there is nothing to merge a power-less update into.
        let enc = encode(&device(thermostat()), &StateValue::Number(24)).unwrap();
        assert!(enc.optimistic.is_none());
    }

    // ── Decoding ─────────────────────────────────────────────────────

    #[test]
    fn percent_aliases() {
        let percent = |kind: &DeviceKind, raw| decode(kind, &raw).unwrap();
        assert_eq!(percent(&DeviceKind::Dimmer, json!("ON")), DeviceState::Percent { value: 100 });
        assert_eq!(percent(&DeviceKind::Shutter, json!("OFF")), DeviceState::Percent { value: 0 });
        assert_eq!(percent(&DeviceKind::Shutter, json!("45")), DeviceState::Percent { value: 45 });
        assert!(decode(&DeviceKind::Dimmer, &json!(150)).is_err());
    }

    #[test]
    fn timer_decoding() {
        assert_eq!(
            decode(&DeviceKind::TimedPower, &json!(12)).unwrap(),
            DeviceState::Timer { power: Power::On, minutes_left: Some(12) }
        );
        assert_eq!(
            decode(&DeviceKind::TimedPower, &json!("OFF")).unwrap(),
            DeviceState::Timer { power: Power::Off, minutes_left: Some(0) }
        );
        assert_eq!(
            decode(&DeviceKind::TimedPower, &json!("ON")).unwrap(),
            DeviceState::Timer { power: Power::On, minutes_left: None }
        );
    }

    #[test]
    fn thermostat_decoding() {
        let state = decode(
            &thermostat(),
            &json!({
                "power": "ON", "mode": "COOL", "fan": "AUTO",
                "configuredTemperature": 23, "roomTemperature": 25.5
            }),
        )
        .unwrap();
        assert_eq!(
            state,
            DeviceState::Thermostat(ThermostatState {
                power: Power::On,
                mode: Some("COOL".into()),
                fan: Some("AUTO".into()),
                target_temperature: Some(23),
                room_temperature: Some(25.5),
            })
        );
        assert!(decode(&thermostat(), &json!("ON")).is_err());
    }

    #[test]
    fn mismatched_payloads_are_protocol_errors() {
        assert!(matches!(
            decode(&DeviceKind::Switch, &json!(50)),
            Err(CoreError::Protocol { .. })
        ));
        assert!(matches!(
            decode(&DeviceKind::Scenario, &json!("ON")),
            Err(CoreError::Protocol { .. })
        ));
    }

    // ── Round trip ───────────────────────────────────────────────────

    fn on_off_kind() -> impl Strategy<Value = DeviceKind> {
        prop_oneof![
            Just(DeviceKind::Switch),
            Just(DeviceKind::GroupSwitch),
            Just(DeviceKind::TimedSwitch),
            Just(DeviceKind::TwoWay),
        ]
    }

    fn command_strategy() -> impl Strategy<Value = (DeviceKind, StateValue)> {
        let power = prop_oneof![Just(StateValue::On), Just(StateValue::Off)];
        let percent_kind = prop_oneof![Just(DeviceKind::Dimmer), Just(DeviceKind::Shutter)];
        let percent = prop_oneof![
            (0u8..=100).prop_map(StateValue::Percent),
            (0u32..=100).prop_map(StateValue::Number),
        ];
        let timer = prop_oneof![
            Just(StateValue::On),
            Just(StateValue::Off),
            (1u32..).prop_map(StateValue::Minutes),
            (1u32..).prop_map(StateValue::Number),
        ];
        let setting = (
            prop_oneof![Just(Power::On), Just(Power::Off)],
            proptest::option::of(prop_oneof![Just("COOL"), Just("heat")]),
            proptest::option::of(prop_oneof![Just("LOW"), Just("HIGH"), Just("AUTO")]),
            proptest::option::of(MIN_TARGET_TEMPERATURE..=MAX_TARGET_TEMPERATURE),
        )
            .prop_map(|(power, mode, fan, target)| {
                StateValue::Thermostat(ThermostatSetting {
                    power: Some(power),
                    mode: mode.map(str::to_owned),
                    fan: fan.map(str::to_owned),
                    target_temperature: target,
                })
            });

        prop_oneof![
            (on_off_kind(), power),
            (percent_kind, percent),
            timer.prop_map(|v| (DeviceKind::TimedPower, v)),
            setting.prop_map(|v| (thermostat(), v)),
        ]
    }

    proptest! {
        #[test]
        fn encode_then_decode_recovers_requested_value((kind, value) in command_strategy()) {
            let enc = encode(&device(kind.clone()), &value).unwrap();
            let decoded = decode(&kind, &enc.value).unwrap();
            prop_assert_eq!(Some(decoded), enc.optimistic, "{:?} {}", kind, value);
        }
    }
}
