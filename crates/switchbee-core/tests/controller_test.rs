#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a mocked central unit.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use switchbee_core::{
    Controller, ControllerConfig, CoreError, DeviceId, DeviceState, DeviceType, Power, StateValue,
    ThermostatSetting, ThermostatState, ZoneId,
};

// ── Fixtures ────────────────────────────────────────────────────────

const DIMMER: DeviceId = DeviceId::new(101);
const SWITCH: DeviceId = DeviceId::new(102);
const SHUTTER: DeviceId = DeviceId::new(103);
const TIMER: DeviceId = DeviceId::new(201);
const THERMOSTAT: DeviceId = DeviceId::new(202);
const SCENARIO: DeviceId = DeviceId::new(203);
const SOMFY: DeviceId = DeviceId::new(205);

fn configuration() -> Value {
    json!({
        "name": "Home",
        "version": "1.4.6(4)",
        "mac": "A8-21-08-E7-67-B6",
        "lastConfChange": 1_661_856_874_511_i64,
        "zones": [
            {
                "name": "Living room",
                "items": [
                    { "id": 101, "name": "Ceiling", "type": "DIMMER", "hw": "DIMMABLE_SWITCH" },
                    { "id": 102, "name": "Lamp", "type": "SWITCH", "hw": "REGULAR_SWITCH" },
                    { "id": 103, "name": "Blinds", "type": "SHUTTER", "hw": "SHUTTER" }
                ]
            },
            {
                "name": "Bedroom",
                "items": [
                    {
                        "id": 201, "name": "Boiler",
                        "type": "TIMED_POWER", "hw": "TIMED_POWER_SWITCH"
                    },
                    {
                        "id": 202, "name": "AC", "type": "THERMOSTAT", "hw": "THERMOSTAT",
                        "modes": ["COOL", "HEAT"], "temperatureUnits": "CELSIUS"
                    },
                    { "id": 203, "name": "Good night", "type": "SCENARIO", "hw": "VIRTUAL" },
                    { "id": 204, "name": "All off", "type": "GROUP_SWITCH", "hw": "VIRTUAL" },
                    { "id": 205, "name": "Curtain", "type": "SOMFY", "hw": "SOMFY" },
                    { "id": 206, "name": "Hologram", "type": "HOLOGRAM", "hw": "VIRTUAL" }
                ]
            }
        ]
    })
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": "OK", "data": data }))
}

fn status(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "status": status, "data": null }))
}

fn command(name: &str) -> impl wiremock::Match + 'static {
    body_partial_json(json!({ "command": name }))
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/commands"))
        .and(command("LOGIN"))
        .respond_with(ok(json!({ "token": "tok" })))
        .mount(server)
        .await;
}

async fn mount_configuration(server: &MockServer) {
    Mock::given(method("POST"))
        .and(command("GET_CONFIGURATION"))
        .respond_with(ok(configuration()))
        .mount(server)
        .await;
}

fn config_for(server: &MockServer) -> ControllerConfig {
    ControllerConfig::new(
        Url::parse(&server.uri()).unwrap(),
        "admin",
        "secret".to_string().into(),
    )
}

async fn connected() -> (MockServer, Controller) {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_configuration(&server).await;
    let controller = Controller::new(config_for(&server));
    controller.connect().await.unwrap();
    (server, controller)
}

async fn state_of(controller: &Controller, id: DeviceId) -> Option<DeviceState> {
    controller.find_device(id).await.unwrap().state.clone()
}

// ── Connection lifecycle ────────────────────────────────────────────

#[tokio::test]
async fn operations_before_connect_fail_with_not_connected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let controller = Controller::new(config_for(&server));

    assert!(matches!(controller.devices().await, Err(CoreError::NotConnected)));
    assert!(matches!(controller.zones().await, Err(CoreError::NotConnected)));
    assert!(matches!(controller.get_state(DIMMER).await, Err(CoreError::NotConnected)));
    assert!(matches!(
        controller.get_multiple_states(&[DIMMER]).await,
        Err(CoreError::NotConnected)
    ));
    assert!(matches!(
        controller.set_state(SWITCH, &StateValue::On).await,
        Err(CoreError::NotConnected)
    ));
    assert!(matches!(controller.refresh_states().await, Err(CoreError::NotConnected)));
    assert!(matches!(controller.refresh_configuration().await, Err(CoreError::NotConnected)));
    assert!(matches!(controller.central_unit().await, Err(CoreError::NotConnected)));
    assert!(matches!(controller.get_stats().await, Err(CoreError::NotConnected)));
}

#[tokio::test]
async fn connect_loads_identity_and_devices() {
    let (_server, controller) = connected().await;

    let cu = controller.central_unit().await.unwrap();
    assert_eq!(cu.name, "Home");
    assert_eq!(cu.mac, "A8-21-08-E7-67-B6");
    assert_eq!(cu.version, "1.4.6(4)");

    let ids: Vec<DeviceId> = controller.devices().await.unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![DIMMER, SWITCH, SHUTTER, TIMER, THERMOSTAT, SCENARIO, SOMFY]);

    let zones = controller.zones().await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[1].id, ZoneId::new(1));
    assert_eq!(zones[1].devices, vec![TIMER, THERMOSTAT, SCENARIO, SOMFY]);

    let blinds = controller.find_device(SHUTTER).await.unwrap();
    assert_eq!(blinds.device_type(), DeviceType::Shutter);
    assert_eq!(blinds.unit_id(), 10);
    assert!(blinds.state.is_none());
}

#[tokio::test]
async fn connect_with_bad_credentials_fails_with_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(command("LOGIN"))
        .respond_with(status("LOGIN_FAILED"))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    let result = controller.connect().await;

    assert!(matches!(result, Err(CoreError::Authentication { .. })), "{result:?}");
    assert!(!controller.is_connected().await);
}

#[tokio::test]
async fn connect_to_unreachable_host_fails_with_connectivity() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    drop(server);

    let result = Controller::new(config).connect().await;
    assert!(matches!(result, Err(CoreError::Connectivity { .. })), "{result:?}");
}

#[tokio::test]
async fn slow_central_unit_times_out_as_connectivity() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ok(json!({ "token": "tok" })).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config.timeout = Duration::from_millis(200);

    let result = Controller::new(config).connect().await;
    assert!(matches!(result, Err(CoreError::Connectivity { .. })), "{result:?}");
}

#[tokio::test]
async fn malformed_configuration_is_protocol_error() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(command("GET_CONFIGURATION"))
        .respond_with(ok(json!({ "zones": "nope" })))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    let result = controller.connect().await;

    assert!(matches!(result, Err(CoreError::Protocol { .. })), "{result:?}");
    assert!(!controller.is_connected().await);
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let (_server, controller) = connected().await;

    controller.disconnect().await;
    controller.disconnect().await;

    assert!(!controller.is_connected().await);
    assert!(controller.store().snapshot().is_none());
    assert!(matches!(controller.devices().await, Err(CoreError::NotConnected)));
}

#[tokio::test]
async fn reconnect_reloads_configuration() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(command("GET_CONFIGURATION"))
        .respond_with(ok(configuration()))
        .expect(2)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.unwrap();
    controller.connect().await.unwrap();
    assert!(controller.is_connected().await);
}

#[tokio::test]
async fn include_filter_limits_loaded_types() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_configuration(&server).await;

    let mut config = config_for(&server);
    config.include = vec![DeviceType::Switch, DeviceType::Dimmer];
    let controller = Controller::new(config);
    controller.connect().await.unwrap();

    let ids: Vec<DeviceId> = controller.devices().await.unwrap().iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![DIMMER, SWITCH]);
}

#[tokio::test]
async fn oneshot_connects_runs_and_disconnects() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_configuration(&server).await;

    let count = Controller::oneshot(config_for(&server), |controller| async move {
        Ok(controller.devices().await?.len())
    })
    .await
    .unwrap();

    assert_eq!(count, 7);
}

// ── set_state ───────────────────────────────────────────────────────

#[tokio::test]
async fn out_of_range_percent_makes_no_request() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("OPERATE"))
        .respond_with(ok(json!(null)))
        .expect(0)
        .mount(&server)
        .await;

    for value in [StateValue::Number(101), StateValue::Percent(150)] {
        let result = controller.set_state(DIMMER, &value).await;
        assert!(matches!(result, Err(CoreError::InvalidState { .. })), "{result:?}");
    }
    let result = controller.set_state(SHUTTER, &StateValue::Number(1000)).await;
    assert!(matches!(result, Err(CoreError::InvalidState { .. })), "{result:?}");
}

#[tokio::test]
async fn boolean_to_percent_device_is_invalid_state() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("OPERATE"))
        .respond_with(ok(json!(null)))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        controller.set_state(DIMMER, &StateValue::On).await,
        Err(CoreError::InvalidState { .. })
    ));
    assert!(matches!(
        controller.set_state(SHUTTER, &StateValue::Off).await,
        Err(CoreError::InvalidState { .. })
    ));
    assert!(matches!(
        controller.set_state(SOMFY, &StateValue::On).await,
        Err(CoreError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn unknown_device_is_not_found() {
    let (_server, controller) = connected().await;

    let result = controller.set_state(DeviceId::new(999), &StateValue::On).await;
    assert!(matches!(result, Err(CoreError::DeviceNotFound { id }) if id == DeviceId::new(999)));

    // Skipped items are not in the model either.
    let result = controller.get_state(DeviceId::new(204)).await;
    assert!(matches!(result, Err(CoreError::DeviceNotFound { .. })));
}

#[tokio::test]
async fn successful_set_state_updates_model_without_polling() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "command": "OPERATE",
            "params": { "directive": "SET", "itemId": 101, "value": 50 }
        })))
        .respond_with(ok(json!(50)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(command("GET_STATE"))
        .respond_with(ok(json!(0)))
        .expect(0)
        .mount(&server)
        .await;

    controller.set_state(DIMMER, &StateValue::Number(50)).await.unwrap();

    let devices = controller.devices().await.unwrap();
    let dimmer = devices.iter().find(|d| d.id == DIMMER).unwrap();
    assert_eq!(dimmer.state, Some(DeviceState::Percent { value: 50 }));
}

#[tokio::test]
async fn timed_power_sends_minutes() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "command": "OPERATE",
            "params": { "itemId": 201, "value": 30 }
        })))
        .respond_with(ok(json!(30)))
        .expect(1)
        .mount(&server)
        .await;

    controller.set_state(TIMER, &StateValue::Minutes(30)).await.unwrap();
    assert_eq!(
        state_of(&controller, TIMER).await,
        Some(DeviceState::Timer { power: Power::On, minutes_left: Some(30) })
    );
}

#[tokio::test]
async fn thermostat_update_is_recorded_once_power_is_known() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("OPERATE"))
        .respond_with(ok(json!(null)))
        .expect(3)
        .mount(&server)
        .await;

    // Target only, nothing known yet: sent, but there is no power to record.
    controller.set_state(THERMOSTAT, &StateValue::Number(24)).await.unwrap();
    assert_eq!(state_of(&controller, THERMOSTAT).await, None);

    let setting = ThermostatSetting {
        power: Some(Power::On),
        mode: Some("cool".into()),
        ..ThermostatSetting::default()
    };
    controller
        .set_state(THERMOSTAT, &StateValue::Thermostat(setting))
        .await
        .unwrap();
    controller.set_state(THERMOSTAT, &StateValue::Number(22)).await.unwrap();

    assert_eq!(
        state_of(&controller, THERMOSTAT).await,
        Some(DeviceState::Thermostat(ThermostatState {
            power: Power::On,
            mode: Some("COOL".into()),
            fan: None,
            target_temperature: Some(22),
            room_temperature: None,
        }))
    );
}

#[tokio::test]
async fn scenario_trigger_leaves_no_state() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "command": "OPERATE",
            "params": { "itemId": 203, "value": "ON" }
        })))
        .respond_with(ok(json!("ON")))
        .expect(1)
        .mount(&server)
        .await;

    controller.set_state(SCENARIO, &StateValue::On).await.unwrap();
    assert_eq!(state_of(&controller, SCENARIO).await, None);
}

#[tokio::test]
async fn rejected_command_keeps_last_confirmed_state() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("GET_STATE"))
        .respond_with(ok(json!("OFF")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(command("OPERATE"))
        .respond_with(status("FAILED"))
        .mount(&server)
        .await;

    controller.get_state(SWITCH).await.unwrap();
    let result = controller.set_state(SWITCH, &StateValue::On).await;

    assert!(matches!(result, Err(CoreError::Rejected { ref status }) if status == "FAILED"));
    assert_eq!(
        state_of(&controller, SWITCH).await,
        Some(DeviceState::OnOff { power: Power::Off })
    );
}

#[tokio::test]
async fn offline_device_maps_to_device_offline() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("OPERATE"))
        .respond_with(status("OFFLINE"))
        .mount(&server)
        .await;

    let result = controller.set_state(SWITCH, &StateValue::On).await;
    assert!(matches!(result, Err(CoreError::DeviceOffline)), "{result:?}");
    assert_eq!(state_of(&controller, SWITCH).await, None);
}

// ── Token expiry ────────────────────────────────────────────────────

#[tokio::test]
async fn expired_twice_surfaces_authentication_without_looping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(command("LOGIN"))
        .respond_with(ok(json!({ "token": "tok" })))
        // connect + exactly one re-login
        .expect(2)
        .mount(&server)
        .await;
    mount_configuration(&server).await;
    Mock::given(method("POST"))
        .and(command("OPERATE"))
        .respond_with(status("TOKEN_EXPIRED"))
        .expect(2)
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.unwrap();

    let result = controller.set_state(SWITCH, &StateValue::On).await;
    assert!(matches!(result, Err(CoreError::Authentication { .. })), "{result:?}");
    assert_eq!(state_of(&controller, SWITCH).await, None);
}

#[tokio::test]
async fn expired_once_is_transparent() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_configuration(&server).await;
    Mock::given(method("POST"))
        .and(command("GET_STATE"))
        .respond_with(status("INVALID_TOKEN"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(command("GET_STATE"))
        .respond_with(ok(json!("ON")))
        .mount(&server)
        .await;

    let controller = Controller::new(config_for(&server));
    controller.connect().await.unwrap();

    let state = controller.get_state(SWITCH).await.unwrap();
    assert_eq!(state, DeviceState::OnOff { power: Power::On });
    assert_eq!(controller.reconnect_count().await.unwrap(), 1);
}

// ── State synchronization ───────────────────────────────────────────

#[tokio::test]
async fn get_state_decodes_per_variant() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "command": "GET_STATE", "params": 103 })))
        .respond_with(ok(json!("ON")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "command": "GET_STATE", "params": 202 })))
        .respond_with(ok(json!({
            "power": "ON", "mode": "COOL", "fan": "AUTO",
            "configuredTemperature": 22, "roomTemperature": 24
        })))
        .mount(&server)
        .await;

    assert_eq!(
        controller.get_state(SHUTTER).await.unwrap(),
        DeviceState::Percent { value: 100 }
    );
    let DeviceState::Thermostat(ac) = controller.get_state(THERMOSTAT).await.unwrap() else {
        panic!("expected thermostat state");
    };
    assert_eq!(ac.target_temperature, Some(22));
    assert_eq!(ac.room_temperature, Some(24.0));
    assert!(state_of(&controller, THERMOSTAT).await.is_some());
}

#[tokio::test]
async fn get_state_with_wrong_shape_is_protocol_error() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("GET_STATE"))
        .respond_with(ok(json!({ "weird": true })))
        .mount(&server)
        .await;

    let result = controller.get_state(SWITCH).await;
    assert!(matches!(result, Err(CoreError::Protocol { .. })), "{result:?}");
    assert_eq!(state_of(&controller, SWITCH).await, None);
}

#[tokio::test]
async fn multiple_states_merge_by_id_not_position() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "command": "GET_MULTIPLE_STATES",
            "params": [101, 102, 103]
        })))
        .respond_with(ok(json!([
            { "id": 103, "state": 40 },
            { "id": 101, "state": 75 },
            { "id": 102, "state": "ON" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let report = controller
        .get_multiple_states(&[DIMMER, SWITCH, SHUTTER])
        .await
        .unwrap();

    assert_eq!(report.updated, vec![DIMMER, SWITCH, SHUTTER]);
    assert!(report.is_complete());
    assert_eq!(state_of(&controller, DIMMER).await, Some(DeviceState::Percent { value: 75 }));
    assert_eq!(state_of(&controller, SWITCH).await, Some(DeviceState::OnOff { power: Power::On }));
    assert_eq!(state_of(&controller, SHUTTER).await, Some(DeviceState::Percent { value: 40 }));
}

#[tokio::test]
async fn multiple_states_report_partial_failures() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("GET_MULTIPLE_STATES"))
        .respond_with(ok(json!([
            { "id": 101, "state": 20 },
            { "id": 102, "error": "NOT_RESPONDING" },
            { "id": 201, "state": null },
            { "id": 999, "state": "ON" }
        ])))
        .mount(&server)
        .await;

    let report = controller
        .get_multiple_states(&[DIMMER, SWITCH, SHUTTER, TIMER])
        .await
        .unwrap();

    assert_eq!(report.updated, vec![DIMMER]);
    assert_eq!(report.failed, vec![SWITCH, SHUTTER, TIMER]);
    assert_eq!(state_of(&controller, DIMMER).await, Some(DeviceState::Percent { value: 20 }));
    assert_eq!(state_of(&controller, SWITCH).await, None);
}

#[tokio::test]
async fn multiple_states_all_failed_is_protocol_error() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("GET_MULTIPLE_STATES"))
        .respond_with(ok(json!([{ "id": 102, "state": 12345 }])))
        .mount(&server)
        .await;

    let result = controller.get_multiple_states(&[SWITCH]).await;
    assert!(matches!(result, Err(CoreError::Protocol { .. })), "{result:?}");
}

#[tokio::test]
async fn multiple_states_rejects_unknown_ids_before_request() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("GET_MULTIPLE_STATES"))
        .respond_with(ok(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let result = controller.get_multiple_states(&[DIMMER, DeviceId::new(7)]).await;
    assert!(matches!(result, Err(CoreError::DeviceNotFound { id }) if id == DeviceId::new(7)));

    let report = controller.get_multiple_states(&[]).await.unwrap();
    assert_eq!(report, switchbee_core::StateReport::default());
}

#[tokio::test]
async fn refresh_states_polls_only_readable_devices() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "command": "GET_MULTIPLE_STATES",
            "params": [101, 102, 103, 201, 202]
        })))
        .respond_with(ok(json!([
            { "id": 101, "state": "OFF" },
            { "id": 102, "state": "OFF" },
            { "id": 103, "state": 0 },
            { "id": 201, "state": 12 },
            { "id": 202, "state": { "power": "OFF" } }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let report = controller.refresh_states().await.unwrap();

    assert_eq!(report.updated.len(), 5);
    assert_eq!(
        state_of(&controller, TIMER).await,
        Some(DeviceState::Timer { power: Power::On, minutes_left: Some(12) })
    );
    assert_eq!(state_of(&controller, SCENARIO).await, None);
}

#[tokio::test]
async fn refresh_configuration_keeps_known_states() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("GET_STATE"))
        .respond_with(ok(json!("ON")))
        .mount(&server)
        .await;

    controller.get_state(SWITCH).await.unwrap();
    let report = controller.refresh_configuration().await.unwrap();

    assert_eq!(report.loaded, 7);
    assert_eq!(report.skipped_unknown, 1);
    assert_eq!(report.skipped_filtered, 1);
    assert_eq!(
        state_of(&controller, SWITCH).await,
        Some(DeviceState::OnOff { power: Power::On })
    );
}

#[tokio::test]
async fn stats_are_passed_through() {
    let (server, controller) = connected().await;
    Mock::given(method("POST"))
        .and(command("STATS"))
        .respond_with(ok(json!({ "uptime": 1234 })))
        .mount(&server)
        .await;

    let stats = controller.get_stats().await.unwrap();
    assert_eq!(stats["uptime"], 1234);
}
