//! Transmit-path behaviour exercised through the public API: validation,
//! the zero-altitude gate, index arithmetic and delete semantics.

use flightplan::{
    kind, ConfirmAll, DenyAll, EventController, PlanConfig, PlanState, RecordingTransport,
    SendContext, ServerWaypoint, TransportCall, Waypoint,
};

fn confirmed(lat: f64, lon: f64, number: i32) -> Waypoint {
    Waypoint {
        number,
        lat,
        lon,
        alt: 100.0,
        original_lat: lat,
        original_lon: lon,
        original_alt: 100.0,
        index: number as usize,
        edit_index: number as usize,
        ..Waypoint::default()
    }
}

fn temp(lat: f64, lon: f64) -> Waypoint {
    Waypoint {
        is_temp: true,
        lat,
        lon,
        alt: 120.0,
        original_lat: lat,
        original_lon: lon,
        ..Waypoint::default()
    }
}

#[test]
fn refused_zero_altitude_blocks_the_send() {
    let mut state = PlanState::new();
    let mut landing = temp(1.0, 2.0);
    landing.kind = kind::LAND;
    landing.alt = 0.0;
    state.waypoints = vec![landing];
    state.selected_row = Some(0);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &DenyAll,
        events: &events,
        config: &config,
    };
    state.send_one(&ctx, false);

    assert!(transport.is_empty(), "refusal must not reach the transport");
    assert_eq!(state.waypoints.len(), 1, "state must be unchanged");
    let evt = rx.try_recv().expect("a warning must be emitted");
    assert_eq!(evt.message.as_deref(), Some("Waypoint was not sent"));
}

#[test]
fn granted_zero_altitude_sends() {
    let mut state = PlanState::new();
    let mut landing = temp(1.0, 2.0);
    landing.kind = kind::LAND;
    landing.alt = 0.0;
    state.waypoints = vec![landing];
    state.selected_row = Some(0);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.send_one(&ctx, false);

    assert_eq!(transport.len(), 1);
}

#[test]
fn clean_waypoint_is_a_silent_noop() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(1.0, 2.0, 0)];
    state.selected_row = Some(0);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.send_one(&ctx, false);

    assert!(transport.is_empty());
    assert!(rx.try_recv().is_err(), "no warning for a waypoint without edits");
}

#[test]
fn out_of_range_latitude_is_rejected_with_a_warning() {
    let mut state = PlanState::new();
    state.waypoints = vec![temp(95.0, 2.0)];
    state.selected_row = Some(0);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.send_one(&ctx, false);

    assert!(transport.is_empty());
    let evt = rx.try_recv().unwrap();
    assert_eq!(evt.message.as_deref(), Some("Waypoint latitude out of range"));
}

#[test]
fn temp_insert_index_follows_the_confirmed_predecessor() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1), temp(5.0, 5.0)];
    state.renumber();
    state.selected_row = Some(2);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.send_one(&ctx, false);

    match &transport.calls()[..] {
        [TransportCall::Send(wp)] => assert_eq!(wp.index, 2, "predecessor number 1 plus one"),
        other => panic!("expected a single insert, got {other:?}"),
    }
}

#[test]
fn confirmed_update_index_nets_out_preceding_temps() {
    let mut state = PlanState::new();
    let mut edited = confirmed(2.0, 2.0, 1);
    edited.alt = 130.0; // unsent edit
    state.waypoints = vec![confirmed(0.0, 0.0, 0), temp(5.0, 5.0), edited];
    state.renumber();
    state.selected_row = Some(2);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.send_one(&ctx, false);

    match &transport.calls()[..] {
        [TransportCall::Update(wp)] => {
            assert_eq!(wp.index, 1, "row 2 minus one preceding temp");
            assert_eq!(wp.alt, 130.0);
        }
        other => panic!("expected a single update, got {other:?}"),
    }
}

#[test]
fn send_all_strips_temps_and_renumbers() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0), temp(5.0, 5.0), confirmed(1.0, 1.0, 1)];
    state.renumber();

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.send_all(&ctx);

    match &transport.calls()[..] {
        [TransportCall::Batch(wps)] => assert_eq!(wps.len(), 3, "the batch carries the temps"),
        other => panic!("expected a single batch, got {other:?}"),
    }
    assert_eq!(state.waypoints.len(), 2, "temps come back confirmed on the next poll");
    assert_eq!(state.waypoints[1].index, 1);
    let evt = rx.try_recv().unwrap();
    assert_eq!(evt.sent.map(|s| s.count), Some(3));
}

#[test]
fn delete_confirmed_row_issues_server_delete_by_number() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1), confirmed(2.0, 2.0, 2)];
    state.selected_row = Some(1);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.delete(&ctx);

    assert_eq!(transport.calls(), vec![TransportCall::Delete(1)]);
    assert_eq!(state.waypoints.len(), 2);
    assert_eq!(state.waypoints[1].index, 1, "survivors are renumbered by position");
    assert_eq!(state.selected_row, None);
}

#[test]
fn delete_temp_row_is_local_only() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0), temp(5.0, 5.0)];
    state.renumber();
    state.selected_row = Some(1);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.delete(&ctx);

    assert!(transport.is_empty(), "the server never saw a temp waypoint");
    assert_eq!(state.waypoints.len(), 1);
}

#[test]
fn delete_rectangle_selection_processes_descending() {
    let mut state = PlanState::new();
    state.waypoints = vec![
        confirmed(0.0, 0.0, 0),
        confirmed(1.0, 1.0, 1),
        confirmed(2.0, 2.0, 2),
        confirmed(3.0, 3.0, 3),
    ];
    state.selected_wps = vec![1, 3];

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.delete(&ctx);

    assert_eq!(
        transport.calls(),
        vec![TransportCall::Delete(3), TransportCall::Delete(1)],
        "descending order keeps earlier indices valid"
    );
    assert_eq!(state.waypoints.len(), 2);
    assert!(state.selected_wps.is_empty());
}

#[test]
fn delete_with_nothing_selected_warns() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0)];

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.delete(&ctx);

    assert!(transport.is_empty());
    let evt = rx.try_recv().unwrap();
    assert_eq!(evt.message.as_deref(), Some("No waypoint selected"));
}

#[test]
fn set_current_requires_a_confirmed_selection() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0), temp(5.0, 5.0)];
    state.renumber();

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };

    state.set_current(&ctx);
    let evt = rx.try_recv().unwrap();
    assert_eq!(evt.message.as_deref(), Some("No waypoint selected"));

    state.selected_row = Some(1);
    state.set_current(&ctx);
    let evt = rx.try_recv().unwrap();
    assert_eq!(evt.message.as_deref(), Some("Can't set a temp waypoint to current"));

    assert!(transport.is_empty(), "neither path may reach the transport");
}

#[test]
fn set_current_sends_the_selected_number() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0), confirmed(1.0, 1.0, 1)];
    state.selected_row = Some(1);

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.set_current(&ctx);

    assert_eq!(transport.calls(), vec![TransportCall::SetCurrent(1)]);
}

#[test]
fn replace_plan_needs_confirmation() {
    let mut state = PlanState::new();
    state.waypoints = vec![confirmed(0.0, 0.0, 0)];
    let plan = vec![ServerWaypoint {
        lat: 3.0,
        lon: 4.0,
        alt: 90.0,
        command: kind::WAYPOINT,
        index: 0,
        sda: false,
        min_dist: 0.0,
    }];

    let transport = RecordingTransport::new();
    let events = EventController::new();
    let config = PlanConfig::default();
    let ctx = SendContext {
        transport: &transport,
        confirmer: &DenyAll,
        events: &events,
        config: &config,
    };
    state.replace_plan(&ctx, &plan);

    assert!(transport.is_empty());
    assert_eq!(state.waypoints.len(), 1, "refusal leaves the plan intact");

    let ctx = SendContext {
        transport: &transport,
        confirmer: &ConfirmAll,
        events: &events,
        config: &config,
    };
    state.replace_plan(&ctx, &plan);
    assert_eq!(transport.calls(), vec![TransportCall::Replace(plan)]);
    assert!(state.waypoints.is_empty(), "repopulated by the next poll");
}
