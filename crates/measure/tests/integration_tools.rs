//! Integration tests for the tool state machines, the manager's pick and
//! button dispatch, and the change notifications both publish.

use glam::DVec3;
use kurbo::Point;
use measure_tools_lib::events::{
    ButtonEvent, ButtonEventResult, MeasurementEvent, MouseButton, RemovalOrigin,
};
use measure_tools_lib::fixtures;
use measure_tools_lib::manager::MeasurementAction;
use measure_tools_lib::measurement::{AddPointResult, Measurement};
use measure_tools_lib::pick::{HitDetail, PickContext};
use measure_tools_lib::render::RecordingTarget;
use measure_tools_lib::tools::{
    MeasureAreaToolModel, MeasureDistanceToolModel, MeasureRadiusToolModel, ToolEvent, ToolState,
};
use shared::ViewType;

#[test]
fn test_distance_tool_preview_then_commit() {
    let mut ctx = fixtures::test_context();
    let mut tool = MeasureDistanceToolModel::new(&mut ctx);
    let events = tool.session_mut().subscribe();

    assert_eq!(tool.state(), ToolState::SetMeasurementViewport);
    assert!(!tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx));
    assert!(tool.set_measurement_viewport(ViewType::Spatial));
    assert!(tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx));
    assert_eq!(tool.state(), ToolState::SetEndPoint);

    // Previews move the end point without committing
    assert!(tool.set_end_point(ViewType::Spatial, DVec3::X, true, &mut ctx));
    assert!(tool.set_end_point(ViewType::Spatial, DVec3::Y * 2.0, true, &mut ctx));
    assert!(ctx.manager.is_empty());
    let preview = tool.session().dynamic().unwrap();
    assert!(preview.is_dynamic());
    let length = preview.kind().as_distance().unwrap().length();
    assert!((length - 2.0).abs() < 1e-12);

    assert!(tool.set_end_point(ViewType::Spatial, DVec3::new(3.0, 4.0, 0.0), false, &mut ctx));
    assert_eq!(tool.state(), ToolState::SetMeasurementViewport);
    assert!(tool.session().dynamic().is_none());

    let id = tool.last_committed().unwrap();
    let committed = ctx.manager.get(id).unwrap();
    assert!(!committed.is_dynamic());

    let events = events.drain();
    assert_eq!(events.first(), Some(&ToolEvent::NewMeasurement(id)));
    assert_eq!(events.last(), Some(&ToolEvent::Committed(id)));
    assert_eq!(
        events.iter().filter(|e| matches!(e, ToolEvent::DynamicChanged(_))).count(),
        3
    );
}

#[test]
fn test_distance_tool_commits_three_four_five() {
    let mut ctx = fixtures::test_context();
    let mut tool = MeasureDistanceToolModel::new(&mut ctx);
    assert!(tool.set_measurement_viewport(ViewType::Spatial));
    assert!(tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx));
    let end = DVec3::new(3.0, 4.0, 0.0);
    assert!(tool.set_end_point(ViewType::Spatial, end, false, &mut ctx));

    assert_eq!(ctx.manager.len(), 1);
    let id = tool.last_committed().unwrap();
    let distance = ctx.manager.get(id).unwrap().kind().as_distance().unwrap();
    assert!((distance.length() - 5.0).abs() < 1e-12);
    assert!((distance.run() - 5.0).abs() < 1e-12);
    assert!(distance.rise().abs() < 1e-12);
}

#[test]
fn test_tool_undo_redo_one_commit_at_a_time() {
    let mut ctx = fixtures::test_context();
    let mut tool = MeasureDistanceToolModel::new(&mut ctx);
    let mut ids = Vec::new();
    for end in [DVec3::X, DVec3::Y] {
        tool.set_measurement_viewport(ViewType::Spatial);
        tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx);
        tool.set_end_point(ViewType::Spatial, end, false, &mut ctx);
        ids.push(tool.last_committed().unwrap());
    }
    assert_eq!(ctx.manager.len(), 2);
    assert_eq!(tool.session_mut().committed(), ids.as_slice());

    assert!(tool.undo(&mut ctx));
    assert_eq!(ctx.manager.len(), 1);
    assert!(!ctx.manager.contains(ids[1]));
    assert!(tool.undo(&mut ctx));
    assert_eq!(ctx.manager.len(), 0);
    assert!(tool.session_mut().committed().is_empty());
    assert!(!tool.undo(&mut ctx));

    assert!(tool.redo(&mut ctx));
    assert_eq!(ctx.manager.len(), 1);
    assert!(ctx.manager.contains(ids[0]));
    assert_eq!(tool.last_committed(), Some(ids[0]));
}

#[test]
fn test_radius_tool_steps_in_order() {
    let mut ctx = fixtures::test_context();
    let mut tool = MeasureRadiusToolModel::new(&mut ctx);
    tool.set_measurement_viewport(ViewType::Spatial);
    tool.set_start_point(ViewType::Spatial, DVec3::X, &mut ctx);
    assert_eq!(tool.state(), ToolState::SetMidPoint);
    assert!(!tool.set_end_point(ViewType::Spatial, -DVec3::X, false, &mut ctx));
    assert!(tool.set_mid_point(ViewType::Spatial, DVec3::Y, false, &mut ctx));
    assert_eq!(tool.state(), ToolState::SetEndPoint);
    assert!(tool.set_end_point(ViewType::Spatial, -DVec3::X, false, &mut ctx));
    assert_eq!(ctx.manager.len(), 1);
}

#[test]
fn test_reset_abandons_construction() {
    let mut ctx = fixtures::test_context();
    let mut tool = MeasureAreaToolModel::new(&mut ctx);
    tool.set_measurement_viewport(ViewType::Spatial);
    for p in [DVec3::ZERO, DVec3::X] {
        assert_eq!(tool.add_point(ViewType::Spatial, p, &mut ctx), AddPointResult::Added);
    }
    tool.reset(false, &mut ctx);
    assert_eq!(tool.state(), ToolState::SetMeasurementViewport);
    assert!(tool.session().dynamic().is_none());
    assert!(ctx.manager.is_empty());
}

#[test]
fn test_dynamic_measurement_drawn_every_frame() {
    let mut ctx = fixtures::test_context();
    let vp = fixtures::spatial_viewport();
    let mut target = RecordingTarget::new();
    let mut tool = MeasureDistanceToolModel::new(&mut ctx);
    tool.set_measurement_viewport(ViewType::Spatial);
    tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx);
    tool.set_end_point(ViewType::Spatial, DVec3::X, true, &mut ctx);

    for _ in 0..3 {
        target.begin_frame();
        tool.decorate(&mut ctx, &vp, &mut target);
        assert_eq!(target.dynamic.len(), 1);
    }
    assert_eq!(target.created_count(), 0);
}

#[test]
fn test_manager_events_for_tool_commit_and_undo() {
    let mut ctx = fixtures::test_context();
    let listener = ctx.manager.subscribe();
    let mut tool = MeasureDistanceToolModel::new(&mut ctx);
    tool.set_measurement_viewport(ViewType::Spatial);
    tool.set_start_point(ViewType::Spatial, DVec3::ZERO, &mut ctx);
    tool.set_end_point(ViewType::Spatial, DVec3::X, false, &mut ctx);
    let id = tool.last_committed().unwrap();
    let session = tool.session().id();
    assert!(tool.undo(&mut ctx));

    assert_eq!(
        listener.drain(),
        vec![
            MeasurementEvent::Added { ids: vec![id] },
            MeasurementEvent::Removed {
                ids: vec![id],
                origin: RemovalOrigin::Tool(session),
            },
        ]
    );
}

fn decorated(ctx: &mut measure_tools_lib::state::MeasurementContext, m: Measurement) -> u64 {
    let vp = fixtures::spatial_viewport();
    let mut target = RecordingTarget::new();
    ctx.manager.add(m);
    ctx.decorate(&vp, &mut target);
    ctx.manager.iter().last().and_then(Measurement::pick_id).unwrap()
}

#[test]
fn test_button_dispatch_data_and_reset() {
    let mut ctx = fixtures::test_context();
    let pick_id = decorated(&mut ctx, fixtures::distance_345());
    let id = ctx.manager.ids()[0];

    let hit = HitDetail {
        source_id: pick_id,
        hit_point: DVec3::new(1.5, 2.0, 0.0),
        view_point: Some(Point::new(430.0, 260.0)),
        viewport_id: 1,
    };

    let data = ButtonEvent::data(DVec3::new(1.5, 2.0, 0.0), Point::new(430.0, 260.0), 1);
    let result = ctx
        .manager
        .dispatch_button_event(&PickContext::from_button_event(Some(&hit), &data));
    assert_eq!(result, ButtonEventResult::Handled { consumed: false });

    let reset = ButtonEvent {
        button: MouseButton::Reset,
        ..data
    };
    let result = ctx
        .manager
        .dispatch_button_event(&PickContext::from_button_event(Some(&hit), &reset));
    assert_eq!(result, ButtonEventResult::Handled { consumed: true });

    let actions = ctx.manager.take_actions();
    assert!(matches!(actions[0], MeasurementAction::OpenActionToolbar { id: a, .. } if a == id));
    assert!(matches!(actions[1], MeasurementAction::OpenContextMenu { id: a, .. } if a == id));
    assert!(ctx.manager.take_actions().is_empty());
}

#[test]
fn test_button_dispatch_misses_without_hit() {
    let mut ctx = fixtures::test_context();
    decorated(&mut ctx, fixtures::distance_345());
    let data = ButtonEvent::data(DVec3::ZERO, Point::new(5.0, 5.0), 1);
    let result = ctx
        .manager
        .dispatch_button_event(&PickContext::from_button_event(None, &data));
    assert_eq!(result, ButtonEventResult::NotHandled);
    assert!(ctx.manager.take_actions().is_empty());
}

#[test]
fn test_pick_tooltip_and_overrides() {
    let mut ctx = fixtures::test_context();
    let pick_id = decorated(&mut ctx, fixtures::distance_345());
    let pick = PickContext::from_pick_id(pick_id);

    let lines = ctx.manager.pick_tooltip(&pick, ctx.formatter()).unwrap();
    assert_eq!(lines.len(), 5);

    ctx.manager.overrides_mut().tooltip = Some(Box::new(|m: &Measurement, _: &PickContext| {
        vec![m.kind_name().to_uppercase()]
    }));
    let lines = ctx.manager.pick_tooltip(&pick, ctx.formatter()).unwrap();
    assert_eq!(lines, vec!["DISTANCE".to_string()]);

    ctx.manager.overrides_mut().hit = Some(Box::new(|_: &Measurement, _: &PickContext| false));
    assert!(!ctx.manager.test_hit(&pick));
    assert!(ctx.manager.pick_tooltip(&pick, ctx.formatter()).is_none());
}
