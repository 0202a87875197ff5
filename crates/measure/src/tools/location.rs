use std::fmt;

use glam::DVec3;
use shared::{CartographicProps, ViewType};

use super::{ToolSession, ToolState};
use crate::i18n::t;
use crate::measurement::{Measurement, MeasurementId, MeasurementKind};
use crate::render::RenderTarget;
use crate::state::messages::Severity;
use crate::state::MeasurementContext;
use crate::view_target::ViewTarget;
use crate::viewport::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// No service configured, or not ready yet
    Unavailable,
    Failed(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unavailable => write!(f, "service unavailable"),
            ServiceError::Failed(reason) => write!(f, "service failed: {reason}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// World to geographic conversion supplied by the host
pub trait GeoLocationService {
    fn cartographic_from_world(&self, point: DVec3) -> Result<CartographicProps, ServiceError>;
}

/// Single-shot tool: each accepted point commits a location immediately
pub struct MeasureLocationToolModel {
    session: ToolSession,
    state: ToolState,
    view_type: Option<ViewType>,
    geo: Option<Box<dyn GeoLocationService>>,
}

impl fmt::Debug for MeasureLocationToolModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureLocationToolModel")
            .field("session", &self.session)
            .field("state", &self.state)
            .field("view_type", &self.view_type)
            .field("geo", &self.geo.is_some())
            .finish()
    }
}

impl MeasureLocationToolModel {
    pub fn new(ctx: &mut MeasurementContext) -> Self {
        Self {
            session: ToolSession::new(ctx),
            state: ToolState::SetMeasurementViewport,
            view_type: None,
            geo: None,
        }
    }

    pub fn with_geo_service(mut self, service: Box<dyn GeoLocationService>) -> Self {
        self.geo = Some(service);
        self
    }

    pub fn state(&self) -> ToolState {
        self.state
    }

    pub fn session(&self) -> &ToolSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ToolSession {
        &mut self.session
    }

    pub fn set_measurement_viewport(&mut self, view_type: ViewType) -> bool {
        if self.state != ToolState::SetMeasurementViewport {
            return false;
        }
        self.view_type = Some(view_type);
        self.state = ToolState::SetLocation;
        true
    }

    /// Commit a location. A failing geolocation lookup leaves the geographic
    /// coordinate empty and posts a warning.
    pub fn add_location(
        &mut self,
        view_type: ViewType,
        point: DVec3,
        ctx: &mut MeasurementContext,
    ) -> bool {
        if self.state != ToolState::SetLocation || self.view_type != Some(view_type) {
            return false;
        }
        let geo_location = match &self.geo {
            Some(service) => match service.cartographic_from_world(point) {
                Ok(geo) => Some(geo),
                Err(e) => {
                    tracing::warn!(error = %e, "Geolocation lookup failed");
                    ctx.messages.post(Severity::Warning, t("msg.geolocation_failed"));
                    None
                }
            },
            None => None,
        };

        let mut m = Measurement::location(point);
        m.set_view_target(ViewTarget::only(view_type));
        m.modify(|k| {
            if let MeasurementKind::Location(l) = k {
                l.geo_location = geo_location;
            }
        });
        self.session.begin_dynamic(m, ctx);
        self.session.commit_dynamic(ctx);
        self.state = ToolState::SetMeasurementViewport;
        self.view_type = None;
        true
    }

    pub fn last_committed(&mut self) -> Option<MeasurementId> {
        self.session.committed().last().copied()
    }

    pub fn undo(&mut self, ctx: &mut MeasurementContext) -> bool {
        self.session.undo(ctx)
    }

    pub fn redo(&mut self, ctx: &mut MeasurementContext) -> bool {
        self.session.redo(ctx)
    }

    pub fn reset(&mut self, clear_measurements: bool, ctx: &mut MeasurementContext) {
        self.session.reset(clear_measurements, ctx);
        self.state = ToolState::SetMeasurementViewport;
        self.view_type = None;
    }

    pub fn decorate(
        &mut self,
        ctx: &mut MeasurementContext,
        viewport: &Viewport,
        target: &mut dyn RenderTarget,
    ) {
        self.session.decorate(ctx, viewport, target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeo(Result<CartographicProps, ServiceError>);

    impl GeoLocationService for FixedGeo {
        fn cartographic_from_world(
            &self,
            _point: DVec3,
        ) -> Result<CartographicProps, ServiceError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_single_shot_commit_with_geo() {
        let mut ctx = MeasurementContext::default();
        let geo = CartographicProps {
            latitude: 10.0,
            longitude: 20.0,
            height: 5.0,
        };
        let mut tool =
            MeasureLocationToolModel::new(&mut ctx).with_geo_service(Box::new(FixedGeo(Ok(geo))));
        assert!(!tool.add_location(ViewType::Spatial, DVec3::ZERO, &mut ctx));
        assert!(tool.set_measurement_viewport(ViewType::Spatial));
        assert!(tool.add_location(ViewType::Spatial, DVec3::ONE, &mut ctx));
        assert_eq!(tool.state(), ToolState::SetMeasurementViewport);

        let id = tool.last_committed().unwrap();
        let loc = ctx.manager.get(id).unwrap().kind().as_location().unwrap();
        assert_eq!(loc.geo_location, Some(geo));
        assert!(ctx.messages.is_empty());
    }

    #[test]
    fn test_geo_failure_degrades_with_warning() {
        let mut ctx = MeasurementContext::default();
        let mut tool = MeasureLocationToolModel::new(&mut ctx)
            .with_geo_service(Box::new(FixedGeo(Err(ServiceError::Unavailable))));
        tool.set_measurement_viewport(ViewType::Spatial);
        assert!(tool.add_location(ViewType::Spatial, DVec3::ONE, &mut ctx));

        let id = tool.last_committed().unwrap();
        assert!(ctx.manager.get(id).unwrap().kind().as_location().unwrap().geo_location.is_none());
        let msg = ctx.messages.last().unwrap();
        assert_eq!(msg.severity, Severity::Warning);
        assert_eq!(msg.text, t("msg.geolocation_failed"));
    }

    #[test]
    fn test_wrong_view_kind_rejected() {
        let mut ctx = MeasurementContext::default();
        let mut tool = MeasureLocationToolModel::new(&mut ctx);
        tool.set_measurement_viewport(ViewType::Drawing);
        assert!(!tool.add_location(ViewType::Spatial, DVec3::ONE, &mut ctx));
        assert!(ctx.manager.is_empty());
    }
}
