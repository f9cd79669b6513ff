use crate::data::RelationTable;
use crate::error::MapError;
use crate::geo::Extent;
use crate::map::{
    fit_zoom, hit_test, CoordinateTransform, CountryIndex, DisplaySize, Highlight, RenderHandle,
    RenderPipeline, ViewportState, ZoomLimits,
};
use glam::DVec2;
use std::sync::Arc;
use tracing::{info, warn};

/// Country name reported when a click hits no country, and for zoom/reset
pub const NO_COUNTRY: &str = "None";

/// Click at a client pixel on an image displayed at the given size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickRequest {
    pub x: f64,
    pub y: f64,
    pub displayed_width: f64,
    pub displayed_height: f64,
}

/// Drag selection between two client pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRequest {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub displayed_width: f64,
    pub displayed_height: f64,
}

/// What the caller shows after an operation
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResponse {
    pub country: String,
    pub allies: Vec<String>,
    pub enemies: Vec<String>,
    pub handle: RenderHandle,
}

impl SelectionResponse {
    fn plain(handle: RenderHandle) -> Self {
        Self {
            country: NO_COUNTRY.to_string(),
            allies: Vec::new(),
            enemies: Vec::new(),
            handle,
        }
    }
}

/// Click, zoom and reset over a shared country index and relation table.
///
/// The service holds no per-session data: callers pass the session's
/// [`ViewportState`] into every operation.
pub struct MapService<R> {
    index: Arc<CountryIndex>,
    relations: Arc<RelationTable>,
    transform: CoordinateTransform,
    limits: ZoomLimits,
    renderer: R,
}

impl<R: RenderPipeline> MapService<R> {
    pub fn new(index: Arc<CountryIndex>, relations: Arc<RelationTable>, renderer: R) -> Self {
        Self {
            index,
            relations,
            transform: CoordinateTransform::default(),
            limits: ZoomLimits::default(),
            renderer,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn index(&self) -> &CountryIndex {
        &self.index
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Identify the country under a click and render it with its relations.
    /// The extent is left as it is.
    pub fn handle_click(
        &self,
        state: &ViewportState,
        req: &ClickRequest,
    ) -> Result<SelectionResponse, MapError> {
        let display = DisplaySize::new(req.displayed_width, req.displayed_height)?;
        let extent = state.extent();
        let point = self
            .transform
            .client_to_geo(DVec2::new(req.x, req.y), display, &extent)?;

        let Some(country) = hit_test(&self.index, point) else {
            info!(x = req.x, y = req.y, lon = point.x, lat = point.y, "click hit no country");
            let handle = self.render(&extent, None)?;
            return Ok(SelectionResponse::plain(handle));
        };

        let relation = self.relations.lookup(&country.code);
        info!(
            x = req.x,
            y = req.y,
            lon = point.x,
            lat = point.y,
            code = %country.code,
            known = self.relations.contains(&country.code),
            "click selected country"
        );

        let highlight = Highlight {
            selected: country.code.clone(),
            allies: relation.allies.clone(),
            enemies: relation.enemies.clone(),
        };
        let handle = self.render(&extent, Some(&highlight))?;
        Ok(SelectionResponse {
            country: country.name.clone(),
            allies: self.relations.resolve_names(&relation.allies),
            enemies: self.relations.resolve_names(&relation.enemies),
            handle,
        })
    }

    /// Zoom to the box spanned by two client pixels.
    ///
    /// Both corners are validated before the state changes. The new extent is
    /// committed before rendering and stays committed if the render fails.
    pub fn handle_zoom_rectangle(
        &self,
        state: &mut ViewportState,
        req: &ZoomRequest,
    ) -> Result<SelectionResponse, MapError> {
        let display = DisplaySize::new(req.displayed_width, req.displayed_height)?;
        let selection = self.transform.client_rect_to_extent(
            DVec2::new(req.x1, req.y1),
            DVec2::new(req.x2, req.y2),
            display,
            &state.extent(),
        )?;

        let fit = fit_zoom(selection, self.limits);
        if !fit.extent.is_finite() || !fit.extent.is_within_world() {
            return Err(MapError::InvalidInput(format!(
                "selection {selection} does not fit the world"
            )));
        }
        state.commit_zoom(fit.extent);
        info!(
            selection = %selection,
            extent = %fit.extent,
            resized = fit.resized,
            "zoomed"
        );

        let handle = self.render(&fit.extent, None)?;
        Ok(SelectionResponse::plain(handle))
    }

    /// Back to the whole world. Only a render failure can make this fail,
    /// and the reset is kept regardless.
    pub fn reset_view(&self, state: &mut ViewportState) -> Result<SelectionResponse, MapError> {
        state.reset();
        info!("view reset");
        let handle = self.render(&Extent::WORLD, None)?;
        Ok(SelectionResponse::plain(handle))
    }

    fn render(
        &self,
        extent: &Extent,
        highlight: Option<&Highlight>,
    ) -> Result<RenderHandle, MapError> {
        self.renderer.render(extent, highlight).map_err(|err| {
            warn!(%extent, error = %err, "render failed");
            MapError::from(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::geo::GeoPoint;
    use crate::map::{CountryEntry, Polygon, Shape, ViewMode};
    use std::sync::Mutex;

    /// Records every request; optionally fails them all
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(Extent, Option<Highlight>)>>,
        fail: bool,
    }

    impl RecordingRenderer {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<(Extent, Option<Highlight>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RenderPipeline for RecordingRenderer {
        fn render(
            &self,
            extent: &Extent,
            highlight: Option<&Highlight>,
        ) -> Result<RenderHandle, RenderError> {
            self.calls.lock().unwrap().push((*extent, highlight.cloned()));
            if self.fail {
                return Err(RenderError::Timeout);
            }
            Ok(RenderHandle::for_request(extent, highlight))
        }
    }

    const RELATIONS: &str = r#"{
        "unknown": {"name": "Unknown Country", "allies": [], "enemies": []},
        "countries": {
            "USA": {"name": "United States", "allies": ["CAN", "GBR"], "enemies": ["PRK"]},
            "CAN": {"name": "Canada", "allies": ["USA"], "enemies": []},
            "GBR": {"name": "United Kingdom", "allies": ["USA"], "enemies": []}
        }
    }"#;

    fn rect_country(code: &str, name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> CountryEntry {
        let ring = vec![
            GeoPoint::new(x0, y0),
            GeoPoint::new(x1, y0),
            GeoPoint::new(x1, y1),
            GeoPoint::new(x0, y1),
            GeoPoint::new(x0, y0),
        ];
        CountryEntry {
            code: code.to_string(),
            name: name.to_string(),
            shape: Shape::new(vec![Polygon::new(ring, vec![])]),
        }
    }

    fn service_with(renderer: RecordingRenderer) -> MapService<RecordingRenderer> {
        let index = CountryIndex::new(vec![
            rect_country("USA", "United States of America", -125.0, 25.0, -66.0, 49.0),
            rect_country("CAN", "Canada", -140.0, 49.0, -55.0, 75.0),
            rect_country("XXX", "Atlantis", -10.0, -10.0, 10.0, 10.0),
        ]);
        let relations = RelationTable::from_json(RELATIONS.as_bytes()).unwrap();
        MapService::new(Arc::new(index), Arc::new(relations), renderer)
    }

    fn service() -> MapService<RecordingRenderer> {
        service_with(RecordingRenderer::default())
    }

    fn click(x: f64, y: f64) -> ClickRequest {
        ClickRequest {
            x,
            y,
            displayed_width: 1000.0,
            displayed_height: 700.0,
        }
    }

    fn zoom(x1: f64, y1: f64, x2: f64, y2: f64) -> ZoomRequest {
        ZoomRequest {
            x1,
            y1,
            x2,
            y2,
            displayed_width: 1000.0,
            displayed_height: 700.0,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn click_resolves_relation_names() {
        let svc = service();
        let state = ViewportState::new();
        // lon -100.08, lat 40.11
        let resp = svc.handle_click(&state, &click(222.0, 194.0)).unwrap();
        assert_eq!(resp.country, "United States of America");
        assert_eq!(resp.allies, vec!["Canada", "United Kingdom"]);
        assert_eq!(resp.enemies, vec!["PRK"]);

        let calls = svc.renderer().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, Extent::WORLD);
        let highlight = calls[0].1.clone().unwrap();
        assert_eq!(highlight.selected, "USA");
        assert_eq!(highlight.allies, vec!["CAN", "GBR"]);
        assert_eq!(state.extent(), Extent::WORLD);
    }

    #[test]
    fn click_on_unlisted_country_uses_fallback() {
        let svc = service();
        let state = ViewportState::new();
        let resp = svc.handle_click(&state, &click(500.0, 350.0)).unwrap();
        assert_eq!(resp.country, "Atlantis");
        assert!(resp.allies.is_empty());
        assert!(resp.enemies.is_empty());
    }

    #[test]
    fn click_on_ocean_reports_none() {
        let svc = service();
        let state = ViewportState::new();
        // lon 90, lat -45
        let resp = svc.handle_click(&state, &click(750.0, 525.0)).unwrap();
        assert_eq!(resp.country, NO_COUNTRY);
        assert!(resp.allies.is_empty());
        assert!(svc.renderer().calls()[0].1.is_none());
    }

    #[test]
    fn click_honors_displayed_scale() {
        let svc = service();
        let state = ViewportState::new();
        let resp = svc
            .handle_click(
                &state,
                &ClickRequest {
                    x: 250.0,
                    y: 175.0,
                    displayed_width: 500.0,
                    displayed_height: 350.0,
                },
            )
            .unwrap();
        assert_eq!(resp.country, "Atlantis");
    }

    #[test]
    fn click_rejects_bad_display_size() {
        let svc = service();
        let state = ViewportState::new();
        let mut req = click(10.0, 10.0);
        req.displayed_width = 0.0;
        assert!(svc.handle_click(&state, &req).unwrap_err().is_invalid_input());
        req.displayed_width = f64::NAN;
        assert!(svc.handle_click(&state, &req).unwrap_err().is_invalid_input());
        assert!(svc.renderer().calls().is_empty());
    }

    #[test]
    fn zoom_to_rectangle_scenario() {
        let svc = service();
        let mut state = ViewportState::new();
        let resp = svc
            .handle_zoom_rectangle(&mut state, &zoom(100.0, 100.0, 900.0, 600.0))
            .unwrap();
        assert_eq!(resp.country, NO_COUNTRY);
        assert!(resp.allies.is_empty() && resp.enemies.is_empty());

        let e = state.extent();
        assert_close(e.lon_min, -144.0);
        assert_close(e.lon_max, 144.0);
        assert_close(e.lat_min, 90.0 - 600.0 / 700.0 * 180.0);
        assert_close(e.lat_max, 90.0 - 100.0 / 700.0 * 180.0);
        assert_eq!(state.mode(), ViewMode::Zoomed);

        let calls = svc.renderer().calls();
        assert_eq!(calls, vec![(e, None)]);
    }

    #[test]
    fn corner_order_does_not_matter() {
        let svc = service();
        let mut a = ViewportState::new();
        let mut b = ViewportState::new();
        svc.handle_zoom_rectangle(&mut a, &zoom(100.0, 100.0, 900.0, 600.0)).unwrap();
        svc.handle_zoom_rectangle(&mut b, &zoom(900.0, 600.0, 100.0, 100.0)).unwrap();
        assert_eq!(a.extent(), b.extent());
    }

    #[test]
    fn single_pixel_zoom_gets_minimum_size() {
        let svc = service();
        let mut state = ViewportState::new();
        svc.handle_zoom_rectangle(&mut state, &zoom(500.0, 350.0, 500.0, 350.0)).unwrap();
        assert_eq!(state.extent(), Extent::new(-5.0, 5.0, -5.0, 5.0));
    }

    #[test]
    fn minimum_box_at_corner_stays_in_world() {
        let svc = service();
        let mut state = ViewportState::new();
        svc.handle_zoom_rectangle(&mut state, &zoom(0.0, 0.0, 1.0, 1.0)).unwrap();
        let e = state.extent();
        assert!(e.is_within_world());
        assert_close(e.width(), 10.0);
        assert_close(e.height(), 10.0);
        assert_close(e.lon_min, -180.0);
        assert_close(e.lat_max, 90.0);
    }

    #[test]
    fn selection_past_the_image_is_clamped() {
        let svc = service();
        let mut state = ViewportState::new();
        svc.handle_zoom_rectangle(&mut state, &zoom(-300.0, -300.0, 1400.0, 1000.0)).unwrap();
        assert_eq!(state.extent(), Extent::WORLD);
        assert_eq!(state.mode(), ViewMode::Zoomed);
    }

    #[test]
    fn repeated_zooms_shrink_until_minimum() {
        let svc = service();
        let mut state = ViewportState::new();
        for _ in 0..12 {
            let before = state.extent();
            svc.handle_zoom_rectangle(&mut state, &zoom(200.0, 150.0, 800.0, 550.0)).unwrap();
            let after = state.extent();
            assert!(after.is_within_world());
            assert!(after.width() >= 10.0 - 1e-9 && after.height() >= 10.0 - 1e-9);
            let at_minimum =
                (after.width() - 10.0).abs() < 1e-9 && (after.height() - 10.0).abs() < 1e-9;
            assert!(before.contains_extent(&after) || at_minimum);
        }
    }

    #[test]
    fn click_after_zoom_uses_zoomed_extent() {
        let svc = service();
        let mut state = ViewportState::new();
        // Zoom onto lon [-20, 20], lat [-14, 14]
        let left = (160.0 / 360.0) * 1000.0;
        let right = (200.0 / 360.0) * 1000.0;
        let top = (104.0 / 180.0) * 700.0;
        let bottom = (76.0 / 180.0) * 700.0;
        svc.handle_zoom_rectangle(&mut state, &zoom(left, top, right, bottom)).unwrap();
        // Upper-left of the image is now (-20, 14): outside Atlantis
        let resp = svc.handle_click(&state, &click(1.0, 1.0)).unwrap();
        assert_eq!(resp.country, NO_COUNTRY);
        let resp = svc.handle_click(&state, &click(500.0, 350.0)).unwrap();
        assert_eq!(resp.country, "Atlantis");
    }

    #[test]
    fn invalid_zoom_leaves_state_untouched() {
        let svc = service();
        let mut state = ViewportState::new();
        svc.handle_zoom_rectangle(&mut state, &zoom(100.0, 100.0, 900.0, 600.0)).unwrap();
        let before = state;

        let mut req = zoom(0.0, 0.0, 100.0, 100.0);
        req.displayed_height = -1.0;
        assert!(svc.handle_zoom_rectangle(&mut state, &req).unwrap_err().is_invalid_input());
        let req = zoom(0.0, 0.0, f64::INFINITY, 100.0);
        assert!(svc.handle_zoom_rectangle(&mut state, &req).unwrap_err().is_invalid_input());
        assert_eq!(state, before);
        assert_eq!(svc.renderer().calls().len(), 1);
    }

    #[test]
    fn overflowing_zoom_is_rejected_before_commit() {
        let svc = service();
        let mut state = ViewportState::new();
        let req = ZoomRequest {
            x1: 1e308,
            y1: 1.0,
            x2: 1e308,
            y2: 2.0,
            displayed_width: 0.5,
            displayed_height: 700.0,
        };
        let err = svc.handle_zoom_rectangle(&mut state, &req).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(state, ViewportState::new());
        assert!(svc.renderer().calls().is_empty());

        // The session is still usable afterwards
        let resp = svc.handle_click(&state, &click(500.0, 350.0)).unwrap();
        assert_eq!(resp.country, "Atlantis");
    }

    #[test]
    fn render_failure_keeps_committed_zoom() {
        let svc = service_with(RecordingRenderer::failing());
        let mut state = ViewportState::new();
        let err = svc
            .handle_zoom_rectangle(&mut state, &zoom(100.0, 100.0, 900.0, 600.0))
            .unwrap_err();
        assert_eq!(err, MapError::RenderFailure(RenderError::Timeout));
        assert_eq!(state.mode(), ViewMode::Zoomed);
        assert_close(state.extent().lon_min, -144.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let svc = service();
        let mut state = ViewportState::new();
        svc.handle_zoom_rectangle(&mut state, &zoom(100.0, 100.0, 900.0, 600.0)).unwrap();
        let first = svc.reset_view(&mut state).unwrap();
        let after_first = state;
        let second = svc.reset_view(&mut state).unwrap();
        assert_eq!(state, after_first);
        assert_eq!(state.extent(), Extent::WORLD);
        assert_eq!(state.mode(), ViewMode::DefaultView);
        assert_eq!(first, second);
        assert_eq!(first.country, NO_COUNTRY);
    }

    #[test]
    fn reset_survives_render_failure() {
        let svc = service_with(RecordingRenderer::failing());
        let mut state = ViewportState::new();
        state.commit_zoom(Extent::new(0.0, 20.0, 0.0, 20.0));
        assert!(svc.reset_view(&mut state).is_err());
        assert_eq!(state, ViewportState::new());
    }

    #[test]
    fn empty_index_never_matches() {
        let relations = RelationTable::from_json(RELATIONS.as_bytes()).unwrap();
        let svc = MapService::new(
            Arc::new(CountryIndex::empty()),
            Arc::new(relations),
            RecordingRenderer::default(),
        );
        let resp = svc.handle_click(&ViewportState::new(), &click(222.0, 194.0)).unwrap();
        assert_eq!(resp.country, NO_COUNTRY);
    }
}
