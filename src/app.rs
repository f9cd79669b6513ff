use crate::ui;
use glam::DVec2;
use ratatui::layout::Rect;
use std::sync::Arc;
use world_map::config::DRAG_THRESHOLD_PX;
use world_map::geo::GeoPoint;
use world_map::map::{BrailleRenderer, DisplaySize, Frame, ViewportState};
use world_map::service::{ClickRequest, MapService, SelectionResponse, ZoomRequest};
use world_map::MapError;

/// Left-button drag in progress, in terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Drag {
    pub start: (u16, u16),
    pub current: (u16, u16),
}

/// Application state
pub struct App {
    service: MapService<BrailleRenderer>,
    /// The terminal is a single session
    state: ViewportState,
    /// Inner map pane in terminal cells
    map_area: Rect,
    pub should_quit: bool,
    drag: Option<Drag>,
    /// Current mouse position for the coordinate readout
    mouse_pos: Option<(u16, u16)>,
    response: Option<SelectionResponse>,
    error: Option<String>,
}

impl App {
    pub fn new(service: MapService<BrailleRenderer>, width: u16, height: u16) -> Self {
        let mut app = Self {
            service,
            state: ViewportState::new(),
            map_area: Rect::default(),
            should_quit: false,
            drag: None,
            mouse_pos: None,
            response: None,
            error: None,
        };
        app.set_map_area(width, height);
        app.reset();
        app
    }

    /// Update the map pane when the terminal resizes. Only the displayed size
    /// changes; the extent stays where it is.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.set_map_area(width, height);
        self.drag = None;
        if let Err(err) = self.service.renderer().refresh() {
            self.error = Some(MapError::from(err).to_string());
        }
    }

    fn set_map_area(&mut self, width: u16, height: u16) {
        self.map_area = ui::map_inner(Rect::new(0, 0, width, height));
        self.service
            .renderer()
            .set_target(self.map_area.width as usize, self.map_area.height as usize);
    }

    /// Request quit
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.drag = None;
        let result = self.service.reset_view(&mut self.state);
        self.apply(result);
    }

    /// Left button pressed. Presses outside the map pane are ignored.
    pub fn press(&mut self, col: u16, row: u16) {
        self.drag = self.in_map(col, row).then_some(Drag {
            start: (col, row),
            current: (col, row),
        });
    }

    pub fn drag_to(&mut self, col: u16, row: u16) {
        if let Some(drag) = self.drag.as_mut() {
            drag.current = (col, row);
        }
    }

    /// Left button released: a click when the pointer barely moved, a zoom
    /// to the dragged rectangle otherwise
    pub fn release(&mut self, col: u16, row: u16) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        let (w, h) = self.displayed_size();
        let start = self.client_pixel(drag.start.0, drag.start.1);
        let end = self.client_pixel(col, row);

        let moved = (end - start).abs().max_element();
        let result = if moved < DRAG_THRESHOLD_PX as f64 {
            self.service.handle_click(
                &self.state,
                &ClickRequest {
                    x: start.x,
                    y: start.y,
                    displayed_width: w,
                    displayed_height: h,
                },
            )
        } else {
            self.service.handle_zoom_rectangle(
                &mut self.state,
                &ZoomRequest {
                    x1: start.x,
                    y1: start.y,
                    x2: end.x,
                    y2: end.y,
                    displayed_width: w,
                    displayed_height: h,
                },
            )
        };
        self.apply(result);
    }

    fn apply(&mut self, result: Result<SelectionResponse, MapError>) {
        match result {
            Ok(response) => {
                self.response = Some(response);
                self.error = None;
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    /// Update mouse cursor position
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    fn in_map(&self, col: u16, row: u16) -> bool {
        let a = self.map_area;
        col >= a.x && col < a.x + a.width && row >= a.y && row < a.y + a.height
    }

    /// Terminal cell to braille pixel in the map pane, at the cell center.
    /// Cells outside the pane give pixels outside the displayed image.
    pub fn client_pixel(&self, col: u16, row: u16) -> DVec2 {
        DVec2::new(
            (col as f64 - self.map_area.x as f64) * 2.0 + 1.0,
            (row as f64 - self.map_area.y as f64) * 4.0 + 2.0,
        )
    }

    /// Braille pixel size of the map pane
    pub fn displayed_size(&self) -> (f64, f64) {
        (self.map_area.width as f64 * 2.0, self.map_area.height as f64 * 4.0)
    }

    /// Geographic position under the mouse, if it is over the map
    pub fn cursor_geo(&self) -> Option<GeoPoint> {
        let (col, row) = self.mouse_pos?;
        if !self.in_map(col, row) {
            return None;
        }
        let (w, h) = self.displayed_size();
        let display = DisplaySize::new(w, h).ok()?;
        self.service
            .transform()
            .client_to_geo(self.client_pixel(col, row), display, &self.state.extent())
            .ok()
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn response(&self) -> Option<&SelectionResponse> {
        self.response.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn drag(&self) -> Option<Drag> {
        self.drag
    }

    pub fn map_area(&self) -> Rect {
        self.map_area
    }

    pub fn country_count(&self) -> usize {
        self.service.index().len()
    }

    /// Most recent rendered frame
    pub fn frame(&self) -> Option<Arc<Frame>> {
        self.service.renderer().latest()
    }
}
