use crate::app::Message;
use hankkicore::model::{BoundingBox, BoundsError, LatLng, RestaurantId, RestaurantSummary};
use hankkicore::present::score_badge;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke, Text},
    Color, Pixels, Point, Rectangle, Renderer, Size, Theme, Vector,
};

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 11.0;
pub const MAX_ZOOM: f64 = 19.0;
const MARKER_RADIUS: f32 = 6.0;
const HIT_RADIUS: f32 = 11.0;
const DRAG_THRESHOLD: f32 = 3.0;

/// Center and zoom of the map. The projection is equirectangular around the
/// center, which is accurate enough at neighbourhood scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: LatLng,
    pub zoom: f64,
}

impl Camera {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// Degrees per pixel as `(lat, lng)`.
    fn degrees_per_pixel(&self) -> (f64, f64) {
        let lng = 360.0 / (TILE_SIZE * 2_f64.powf(self.zoom));
        let lat = lng * self.center.lat.to_radians().cos();
        (lat, lng)
    }

    pub fn project(&self, point: LatLng, size: Size) -> Point {
        let (dlat, dlng) = self.degrees_per_pixel();
        let x = f64::from(size.width) / 2.0 + (point.lng - self.center.lng) / dlng;
        let y = f64::from(size.height) / 2.0 - (point.lat - self.center.lat) / dlat;
        Point::new(x as f32, y as f32)
    }

    pub fn unproject(&self, point: Point, size: Size) -> LatLng {
        let (dlat, dlng) = self.degrees_per_pixel();
        LatLng::new(
            self.center.lat - (f64::from(point.y) - f64::from(size.height) / 2.0) * dlat,
            self.center.lng + (f64::from(point.x) - f64::from(size.width) / 2.0) * dlng,
        )
    }

    pub fn bounds(&self, size: Size) -> Result<BoundingBox, BoundsError> {
        let north_east = self.unproject(Point::new(size.width, 0.0), size);
        let south_west = self.unproject(Point::new(0.0, size.height), size);
        BoundingBox::from_corners(north_east, south_west)
    }

    /// Camera after the content was dragged by `delta` pixels.
    pub fn panned(&self, delta: Vector) -> Camera {
        let (dlat, dlng) = self.degrees_per_pixel();
        Camera {
            center: LatLng::new(
                self.center.lat + f64::from(delta.y) * dlat,
                self.center.lng - f64::from(delta.x) * dlng,
            ),
            zoom: self.zoom,
        }
    }

    /// Camera zoomed by `steps` levels keeping the coordinate under `anchor` fixed.
    pub fn zoomed(&self, steps: f64, anchor: Point, size: Size) -> Camera {
        let zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom == self.zoom {
            return *self;
        }
        let fixed = self.unproject(anchor, size);
        let scaled = Camera {
            center: self.center,
            zoom,
        };
        let (dlat, dlng) = scaled.degrees_per_pixel();
        Camera {
            center: LatLng::new(
                fixed.lat + (f64::from(anchor.y) - f64::from(size.height) / 2.0) * dlat,
                fixed.lng - (f64::from(anchor.x) - f64::from(size.width) / 2.0) * dlng,
            ),
            zoom,
        }
    }
}

/// What the canvas reports back to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The canvas has a new size. `then` carries the input that arrived
    /// with the first frame at that size.
    Resized {
        size: Size,
        then: Option<Box<MapEvent>>,
    },
    Panned(Vector),
    Zoomed { steps: f64, anchor: Point },
    HoverChanged {
        from: Option<RestaurantId>,
        to: Option<RestaurantId>,
    },
    Clicked(Option<RestaurantId>),
}

#[derive(Debug, Default)]
pub struct Interaction {
    last_size: Option<Size>,
    press: Option<Point>,
    dragging: bool,
    hover: Option<RestaurantId>,
}

pub struct MapCanvas<'a> {
    pub camera: Camera,
    pub restaurants: &'a [RestaurantSummary],
    pub hovered: Option<RestaurantId>,
    pub selected: Option<RestaurantId>,
    pub user_location: Option<LatLng>,
}

impl MapCanvas<'_> {
    fn hit_test(&self, point: Point, size: Size) -> Option<RestaurantId> {
        self.restaurants
            .iter()
            .filter_map(|r| {
                let at = self.camera.project(r.position()?, size);
                let distance = at.distance(point);
                (distance <= HIT_RADIUS).then_some((r.id, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// Turns a canvas event into a map event plus whether to capture it.
    /// A size change is reported together with the input that revealed it.
    fn translate(
        &self,
        state: &mut Interaction,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (Option<MapEvent>, bool) {
        let size = bounds.size();
        let resized = state.last_size != Some(size);
        state.last_size = Some(size);
        let (event, capture) = match event {
            canvas::Event::Mouse(mouse_event) => self.on_mouse(state, mouse_event, bounds, cursor),
            _ => (None, false),
        };
        if resized {
            let then = event.map(Box::new);
            return (Some(MapEvent::Resized { size, then }), capture);
        }
        (event, capture)
    }

    fn on_mouse(
        &self,
        state: &mut Interaction,
        event: &mouse::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (Option<MapEvent>, bool) {
        let size = bounds.size();
        match event {
            mouse::Event::ButtonPressed(mouse::Button::Left) => match cursor.position_in(bounds) {
                Some(at) => {
                    state.press = Some(at);
                    state.dragging = false;
                    (None, true)
                }
                None => (None, false),
            },
            mouse::Event::CursorMoved { .. } => {
                let position = cursor.position_in(bounds);
                if let (Some(from), Some(to)) = (state.press, position) {
                    let delta = to - from;
                    if state.dragging || delta.x.hypot(delta.y) > DRAG_THRESHOLD {
                        state.dragging = true;
                        state.press = Some(to);
                        return (Some(MapEvent::Panned(delta)), true);
                    }
                }
                let hit = position.and_then(|p| self.hit_test(p, size));
                if hit == state.hover {
                    return (None, false);
                }
                let from = std::mem::replace(&mut state.hover, hit);
                (Some(MapEvent::HoverChanged { from, to: hit }), false)
            }
            mouse::Event::ButtonReleased(mouse::Button::Left) => {
                if state.press.take().is_none() || std::mem::take(&mut state.dragging) {
                    return (None, false);
                }
                let hit = cursor
                    .position_in(bounds)
                    .and_then(|p| self.hit_test(p, size));
                (Some(MapEvent::Clicked(hit)), false)
            }
            mouse::Event::WheelScrolled { delta } => {
                let Some(anchor) = cursor.position_in(bounds) else {
                    return (None, false);
                };
                let steps = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => f64::from(*y),
                    mouse::ScrollDelta::Pixels { y, .. } => f64::from(*y) / 100.0,
                };
                (Some(MapEvent::Zoomed { steps, anchor }), true)
            }
            mouse::Event::CursorLeft => {
                state.press = None;
                state.dragging = false;
                match state.hover.take() {
                    Some(from) => (Some(MapEvent::HoverChanged { from: Some(from), to: None }), false),
                    None => (None, false),
                }
            }
            _ => (None, false),
        }
    }
}

fn category_color(category: &str) -> Color {
    match category {
        "한식" => Color::from_rgb(0.89, 0.36, 0.25),
        "중식" => Color::from_rgb(0.85, 0.65, 0.13),
        "일식" => Color::from_rgb(0.33, 0.62, 0.85),
        "양식" => Color::from_rgb(0.56, 0.42, 0.80),
        "분식" => Color::from_rgb(0.95, 0.45, 0.60),
        "아시안" => Color::from_rgb(0.30, 0.72, 0.56),
        "패스트푸드" => Color::from_rgb(0.96, 0.55, 0.20),
        "카페" => Color::from_rgb(0.60, 0.45, 0.32),
        "주점" => Color::from_rgb(0.45, 0.50, 0.95),
        _ => Color::from_rgb(0.7, 0.7, 0.7),
    }
}

impl canvas::Program<Message> for MapCanvas<'_> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let (event, capture) = self.translate(state, event, bounds, cursor);
        match event {
            Some(event) if capture => {
                Some(canvas::Action::publish(Message::Map(event)).and_capture())
            }
            Some(event) => Some(canvas::Action::publish(Message::Map(event))),
            None if capture => Some(canvas::Action::capture()),
            None => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = bounds.size();
        let mut frame = Frame::new(renderer, size);
        frame.fill_rectangle(Point::ORIGIN, size, Color::from_rgb(0.93, 0.94, 0.91));

        let grid = Path::new(|builder| {
            let step = 64.0;
            let mut x = 0.0;
            while x < size.width {
                builder.move_to(Point::new(x, 0.0));
                builder.line_to(Point::new(x, size.height));
                x += step;
            }
            let mut y = 0.0;
            while y < size.height {
                builder.move_to(Point::new(0.0, y));
                builder.line_to(Point::new(size.width, y));
                y += step;
            }
        });
        frame.stroke(
            &grid,
            Stroke::default()
                .with_width(1.0)
                .with_color(Color::from_rgb(0.86, 0.87, 0.84)),
        );

        let mut hovered_label = None;
        for restaurant in self.restaurants {
            let Some(position) = restaurant.position() else {
                continue;
            };
            let at = self.camera.project(position, size);
            let hovered = self.hovered == Some(restaurant.id);
            let selected = self.selected == Some(restaurant.id);
            let radius = if hovered || selected {
                MARKER_RADIUS * 1.6
            } else {
                MARKER_RADIUS
            };
            let marker = Path::circle(at, radius);
            frame.fill(&marker, category_color(&restaurant.category));
            if selected {
                frame.stroke(
                    &Path::circle(at, radius + 3.0),
                    Stroke::default()
                        .with_width(2.5)
                        .with_color(Color::from_rgb(0.1, 0.1, 0.1)),
                );
            }
            if hovered {
                hovered_label = Some((at, restaurant));
            }
        }

        if let Some(location) = self.user_location {
            let at = self.camera.project(location, size);
            frame.fill(&Path::circle(at, 9.0), Color::from_rgba(0.2, 0.45, 0.95, 0.25));
            frame.fill(&Path::circle(at, 5.0), Color::from_rgb(0.2, 0.45, 0.95));
        }

        if let Some((at, restaurant)) = hovered_label {
            frame.fill_text(Text {
                content: format!(
                    "{} {}",
                    restaurant.name,
                    score_badge(restaurant.avg_score)
                ),
                position: at + Vector::new(12.0, -18.0),
                color: Color::from_rgb(0.1, 0.1, 0.1),
                size: Pixels(15.0),
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.dragging {
            mouse::Interaction::Grabbing
        } else if state.hover.is_some() {
            mouse::Interaction::Pointer
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    fn camera() -> Camera {
        Camera::new(LatLng::new(37.2830, 127.0448), 16.0)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn center_projects_to_middle() {
        let at = camera().project(camera().center, SIZE);
        assert_eq!(at, Point::new(400.0, 300.0));
    }

    #[test]
    fn bounds_surround_center() {
        let bounds = camera().bounds(SIZE).unwrap();
        assert!(bounds.contains(camera().center));
        assert!(bounds.ne_lng() - bounds.sw_lng() > bounds.ne_lat() - bounds.sw_lat());
        let center = bounds.center();
        assert!(close(center.lat, 37.2830) && close(center.lng, 127.0448));
    }

    #[test]
    fn dragging_right_moves_center_west() {
        let moved = camera().panned(Vector::new(100.0, 0.0));
        assert!(moved.center.lng < camera().center.lng);
        assert!(close(moved.center.lat, camera().center.lat));
    }

    #[test]
    fn zoom_keeps_anchor_fixed_and_clamps() {
        let anchor = Point::new(600.0, 150.0);
        let before = camera().unproject(anchor, SIZE);
        let zoomed = camera().zoomed(1.0, anchor, SIZE);
        assert_eq!(zoomed.zoom, 17.0);
        let after = zoomed.unproject(anchor, SIZE);
        assert!((after.lng - before.lng).abs() < 1e-9);
        assert!((after.lat - before.lat).abs() < 1e-5);

        let maxed = camera().zoomed(10.0, anchor, SIZE);
        assert_eq!(maxed.zoom, MAX_ZOOM);
        assert_eq!(maxed.zoomed(1.0, anchor, SIZE), maxed);
    }

    fn marker(id: RestaurantId) -> RestaurantSummary {
        RestaurantSummary {
            id,
            name: format!("식당 {id}"),
            address: "수원시".into(),
            phone: None,
            category: "한식".into(),
            lat: "37.2830".into(),
            lng: "127.0448".into(),
            local_currency: false,
            goodness: false,
            kind_price: false,
            review_count: 0,
            visit_count: 0,
            avg_score: 0.0,
            restaurant_score: None,
        }
    }

    #[test]
    fn input_arriving_with_new_size_is_kept() {
        let restaurants = vec![marker(5)];
        let map = MapCanvas {
            camera: camera(),
            restaurants: &restaurants,
            hovered: None,
            selected: None,
            user_location: None,
        };
        let mut state = Interaction::default();
        let bounds = Rectangle::new(Point::ORIGIN, SIZE);
        let cursor = mouse::Cursor::Available(Point::new(400.0, 300.0));

        let press = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));
        let (event, capture) = map.translate(&mut state, &press, bounds, cursor);
        assert_eq!(event, Some(MapEvent::Resized { size: SIZE, then: None }));
        assert!(capture);

        let release = canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left));
        let (event, _) = map.translate(&mut state, &release, bounds, cursor);
        assert_eq!(event, Some(MapEvent::Clicked(Some(5))));

        let wider = Size::new(1000.0, 600.0);
        let at = Point::new(500.0, 300.0);
        let moved = canvas::Event::Mouse(mouse::Event::CursorMoved { position: at });
        let (event, _) = map.translate(
            &mut state,
            &moved,
            Rectangle::new(Point::ORIGIN, wider),
            mouse::Cursor::Available(at),
        );
        assert_eq!(
            event,
            Some(MapEvent::Resized {
                size: wider,
                then: Some(Box::new(MapEvent::HoverChanged {
                    from: None,
                    to: Some(5)
                })),
            })
        );
    }
}
