//! Coordinate arithmetic for swipe and flick gestures.
//!
//! An offset or an area is either absolute pixels or ratios. A ratio area is
//! relative to the window, a ratio offset is relative to the area.

use std::time::Duration;

use log::debug;

use crate::error::{configuration, PageResult};
use crate::types::{Border, Point, Rect};

/// Four numbers describing an offset `(start_x, start_y, end_x, end_y)` or an
/// area `(x, y, width, height)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinate {
    Absolute([i64; 4]),
    /// Every value must lie in `0.0..=1.0`.
    Ratio([f64; 4]),
}

fn check_ratios(values: &[f64; 4], name: &str) -> PageResult<()> {
    if values.iter().all(|v| (0.0..=1.0).contains(v)) {
        Ok(())
    } else {
        Err(configuration(format!("all {} ratios must be between 0.0 and 1.0, got {:?}", name, values)))
    }
}

impl From<[i64; 4]> for Coordinate {
    fn from(values: [i64; 4]) -> Self {
        Coordinate::Absolute(values)
    }
}

impl From<[f64; 4]> for Coordinate {
    fn from(values: [f64; 4]) -> Self {
        Coordinate::Ratio(values)
    }
}

impl From<Rect> for Coordinate {
    fn from(rect: Rect) -> Self {
        Coordinate::Absolute([rect.x as i64, rect.y as i64, rect.width as i64, rect.height as i64])
    }
}

/// An absolute rectangle in which gestures happen and elements must end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Area {
    pub fn border(&self) -> Border {
        Border {
            left: self.x,
            right: self.x + self.width,
            top: self.y,
            bottom: self.y + self.height,
        }
    }

    /// Resolve `area`, asking for the window rect only when it is given as ratios.
    pub fn resolve<F>(area: &Coordinate, window_rect: F) -> PageResult<Area>
    where
        F: FnOnce() -> PageResult<Rect>,
    {
        let resolved = match *area {
            Coordinate::Absolute([x, y, width, height]) => Area {
                x,
                y,
                width,
                height,
            },
            Coordinate::Ratio(ratios) => {
                check_ratios(&ratios, "area")?;
                let [rx, ry, rw, rh] = ratios;
                let window = window_rect()?;
                Area {
                    x: (window.x + window.width * rx) as i64,
                    y: (window.y + window.height * ry) as i64,
                    width: (window.width * rw) as i64,
                    height: (window.height * rh) as i64,
                }
            }
        };
        debug!("gesture area: {:?}", resolved);
        Ok(resolved)
    }
}

/// Start and end point of one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stroke {
    pub start: Point,
    pub end: Point,
}

impl Stroke {
    pub fn resolve(offset: &Coordinate, area: &Area) -> PageResult<Stroke> {
        let [start_x, start_y, end_x, end_y] = match *offset {
            Coordinate::Absolute(values) => values,
            Coordinate::Ratio(ratios) => {
                check_ratios(&ratios, "offset")?;
                let [sx, sy, ex, ey] = ratios;
                let w = area.width as f64;
                let h = area.height as f64;
                [
                    area.x + (w * sx) as i64,
                    area.y + (h * sy) as i64,
                    area.x + (w * ex) as i64,
                    area.y + (h * ey) as i64,
                ]
            }
        };
        let stroke = Stroke {
            start: Point::new(start_x, start_y),
            end: Point::new(end_x, end_y),
        };
        debug!("gesture offset: {:?}", stroke);
        Ok(stroke)
    }
}

/// Settings for swiping or flicking an element into an area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeOptions {
    pub offset: Coordinate,
    pub area: Coordinate,
    /// How long each visibility check waits for the element to be present.
    pub timeout: Duration,
    pub max_swipe: u32,
    pub max_adjust: u32,
    /// Shorter adjustment strokes are stretched to this length so they are
    /// not taken for a tap.
    pub min_distance: i64,
    pub duration: Duration,
}

impl Default for SwipeOptions {
    fn default() -> Self {
        SwipeOptions {
            offset: Coordinate::Ratio([0.5, 0.75, 0.5, 0.25]),
            area: Coordinate::Ratio([0.0, 0.0, 1.0, 1.0]),
            timeout: Duration::from_secs(3),
            max_swipe: 10,
            max_adjust: 2,
            min_distance: 100,
            duration: Duration::from_millis(1000),
        }
    }
}

impl SwipeOptions {
    pub fn with_offset(mut self, offset: impl Into<Coordinate>) -> Self {
        self.offset = offset.into();
        self
    }

    pub fn with_area(mut self, area: impl Into<Coordinate>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_swipe(mut self, max_swipe: u32) -> Self {
        self.max_swipe = max_swipe;
        self
    }

    pub fn with_max_adjust(mut self, max_adjust: u32) -> Self {
        self.max_adjust = max_adjust;
        self
    }

    pub fn with_min_distance(mut self, min_distance: i64) -> Self {
        self.min_distance = min_distance;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// The (dx, dy) stroke that moves an element with edges `element` towards
/// the inside of `area`, or `None` when no edge sticks out. An edge flush
/// with the area does not stick out.
pub fn adjustment(area: &Area, element: &Border, min_distance: i64) -> Option<(i64, i64)> {
    let stretch = |delta: i64| {
        if delta.abs() < min_distance {
            min_distance * delta.signum()
        } else {
            delta
        }
    };
    let bounds = area.border();
    let left = bounds.left - element.left;
    let right = bounds.right - element.right;
    let top = bounds.top - element.top;
    let bottom = bounds.bottom - element.bottom;

    let (dx, dy) = match (left > 0, right < 0, top > 0, bottom < 0) {
        (true, false, true, false) => (left, top),
        (false, false, true, false) => (0, top),
        (false, true, true, false) => (right, top),
        (true, false, false, false) => (left, 0),
        (false, true, false, false) => (right, 0),
        (true, false, false, true) => (left, bottom),
        (false, false, false, true) => (0, bottom),
        (false, true, false, true) => (right, bottom),
        _ => return None,
    };
    Some((stretch(dx), stretch(dy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> PageResult<Rect> {
        Ok(Rect::new(0.0, 0.0, 1000.0, 2000.0))
    }

    #[test]
    fn ratio_area_and_offset() {
        let area = Area::resolve(&Coordinate::Ratio([0.1, 0.2, 0.5, 0.5]), window).unwrap();
        assert_eq!(
            area,
            Area {
                x: 100,
                y: 400,
                width: 500,
                height: 1000
            }
        );
        let stroke = Stroke::resolve(&Coordinate::Ratio([0.5, 0.75, 0.5, 0.25]), &area).unwrap();
        assert_eq!(stroke.start, Point::new(350, 1150));
        assert_eq!(stroke.end, Point::new(350, 650));
    }

    #[test]
    fn absolute_area_never_reads_the_window() {
        let area = Area::resolve(&Coordinate::Absolute([1, 2, 3, 4]), || {
            panic!("window rect requested")
        })
        .unwrap();
        assert_eq!(area.border().right, 4);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let err = Area::resolve(&Coordinate::Ratio([0.0, 0.0, 1.5, 1.0]), window).unwrap_err();
        assert!(matches!(err, crate::error::PageError::Configuration(_)));
    }

    #[test]
    fn adjustment_pulls_elements_inside() {
        let area = Area {
            x: 0,
            y: 0,
            width: 1000,
            height: 2000,
        };
        let inside = Border {
            left: 10,
            right: 110,
            top: 10,
            bottom: 50,
        };
        assert_eq!(adjustment(&area, &inside, 100), None);
        let flush = Border {
            left: 0,
            right: 1000,
            top: 0,
            bottom: 40,
        };
        assert_eq!(adjustment(&area, &flush, 100), None);

        // Sticks out 30px at the bottom: stretched to the minimum distance.
        let low = Border {
            left: 10,
            right: 110,
            top: 1990,
            bottom: 2030,
        };
        assert_eq!(adjustment(&area, &low, 100), Some((0, -100)));

        // Sticks out 250px above and to the left.
        let corner = Border {
            left: -250,
            right: 50,
            top: -250,
            bottom: 50,
        };
        assert_eq!(adjustment(&area, &corner, 100), Some((250, 250)));
    }
}
