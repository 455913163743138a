use wasm_bindgen::prelude::*;
use crate::source::SmokeSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[wasm_bindgen]
/// How the latest frame is arranged on the canvas
pub enum Layout {
    /// One panel covering the canvas
    FULL,
    /// Two side by side panels, the right one mirrored
    MIRROR,
    /// A 2x2 grid of panels
    TILED,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[wasm_bindgen]
/// Color mode for the draw pass
pub enum Mode {
    /// The density channel as grey smoke
    DENSITY,
    /// All color channels as stored
    RAW,
}

/// A viewport on the canvas showing the whole field, origin at the bottom left
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Panel {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub flip_x: bool,
}

impl Panel {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x as f32
            && x < (self.x + self.width) as f32
            && y >= self.y as f32
            && y < (self.y + self.height) as f32
    }
}

/// Split a `width` x `height` canvas into the panels of `layout`
pub fn panels(layout: Layout, width: u32, height: u32) -> Vec<Panel> {
    let (width, height) = (width as i32, height as i32);
    let (half_width, half_height) = (width / 2, height / 2);

    match layout {
        Layout::FULL => vec![
            Panel { x: 0, y: 0, width, height, flip_x: false },
        ],
        Layout::MIRROR => vec![
            Panel { x: 0, y: 0, width: half_width, height, flip_x: false },
            Panel { x: half_width, y: 0, width: width - half_width, height, flip_x: true },
        ],
        Layout::TILED => vec![
            Panel { x: 0, y: 0, width: half_width, height: half_height, flip_x: false },
            Panel { x: half_width, y: 0, width: width - half_width, height: half_height, flip_x: false },
            Panel { x: 0, y: half_height, width: half_width, height: height - half_height, flip_x: false },
            Panel { x: half_width, y: half_height, width: width - half_width, height: height - half_height, flip_x: false },
        ],
    }
}

/// Map a source given in canvas pixels onto the field shown by the panel under it
///
/// Sources outside every panel are returned unchanged.
pub fn to_field(
    layout: Layout,
    canvas: (u32, u32),
    field: (u32, u32),
    source: &SmokeSource,
) -> SmokeSource {
    let Some(panel) = panels(layout, canvas.0, canvas.1)
        .into_iter()
        .find(|panel| panel.width > 0 && panel.height > 0 && panel.contains(source.x, source.y))
    else {
        return *source;
    };

    let mut u = (source.x - panel.x as f32) / panel.width as f32;
    let v = (source.y - panel.y as f32) / panel.height as f32;
    if panel.flip_x {
        u = 1.0 - u;
    }

    SmokeSource {
        x: u * field.0 as f32,
        y: v * field.1 as f32,
        strength: source.strength,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(panels: &[Panel]) -> i32 {
        panels.iter().map(|p| p.width * p.height).sum()
    }

    #[test]
    fn full_covers_the_canvas() {
        assert_eq!(
            panels(Layout::FULL, 640, 480),
            vec![Panel { x: 0, y: 0, width: 640, height: 480, flip_x: false }],
        );
    }

    #[test]
    fn mirror_flips_the_right_half() {
        let panels = panels(Layout::MIRROR, 641, 480);
        assert_eq!(panels.len(), 2);
        assert!(!panels[0].flip_x);
        assert!(panels[1].flip_x);
        assert_eq!(panels[1].x, 320);
        assert_eq!(area(&panels), 641 * 480);
    }

    #[test]
    fn tiles_cover_odd_canvases_exactly() {
        let panels = panels(Layout::TILED, 101, 51);
        assert_eq!(panels.len(), 4);
        assert_eq!(area(&panels), 101 * 51);
        assert!(panels.iter().all(|p| !p.flip_x));
    }

    #[test]
    fn full_layout_maps_identically() {
        let source = SmokeSource { x: 12.0, y: 34.0, strength: 0.1 };
        assert_eq!(to_field(Layout::FULL, (100, 100), (100, 100), &source), source);
    }

    #[test]
    fn mirrored_panel_maps_back_onto_the_field() {
        let source = SmokeSource { x: 190.0, y: 50.0, strength: 0.1 };
        let mapped = to_field(Layout::MIRROR, (200, 100), (200, 100), &source);
        // 90% across the right panel, mirrored to 10% of the field
        assert!((mapped.x - 20.0).abs() < 1e-4);
        assert!((mapped.y - 50.0).abs() < 1e-4);
        assert_eq!(mapped.strength, 0.1);
    }

    #[test]
    fn tiles_map_into_the_whole_field() {
        let source = SmokeSource { x: 75.0, y: 75.0, strength: 0.0 };
        let mapped = to_field(Layout::TILED, (100, 100), (100, 100), &source);
        assert_eq!((mapped.x, mapped.y), (50.0, 50.0));
    }

    #[test]
    fn outside_points_are_untouched() {
        let source = SmokeSource { x: -5.0, y: 500.0, strength: 0.1 };
        assert_eq!(to_field(Layout::TILED, (100, 100), (100, 100), &source), source);
    }
}
