//! Matrix renderer: translates a flat cell sequence into filled rectangles.
//!
//! [`LedMatrix`] owns a raster surface and its layout options. It keeps no
//! frame memory: every [`LedMatrix::draw`] is a full pass over the supplied
//! cells, and erasing is an explicit, separate [`LedMatrix::clear`] the
//! caller must invoke.

use crate::surface::RasterSurface;
use crate::{Cell, MatrixOptions, Rgba};
use std::error::Error;
use std::fmt;

/// Paint for unlit cells: a fixed translucent black, whatever the cell's
/// color field holds.
pub const OFF_COLOR: Rgba = Rgba::new(0, 0, 0, 26);

/// Shadow blur radius used for the glow effect.
const GLOW_BLUR: u32 = 5;

// ── Error ──────────────────────────────────────────────────────────

/// The cell sequence handed to [`LedMatrix::draw`] does not cover the grid.
///
/// Raised before anything is drawn; the renderer stays valid and the caller
/// may retry with corrected data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InsufficientDataError {
    /// Cells the current grid requires (`width * height`)
    pub expected: usize,
    /// Cells actually supplied
    pub actual: usize,
}

impl fmt::Display for InsufficientDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cell data must cover the full grid: expected {} cells, got {}",
            self.expected, self.actual
        )
    }
}

impl Error for InsufficientDataError {}

// ── Renderer ───────────────────────────────────────────────────────

/// An LED matrix rendered onto a raster surface.
pub struct LedMatrix<S> {
    surface: S,
    opts: MatrixOptions,
}

impl<S: RasterSurface> LedMatrix<S> {
    /// Take ownership of a surface and size it for `opts`.
    ///
    /// The backing resolution becomes `surface_width() x surface_height()`;
    /// the displayed size is half that in each dimension, a fixed 2:1
    /// downscale for crisp output on high-density hosts.
    pub fn new(surface: S, opts: MatrixOptions) -> Self {
        let mut matrix = Self { surface, opts };
        matrix.setup();
        matrix
    }

    fn setup(&mut self) {
        let width = self.opts.surface_width();
        let height = self.opts.surface_height();
        self.surface.resize(width, height);
        self.surface.set_display_size(width / 2, height / 2);
    }

    /// Current layout options.
    pub fn opts(&self) -> &MatrixOptions {
        &self.opts
    }

    /// The surface being drawn on.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Rasterize one frame.
    ///
    /// `cells` must hold exactly `width * height` entries in row-major order
    /// (index `i` is column `i % width` of row `i / width`). Lit cells are
    /// filled in their own color, unlit cells in [`OFF_COLOR`]. With glow
    /// enabled, each lit cell casts a shadow in its fill color, scoped to
    /// that cell's fill.
    pub fn draw(&mut self, cells: &[Cell]) -> Result<(), InsufficientDataError> {
        let expected = self.opts.cell_count();
        if cells.len() != expected {
            return Err(InsufficientDataError {
                expected,
                actual: cells.len(),
            });
        }

        let MatrixOptions {
            width,
            pixel_width,
            pixel_height,
            margin,
            glow,
            ..
        } = self.opts;
        let step_x = pixel_width + margin;
        let step_y = pixel_height + margin;

        for (i, cell) in cells.iter().enumerate() {
            let y = i as u32 / width;
            let x = i as u32 - y * width;
            let color = if cell.on { cell.color } else { OFF_COLOR };

            let shadowed = glow && cell.on;
            if shadowed {
                self.surface.set_shadow(GLOW_BLUR, color);
            }
            self.surface
                .fill_rect(x * step_x, y * step_y, pixel_width, pixel_height, color);
            if shadowed {
                self.surface.clear_shadow();
            }
        }

        Ok(())
    }

    /// Erase the whole surface. Idempotent.
    pub fn clear(&mut self) {
        self.surface.clear();
    }

    /// Replace the grid dimensions and re-size the surface.
    ///
    /// Other options are retained. The surface is not cleared or redrawn
    /// here; call [`LedMatrix::clear`]/[`LedMatrix::draw`] afterwards for a
    /// fresh frame.
    pub fn set_dimensions(&mut self, width: u32, height: u32) {
        self.opts.width = width;
        self.opts.height = height;
        self.setup();
    }

    /// Toggle the glow effect for subsequent draws.
    pub fn set_glow(&mut self, glow: bool) {
        self.opts.glow = glow;
    }
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    /// Surface double that records every call, for asserting on exactly
    /// what the renderer asked for and in what order.
    #[derive(Default)]
    struct RecordingSurface {
        ops: Vec<Op>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Op {
        Resize(u32, u32),
        DisplaySize(u32, u32),
        FillRect(u32, u32, u32, u32, Rgba),
        Clear,
        SetShadow(u32, Rgba),
        ClearShadow,
    }

    impl RasterSurface for RecordingSurface {
        fn resize(&mut self, width: u32, height: u32) {
            self.ops.push(Op::Resize(width, height));
        }

        fn set_display_size(&mut self, width: u32, height: u32) {
            self.ops.push(Op::DisplaySize(width, height));
        }

        fn display_size(&self) -> (u32, u32) {
            self.ops
                .iter()
                .rev()
                .find_map(|op| match op {
                    Op::DisplaySize(w, h) => Some((*w, *h)),
                    _ => None,
                })
                .unwrap_or((0, 0))
        }

        fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: Rgba) {
            self.ops.push(Op::FillRect(x, y, width, height, color));
        }

        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }

        fn set_shadow(&mut self, blur: u32, color: Rgba) {
            self.ops.push(Op::SetShadow(blur, color));
        }

        fn clear_shadow(&mut self) {
            self.ops.push(Op::ClearShadow);
        }
    }

    fn recording_matrix(opts: MatrixOptions) -> LedMatrix<RecordingSurface> {
        let mut matrix = LedMatrix::new(RecordingSurface::default(), opts);
        matrix.surface_ops_clear();
        matrix
    }

    impl LedMatrix<RecordingSurface> {
        fn surface_ops_clear(&mut self) {
            self.surface.ops.clear();
        }

        fn fills(&self) -> Vec<Op> {
            self.surface
                .ops
                .iter()
                .copied()
                .filter(|op| matches!(op, Op::FillRect(..)))
                .collect()
        }
    }

    fn frame(opts: &MatrixOptions, lit: &[(usize, Rgba)]) -> Vec<Cell> {
        let mut cells = vec![Cell::off(); opts.cell_count()];
        for &(i, color) in lit {
            cells[i] = Cell::lit(color);
        }
        cells
    }

    // ── Sizing ─────────────────────────────────────────────────────

    #[test]
    fn new_sizes_surface_with_half_display() {
        let matrix = LedMatrix::new(RecordingSurface::default(), MatrixOptions::default());
        assert_eq!(
            matrix.surface().ops,
            vec![Op::Resize(448, 224), Op::DisplaySize(224, 112)]
        );
    }

    #[rstest]
    #[case(8, 8, 2, 2, 1, 24, 24)]
    #[case(4, 2, 10, 10, 0, 40, 20)]
    fn sizing_follows_options(
        #[case] width: u32,
        #[case] height: u32,
        #[case] pixel_width: u32,
        #[case] pixel_height: u32,
        #[case] margin: u32,
        #[case] expected_w: u32,
        #[case] expected_h: u32,
    ) {
        let opts = MatrixOptions::default()
            .grid(width, height)
            .pixel_size(pixel_width, pixel_height)
            .margin(margin);
        let matrix = LedMatrix::new(RecordingSurface::default(), opts);
        assert_eq!(
            matrix.surface().ops,
            vec![
                Op::Resize(expected_w, expected_h),
                Op::DisplaySize(expected_w / 2, expected_h / 2)
            ]
        );
    }

    // ── Draw ───────────────────────────────────────────────────────

    #[test]
    fn draw_visits_every_cell_in_row_major_order() {
        let opts = MatrixOptions::default().grid(3, 2).pixel_size(2, 2).margin(1);
        let mut matrix = recording_matrix(opts);
        matrix.draw(&frame(&opts, &[])).unwrap();

        let fills = matrix.fills();
        assert_eq!(fills.len(), 6);
        let positions: Vec<(u32, u32)> = fills
            .iter()
            .map(|op| match op {
                Op::FillRect(x, y, ..) => (*x, *y),
                _ => unreachable!(),
            })
            .collect();
        // step is pixel size + margin = 3
        assert_eq!(
            positions,
            vec![(0, 0), (3, 0), (6, 0), (0, 3), (3, 3), (6, 3)]
        );
    }

    #[test]
    fn lit_cell_uses_its_color_unlit_uses_dim() {
        let opts = MatrixOptions::default().grid(2, 1);
        let red = Rgba::opaque(255, 0, 0);
        let mut matrix = recording_matrix(opts);
        matrix.draw(&frame(&opts, &[(0, red)])).unwrap();

        assert_eq!(
            matrix.fills(),
            vec![
                Op::FillRect(0, 0, 10, 10, red),
                Op::FillRect(14, 0, 10, 10, OFF_COLOR),
            ]
        );
    }

    #[test]
    fn default_grid_index_33_lands_at_14_14() {
        // row 1, column 1 under width 32; step 10 + 4
        let opts = MatrixOptions::default();
        let green = Rgba::opaque(0, 255, 0);
        let mut matrix = recording_matrix(opts);
        matrix.draw(&frame(&opts, &[(33, green)])).unwrap();

        assert_eq!(matrix.fills()[33], Op::FillRect(14, 14, 10, 10, green));
    }

    #[test]
    fn draw_rejects_short_data_without_drawing() {
        let opts = MatrixOptions::default();
        let mut matrix = recording_matrix(opts);
        let err = matrix.draw(&vec![Cell::off(); 100]).unwrap_err();

        assert_eq!(
            err,
            InsufficientDataError {
                expected: 512,
                actual: 100
            }
        );
        assert_eq!(matrix.surface().ops, vec![]);
    }

    #[test]
    fn draw_rejects_long_data_too() {
        let opts = MatrixOptions::default().grid(2, 2);
        let mut matrix = recording_matrix(opts);
        assert!(matrix.draw(&vec![Cell::off(); 5]).is_err());
        assert_eq!(matrix.surface().ops, vec![]);
    }

    #[test]
    fn draw_error_does_not_corrupt_the_renderer() {
        let opts = MatrixOptions::default().grid(2, 2);
        let mut matrix = recording_matrix(opts);
        matrix.draw(&[]).unwrap_err();
        // retry with corrected data succeeds
        matrix.draw(&frame(&opts, &[])).unwrap();
        assert_eq!(matrix.fills().len(), 4);
    }

    #[test]
    fn error_message_names_both_lengths() {
        let err = InsufficientDataError {
            expected: 512,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "cell data must cover the full grid: expected 512 cells, got 3"
        );
    }

    // ── Glow ───────────────────────────────────────────────────────

    #[test]
    fn glow_scopes_shadow_to_lit_cells() {
        let opts = MatrixOptions::default().grid(3, 1).glow(true);
        let blue = Rgba::opaque(0, 0, 255);
        let mut matrix = recording_matrix(opts);
        matrix.draw(&frame(&opts, &[(1, blue)])).unwrap();

        assert_eq!(
            matrix.surface().ops,
            vec![
                Op::FillRect(0, 0, 10, 10, OFF_COLOR),
                Op::SetShadow(5, blue),
                Op::FillRect(14, 0, 10, 10, blue),
                Op::ClearShadow,
                Op::FillRect(28, 0, 10, 10, OFF_COLOR),
            ]
        );
    }

    #[test]
    fn no_glow_means_no_shadow_ops() {
        let opts = MatrixOptions::default().grid(2, 1);
        let mut matrix = recording_matrix(opts);
        matrix
            .draw(&frame(&opts, &[(0, Rgba::WHITE), (1, Rgba::WHITE)]))
            .unwrap();
        assert!(
            !matrix
                .surface()
                .ops
                .iter()
                .any(|op| matches!(op, Op::SetShadow(..) | Op::ClearShadow))
        );
    }

    #[test]
    fn set_glow_applies_to_subsequent_draws() {
        let opts = MatrixOptions::default().grid(1, 1);
        let mut matrix = recording_matrix(opts);
        matrix.set_glow(true);
        matrix.draw(&frame(&opts, &[(0, Rgba::WHITE)])).unwrap();
        assert_eq!(matrix.surface().ops[0], Op::SetShadow(5, Rgba::WHITE));
    }

    // ── Clear ──────────────────────────────────────────────────────

    #[test]
    fn clear_erases_the_surface() {
        let mut matrix = recording_matrix(MatrixOptions::default());
        matrix.clear();
        matrix.clear();
        assert_eq!(matrix.surface().ops, vec![Op::Clear, Op::Clear]);
    }

    // ── SetDimensions ──────────────────────────────────────────────

    #[test]
    fn set_dimensions_resizes_and_keeps_other_options() {
        let opts = MatrixOptions::default().pixel_size(4, 4).margin(2).glow(true);
        let mut matrix = recording_matrix(opts);
        matrix.set_dimensions(8, 4);

        assert_eq!(matrix.opts().width, 8);
        assert_eq!(matrix.opts().height, 4);
        assert_eq!(matrix.opts().pixel_width, 4);
        assert_eq!(matrix.opts().margin, 2);
        assert!(matrix.opts().glow);
        // resized to 8*(4+2) x 4*(4+2), no clear or redraw
        assert_eq!(
            matrix.surface().ops,
            vec![Op::Resize(48, 24), Op::DisplaySize(24, 12)]
        );
    }

    // ── End to end on the pixmap backend ───────────────────────────

    #[test]
    fn default_config_scenario_on_the_pixmap() {
        use crate::surface::PixmapSurface;

        let opts = MatrixOptions::default();
        let mut matrix = LedMatrix::new(PixmapSurface::new(0, 0), opts);
        let red = Rgba::opaque(255, 0, 0);
        let mut cells = vec![Cell::off(); 512];
        cells[0] = Cell::lit(red);
        matrix.draw(&cells).unwrap();

        let surface = matrix.surface();
        assert_eq!((surface.width(), surface.height()), (448, 224));
        assert_eq!(surface.display_size(), (224, 112));
        // cell 0: a 10x10 red rectangle at the origin
        assert_eq!(surface.pixel(0, 0), red);
        assert_eq!(surface.pixel(9, 9), red);
        // the margin between cells stays untouched
        assert_eq!(surface.pixel(10, 0), Rgba::TRANSPARENT);
        // cell index 33 is row 1 column 1, unlit, at (14, 14)
        assert_eq!(surface.pixel(14, 14), OFF_COLOR);
    }

    #[test]
    fn clear_then_all_off_frame_is_uniformly_dim() {
        use crate::surface::PixmapSurface;

        let opts = MatrixOptions::default().grid(2, 2);
        let mut matrix = LedMatrix::new(PixmapSurface::new(0, 0), opts);
        let all_on = vec![Cell::lit(Rgba::WHITE); 4];
        matrix.draw(&all_on).unwrap();

        matrix.clear();
        matrix.clear(); // repeated clears are equivalent to one
        matrix.draw(&vec![Cell::off(); 4]).unwrap();

        let surface = matrix.surface();
        // every cell region carries the dim paint, not the old frame
        assert_eq!(surface.pixel(0, 0), OFF_COLOR);
        assert_eq!(surface.pixel(14, 0), OFF_COLOR);
        assert_eq!(surface.pixel(0, 14), OFF_COLOR);
        assert_eq!(surface.pixel(14, 14), OFF_COLOR);
        assert_eq!(surface.pixel(10, 10), Rgba::TRANSPARENT);
    }

    #[test]
    fn stale_frame_fails_after_set_dimensions() {
        let opts = MatrixOptions::default().grid(4, 4);
        let stale = frame(&opts, &[]);
        let mut matrix = recording_matrix(opts);
        matrix.set_dimensions(5, 5);
        matrix.surface_ops_clear();

        let err = matrix.draw(&stale).unwrap_err();
        assert_eq!(err.expected, 25);
        assert_eq!(err.actual, 16);

        // a frame sized for the new grid positions cells per the new width
        let fresh: Vec<Cell> = vec![Cell::off(); 25];
        matrix.draw(&fresh).unwrap();
        assert_eq!(matrix.fills().len(), 25);
        // index 5 is now row 1 column 0
        assert_eq!(matrix.fills()[5], Op::FillRect(0, 14, 10, 10, OFF_COLOR));
    }
}
