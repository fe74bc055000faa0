//! Incremental-redraw compositor.
//!
//! Once per frame the compositor reconciles the buffer's content-channel
//! dirty state with cursor movement, viewport growth, and blink
//! invalidation into a one-frame [`DamageMap`], then repaints exactly the
//! flagged cells into the persistent off-screen [`Surface`]. Fill and line
//! primitives are drawn directly; glyph rasterization is delegated to the
//! host through the [`GlyphPainter`] capability, since font metrics and
//! pixel blending belong to the embedding toolkit.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::buffer::Buffer;
use crate::cell::{Cell, Modifiers};
use crate::color::{ColorRole, Palette, Rgb};
use crate::dirty::DamageMap;
use crate::geometry::{Position, Size};
use crate::surface::{PixelRect, PixelSize, Surface};

/// Fixed pixel dimensions of one cell, supplied by the host's font metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub width: u32,
    pub height: u32,
}

impl CellMetrics {
    pub const fn new(width: u32, height: u32) -> Self {
        CellMetrics { width, height }
    }

    /// How many whole cells fit in a pixel viewport.
    pub fn grid_size(&self, viewport: PixelSize) -> Size {
        if self.width == 0 || self.height == 0 {
            return Size::from_cells(0, 0);
        }
        Size::from_cells(
            (viewport.width / self.width) as usize,
            (viewport.height / self.height) as usize,
        )
    }

    /// Pixel bounds of the cell at `pos`, spanning `cells` columns.
    pub fn cell_bounds(&self, pos: Position, cells: usize) -> PixelRect {
        PixelRect::new(
            (pos.col as u32 * self.width) as i32,
            (pos.row as u32 * self.height) as i32,
            self.width * cells as u32,
            self.height,
        )
    }
}

/// How the cursor cell is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CursorStyle {
    /// Swap foreground and background of the cursor cell (block cursor).
    Reversed,
    /// Paint the cursor cell's background in the configured cursor color.
    FixedBackground,
    /// Thin strip along the bottom of the cell, in the cursor color.
    UnderBar,
    /// Thin strip along the left edge of the cell, in the cursor color.
    VerticalBar,
}

impl Default for CursorStyle {
    fn default() -> Self {
        CursorStyle::Reversed
    }
}

/// Host-supplied glyph rasterizer.
///
/// The compositor resolves colors and bounds; the painter owns fonts and
/// blends glyph coverage into the surface. `bold` selects a heavier face.
pub trait GlyphPainter {
    fn paint_glyph(
        &mut self,
        surface: &mut Surface,
        bounds: PixelRect,
        glyph: char,
        color: Rgb,
        bold: bool,
    );
}

/// Summary of one composed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of cells repainted this frame.
    pub cells_repainted: usize,
    /// Whether the whole visible area was recomposited.
    pub full_repaint: bool,
    /// Whether blinking content (cells or cursor) was composited; feeds
    /// [`BlinkClock::set_armed`](crate::BlinkClock::set_armed).
    pub blinking_content: bool,
}

/// Resolves dirty cells to draw calls and maintains the off-screen surface.
#[derive(Debug)]
pub struct Compositor {
    metrics: CellMetrics,
    palette: Palette,
    cursor_style: CursorStyle,
    cursor_visible: bool,
    cursor_blinking: bool,
    surface: Option<Surface>,
    prev_cursor: Position,
    prev_viewport: PixelSize,
    blinking_content: bool,
}

/// Thickness in pixels of bar cursors and decoration strips.
const STRIP_THICKNESS: u32 = 2;

impl Compositor {
    pub fn new(metrics: CellMetrics, palette: Palette) -> Self {
        Compositor {
            metrics,
            palette,
            cursor_style: CursorStyle::default(),
            cursor_visible: true,
            cursor_blinking: false,
            surface: None,
            prev_cursor: Position::new(0, 0),
            prev_viewport: PixelSize::default(),
            blinking_content: false,
        }
    }

    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    /// Update the per-cell pixel size (host font change).
    pub fn set_metrics(&mut self, metrics: CellMetrics) {
        self.metrics = metrics;
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }

    pub fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    pub fn set_cursor_blinking(&mut self, blinking: bool) {
        self.cursor_blinking = blinking;
    }

    /// The off-screen surface, if a frame has been composed yet. The host
    /// blits this to the screen after [`compose`](Self::compose).
    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    /// Whether the last composed frame contained blinking content.
    pub fn has_blinking_content(&self) -> bool {
        self.blinking_content
    }

    /// Compose one frame.
    ///
    /// Drains the buffer's dirty state, repaints every damaged cell within
    /// `visible_rows` into the off-screen surface, and returns a report.
    /// `blink_on` is the current phase of the [`BlinkClock`](crate::BlinkClock).
    pub fn compose<P: GlyphPainter>(
        &mut self,
        buffer: &mut Buffer,
        viewport: PixelSize,
        visible_rows: Range<usize>,
        blink_on: bool,
        painter: &mut P,
    ) -> FrameReport {
        let grid = self.metrics.grid_size(viewport);
        let visible = Size::from_cells(
            grid.columns().min(buffer.size().columns()),
            grid.rows().min(buffer.size().rows()),
        );
        if visible.is_empty() || visible_rows.is_empty() {
            // Empty viewport: the rebuild is a no-op and reports nothing.
            return FrameReport::default();
        }

        let mut full = self.ensure_surface(viewport);
        if viewport.width < self.prev_viewport.width
            || viewport.height < self.prev_viewport.height
        {
            full = true;
        }

        let (damage, full) = self.rebuild_damage(buffer, visible, viewport, full);
        let report = self.paint(buffer, &damage, visible_rows, blink_on, full, painter);

        self.prev_cursor = buffer.cursor_position();
        self.prev_viewport = viewport;

        log::trace!(
            "composed frame: {} cells repainted, full={}, blink={}",
            report.cells_repainted,
            report.full_repaint,
            report.blinking_content
        );
        report
    }

    /// Keep the off-screen surface within the sizing policy. Returns true
    /// when a full recomposite is required.
    fn ensure_surface(&mut self, viewport: PixelSize) -> bool {
        match self.surface.as_mut() {
            // Lazy allocation on first use.
            None => {
                self.surface = Some(Surface::new(viewport));
                true
            }
            Some(surface) => {
                if surface.width() < viewport.width || surface.height() < viewport.height {
                    surface.grow_to(viewport);
                    true
                } else if !surface.fits_policy(viewport) {
                    log::debug!(
                        "surface shrink {}x{} -> {}x{}",
                        surface.width(),
                        surface.height(),
                        viewport.width,
                        viewport.height
                    );
                    *surface = Surface::new(viewport);
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Reconcile the two invalidation channels into a one-frame lookup.
    /// Returns the lookup plus whether this frame is a full recomposite.
    fn rebuild_damage(
        &mut self,
        buffer: &mut Buffer,
        visible: Size,
        viewport: PixelSize,
        full: bool,
    ) -> (DamageMap, bool) {
        let mut damage = DamageMap::new(visible);

        // The content channel is consumed whole: the whole-buffer flag
        // makes individual positions redundant, but both must be drained
        // so the tracker is empty after this frame.
        let all_dirty = buffer.dirty_mut().take_all_dirty();
        let pending = buffer.dirty_mut().drain();
        let full = full || all_dirty;
        if full {
            damage.mark_all();
        } else {
            for pos in pending {
                damage.mark(pos);
            }
        }

        // The cursor cell repaints even when its glyph did not change, and
        // the previous frame's cursor cell repaints to erase the overlay.
        damage.mark(buffer.cursor_position());
        damage.mark(self.prev_cursor);

        // Live-resize artifacts: when the viewport grew, mark the newly
        // exposed trailing columns/rows. The previous cell count is derived
        // from the previous *pixel* size with the current metrics; if the
        // host changed fonts between frames this over- or under-marks
        // (inherited approximation, kept as-is).
        if self.metrics.width > 0 && viewport.width > self.prev_viewport.width {
            let prev_cols = (self.prev_viewport.width / self.metrics.width) as usize;
            damage.mark_trailing_columns(prev_cols);
        }
        if self.metrics.height > 0 && viewport.height > self.prev_viewport.height {
            let prev_rows = (self.prev_viewport.height / self.metrics.height) as usize;
            damage.mark_trailing_rows(prev_rows);
        }

        // Blinking cells repaint every frame to toggle visibility.
        for row in 0..visible.rows() {
            for col in 0..visible.columns() {
                let pos = Position::new(col, row);
                if buffer.get(pos).map(Cell::is_blinking).unwrap_or(false) {
                    damage.mark(pos);
                }
            }
        }

        (damage, full)
    }

    fn paint<P: GlyphPainter>(
        &mut self,
        buffer: &Buffer,
        damage: &DamageMap,
        visible_rows: Range<usize>,
        blink_on: bool,
        full: bool,
        painter: &mut P,
    ) -> FrameReport {
        let visible = damage.size();
        let cursor = buffer.cursor_position();
        let mut repainted = 0;
        let mut saw_blink_cell = false;

        // paint() is only reached after ensure_surface().
        let mut surface = match self.surface.take() {
            Some(surface) => surface,
            None => return FrameReport::default(),
        };

        let row_end = visible.rows().min(visible_rows.end);
        for row in visible_rows.start..row_end {
            let mut col = 0;
            while col < visible.columns() {
                let pos = Position::new(col, row);
                let cell = match buffer.get(pos) {
                    Ok(cell) => *cell,
                    Err(_) => break,
                };
                // Damage anywhere under a wide glyph repaints the owning
                // cell, including the columns its span covers.
                let span = cell.width().min(visible.columns() - col);
                let dirty = (col..col + span).any(|c| damage.is_dirty(Position::new(c, row)));
                if !dirty {
                    col += span;
                    continue;
                }

                if cell.is_blinking() {
                    saw_blink_cell = true;
                }

                let at_cursor = cursor.row == row && (col..col + span).contains(&cursor.col);
                self.paint_cell(&mut surface, painter, pos, &cell, span, at_cursor, blink_on);
                repainted += 1;

                // A write at a column covered by a wide glyph stores its
                // own cell in the buffer; repaint it on top so the stored
                // content stays visible.
                for covered_col in col + 1..col + span {
                    let covered_pos = Position::new(covered_col, row);
                    let covered = match buffer.get(covered_pos) {
                        Ok(covered) => *covered,
                        Err(_) => break,
                    };
                    if covered.is_blank() {
                        continue;
                    }
                    if covered.is_blinking() {
                        saw_blink_cell = true;
                    }
                    let covered_span = covered.width().min(visible.columns() - covered_col);
                    self.paint_cell(
                        &mut surface,
                        painter,
                        covered_pos,
                        &covered,
                        covered_span,
                        covered_pos == cursor,
                        blink_on,
                    );
                    repainted += 1;
                }

                col += span;
            }
        }

        self.surface = Some(surface);
        self.blinking_content = saw_blink_cell || (self.cursor_visible && self.cursor_blinking);

        FrameReport {
            cells_repainted: repainted,
            full_repaint: full,
            blinking_content: self.blinking_content,
        }
    }

    /// Draw one cell: background fill, glyph, decorations, cursor overlay.
    #[allow(clippy::too_many_arguments)]
    fn paint_cell<P: GlyphPainter>(
        &self,
        surface: &mut Surface,
        painter: &mut P,
        pos: Position,
        cell: &Cell,
        span: usize,
        at_cursor: bool,
        blink_on: bool,
    ) {
        let fg = self.effective_foreground(cell, blink_on);
        let bg = self.effective_background(cell, at_cursor, blink_on);
        let bounds = self.metrics.cell_bounds(pos, span);

        surface.fill_rect(bounds, bg);
        if cell.glyph != ' ' {
            let bold = cell.modifiers.contains(Modifiers::BOLD);
            painter.paint_glyph(surface, bounds, cell.glyph, fg, bold);
        }
        self.draw_decorations(surface, bounds, cell, fg);
        if at_cursor {
            self.draw_cursor_overlay(surface, bounds, blink_on);
        }
    }

    /// Resolve the color the glyph is drawn in.
    ///
    /// Inverse cells draw their glyph in the cell's background color unless
    /// they are also blinking with the phase "on" (in which case inverse
    /// and blink cancel out). Non-inverse blinking cells hide their glyph
    /// on the "on" phase by drawing it in the background color.
    fn effective_foreground(&self, cell: &Cell, blink_on: bool) -> Rgb {
        let inverse = cell.modifiers.contains(Modifiers::INVERSE);
        let blink = cell.modifiers.contains(Modifiers::BLINK);
        if inverse && (!blink || !blink_on) {
            cell.bg.resolve(&self.palette, ColorRole::Background)
        } else if !inverse && blink && blink_on {
            cell.bg.resolve(&self.palette, ColorRole::Background)
        } else {
            cell.fg.resolve(&self.palette, ColorRole::Foreground)
        }
    }

    /// Resolve the color the cell rectangle is filled with.
    fn effective_background(&self, cell: &Cell, at_cursor: bool, blink_on: bool) -> Rgb {
        if at_cursor && self.cursor_visible {
            match self.cursor_style {
                CursorStyle::Reversed if !self.cursor_blinking || !blink_on => {
                    return cell.fg.resolve(&self.palette, ColorRole::Foreground);
                }
                CursorStyle::FixedBackground => {
                    return self.palette.cursor;
                }
                _ => {}
            }
        }
        cell.bg.resolve(&self.palette, ColorRole::Background)
    }

    /// Underline and strikethrough, drawn after the glyph regardless of
    /// cursor state.
    fn draw_decorations(&self, surface: &mut Surface, bounds: PixelRect, cell: &Cell, fg: Rgb) {
        let right = bounds.x + bounds.width as i32 - 1;
        if cell.modifiers.contains(Modifiers::UNDERLINE) {
            let y = bounds.y + bounds.height as i32 - 2;
            surface.draw_line(bounds.x, y, right, y, fg);
        }
        if cell.modifiers.contains(Modifiers::CROSSED_OUT) {
            let y = bounds.y + bounds.height as i32 / 2;
            surface.draw_line(bounds.x, y, right, y, fg);
        }
    }

    /// Bar-style cursor shapes. Block cursors need no overlay; the
    /// reversed-color rule already made the cell stand out.
    fn draw_cursor_overlay(&self, surface: &mut Surface, bounds: PixelRect, blink_on: bool) {
        if !self.cursor_visible || (self.cursor_blinking && !blink_on) {
            return;
        }
        match self.cursor_style {
            CursorStyle::UnderBar => {
                surface.fill_rect(
                    PixelRect::new(
                        bounds.x,
                        bounds.y + bounds.height as i32 - STRIP_THICKNESS as i32,
                        bounds.width,
                        STRIP_THICKNESS,
                    ),
                    self.palette.cursor,
                );
            }
            CursorStyle::VerticalBar => {
                surface.fill_rect(
                    PixelRect::new(bounds.x, bounds.y, STRIP_THICKNESS, bounds.height),
                    self.palette.cursor,
                );
            }
            CursorStyle::Reversed | CursorStyle::FixedBackground => {}
        }
    }
}
