//! Integration tests for the display engine
//!
//! These tests drive the buffer, dirty tracking, compositor, and input
//! pipeline together the way an embedding host would: mutate the buffer
//! in response to input events, compose frames, and inspect the
//! off-screen surface.

use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use termcanvas::{
    Buffer, Cell, CellMetrics, Color, Compositor, DamageMap, DirtyTracker, GlyphPainter, Input,
    InputPipeline, KeyEvent, Palette, PixelRect, PixelSize, Position, Rgb, Size, Surface,
};

/// Painter that records every glyph it is asked to draw.
#[derive(Default)]
struct RecordingPainter {
    glyphs: Vec<(char, Position)>,
}

impl GlyphPainter for RecordingPainter {
    fn paint_glyph(
        &mut self,
        _surface: &mut Surface,
        bounds: PixelRect,
        glyph: char,
        _color: Rgb,
        _bold: bool,
    ) {
        // Bounds are derived from an 8x16 cell in every test below.
        self.glyphs
            .push((glyph, Position::new(bounds.x as usize / 8, bounds.y as usize / 16)));
    }
}

const METRICS: CellMetrics = CellMetrics::new(8, 16);

fn viewport_for(cols: usize, rows: usize) -> PixelSize {
    PixelSize::new(cols as u32 * 8, rows as u32 * 16)
}

fn compose(
    compositor: &mut Compositor,
    buffer: &mut Buffer,
    blink_on: bool,
    painter: &mut RecordingPainter,
) -> termcanvas::FrameReport {
    let rows = buffer.size().rows();
    let viewport = viewport_for(buffer.size().columns(), rows);
    compositor.compose(buffer, viewport, 0..rows, blink_on, painter)
}

// ============================================================================
// Dirty-drain scenarios
// ============================================================================

/// Buffer of size (3,1): set (1,0), drain, move cursor, drain again.
/// The second drain must include the new and previous cursor cells but
/// not the previously drained content cell.
#[test]
fn test_cursor_move_drain_scenario() {
    let mut buffer = Buffer::new(Size::from_cells(3, 1));
    buffer.set(Position::new(1, 0), Cell::new('A')).unwrap();

    let mut compositor = Compositor::new(METRICS, Palette::default());
    let mut painter = RecordingPainter::default();

    // First frame is a full repaint; it consumes the (1,0) content damage
    // and records the cursor at (0,0).
    compose(&mut compositor, &mut buffer, false, &mut painter);

    buffer.set_cursor_position(2, 0);
    painter.glyphs.clear();
    let report = compose(&mut compositor, &mut buffer, false, &mut painter);

    // (2,0) is the new cursor cell, (0,0) the previous one; (1,0) stays
    // untouched because its content did not change again.
    assert_eq!(report.cells_repainted, 2);
    assert!(painter.glyphs.iter().all(|(g, _)| *g != 'A'));
}

#[test]
fn test_content_channel_empty_after_frame() {
    let mut buffer = Buffer::new(Size::from_cells(4, 4));
    buffer.set(Position::new(1, 2), Cell::new('x')).unwrap();
    buffer.clear();
    buffer.set(Position::new(0, 0), Cell::new('y')).unwrap();

    let mut compositor = Compositor::new(METRICS, Palette::default());
    let mut painter = RecordingPainter::default();
    compose(&mut compositor, &mut buffer, false, &mut painter);

    assert!(!buffer.dirty().is_dirty());
}

#[test]
fn test_presentation_lookup_from_tracker() {
    let mut tracker = DirtyTracker::new();
    tracker.mark(Position::new(1, 0));
    tracker.mark(Position::new(9, 9)); // outside the 3x1 viewport

    let mut damage = DamageMap::new(Size::from_cells(3, 1));
    assert!(!tracker.take_all_dirty());
    for pos in tracker.drain() {
        damage.mark(pos);
    }

    assert!(damage.is_dirty(Position::new(1, 0)));
    assert!(!damage.is_dirty(Position::new(0, 0)));
    assert_eq!(damage.dirty_count(), 1);
}

// ============================================================================
// Surface lifecycle
// ============================================================================

/// Growing the visible area from (10,10) to (20,20) pixels reallocates the
/// off-screen surface to at least the viewport and at most 4x it, keeping
/// prior pixel content at the origin.
#[test]
fn test_surface_growth_scenario() {
    let mut surface = Surface::new(PixelSize::new(10, 10));
    surface.fill_rect(PixelRect::new(0, 0, 3, 3), Rgb::new(123, 45, 67));
    let marker = surface.pixel(2, 2).unwrap();

    surface.grow_to(PixelSize::new(20, 20));

    assert!(surface.width() >= 20 && surface.height() >= 20);
    assert!(surface.width() <= 80 && surface.height() <= 80);
    assert!(surface.fits_policy(PixelSize::new(20, 20)));
    assert_eq!(surface.pixel(2, 2), Some(marker));
}

#[test]
fn test_compositor_lazy_surface_allocation() {
    let mut compositor = Compositor::new(METRICS, Palette::default());
    assert!(compositor.surface().is_none());

    let mut buffer = Buffer::new(Size::from_cells(2, 2));
    let mut painter = RecordingPainter::default();
    compose(&mut compositor, &mut buffer, false, &mut painter);
    assert!(compositor.surface().is_some());
}

// ============================================================================
// Input pipeline scenarios
// ============================================================================

/// Pipeline closed with two events still queued: the first two reads
/// return those events in order, the third returns EOF.
#[test]
fn test_close_with_queued_events_scenario() {
    let pipeline = InputPipeline::new();
    let first = Input::from(KeyEvent::character('1'));
    let second = Input::from(KeyEvent::character('2'));
    pipeline.offer(first);
    pipeline.offer(second);
    pipeline.close();

    assert_eq!(pipeline.read(), first);
    assert_eq!(pipeline.read(), second);
    assert!(pipeline.read().is_eof());
}

#[test]
fn test_producer_thread_to_consumer() {
    let pipeline = InputPipeline::new();
    let producer = pipeline.clone();

    let handle = thread::spawn(move || {
        for c in "hello".chars() {
            producer.offer(Input::from(KeyEvent::character(c)));
            thread::sleep(Duration::from_millis(1));
        }
        producer.close();
    });

    let mut received = String::new();
    loop {
        match pipeline.read() {
            Input::Key(key) if key.glyph.is_some() => received.push(key.glyph.unwrap()),
            event if event.is_eof() => break,
            _ => {}
        }
    }
    handle.join().unwrap();
    assert_eq!(received, "hello");
}

// ============================================================================
// End-to-end frame loop
// ============================================================================

/// Feed keystrokes through the pipeline, echo them into the buffer the way
/// a consumer would, and verify only the touched cells repaint.
#[test]
fn test_echo_loop_repaints_incrementally() {
    let pipeline = InputPipeline::new();
    for c in "hi".chars() {
        pipeline.offer(Input::from(KeyEvent::character(c)));
    }
    pipeline.close();

    let mut buffer = Buffer::new(Size::from_cells(10, 2));
    let mut compositor = Compositor::new(METRICS, Palette::default());
    let mut painter = RecordingPainter::default();
    compose(&mut compositor, &mut buffer, false, &mut painter);

    // Consumer: write each character at the cursor, advance the cursor.
    loop {
        let event = match pipeline.poll() {
            Some(event) if event.is_eof() => break,
            Some(event) => event,
            None => break,
        };
        if let Input::Key(key) = event {
            if let Some(glyph) = key.glyph {
                let cursor = buffer.cursor_position();
                buffer.set(cursor, Cell::new(glyph)).unwrap();
                buffer.set_cursor_position(cursor.col as i64 + 1, cursor.row as i64);
            }
        }
    }

    painter.glyphs.clear();
    let report = compose(&mut compositor, &mut buffer, false, &mut painter);

    // Cells (0,0) and (1,0) changed; the cursor landed on (2,0) and the
    // previous frame's cursor cell (0,0) was already damaged.
    assert_eq!(report.cells_repainted, 3);
    assert!(painter.glyphs.contains(&('h', Position::new(0, 0))));
    assert!(painter.glyphs.contains(&('i', Position::new(1, 0))));
}

#[test]
fn test_clear_then_frame_reports_full_once() {
    let mut buffer = Buffer::new(Size::from_cells(5, 3));
    let mut compositor = Compositor::new(METRICS, Palette::default());
    let mut painter = RecordingPainter::default();
    compose(&mut compositor, &mut buffer, false, &mut painter);

    buffer.clear();
    let report = compose(&mut compositor, &mut buffer, false, &mut painter);
    assert!(report.full_repaint);
    assert_eq!(report.cells_repainted, 15);

    let report = compose(&mut compositor, &mut buffer, false, &mut painter);
    assert!(!report.full_repaint);
    assert_eq!(report.cells_repainted, 1); // stationary cursor cell
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_set_get_round_trip(
        cols in 1usize..40,
        rows in 1usize..40,
        col in 0usize..40,
        row in 0usize..40,
        glyph in proptest::char::range('!', '~'),
    ) {
        let mut buffer = Buffer::new(Size::from_cells(cols, rows));
        let pos = Position::new(col % cols, row % rows);
        let cell = Cell::new(glyph);
        buffer.set(pos, cell).unwrap();
        prop_assert_eq!(*buffer.get(pos).unwrap(), cell);
    }

    #[test]
    fn prop_resize_preserves_overlap(
        cols in 1usize..30,
        rows in 1usize..30,
        new_cols in 1usize..30,
        new_rows in 1usize..30,
        col in 0usize..30,
        row in 0usize..30,
    ) {
        let mut buffer = Buffer::new(Size::from_cells(cols, rows));
        let pos = Position::new(col % cols, row % rows);
        buffer.set(pos, Cell::new('#')).unwrap();

        buffer.resize(Size::from_cells(new_cols, new_rows));

        if pos.col < new_cols && pos.row < new_rows {
            prop_assert_eq!(buffer.get(pos).unwrap().glyph, '#');
        } else {
            prop_assert!(buffer.get(pos).is_err());
        }

        // Every other in-bounds cell is still the default.
        for r in 0..new_rows {
            for c in 0..new_cols {
                let probe = Position::new(c, r);
                if probe != pos {
                    prop_assert!(buffer.get(probe).unwrap().is_blank());
                }
            }
        }
    }

    #[test]
    fn prop_negative_sizes_rejected(cols in -100i64..0, rows in 0i64..100) {
        prop_assert!(Size::new(cols, rows).is_err());
        prop_assert!(Size::new(rows, cols).is_err());
    }

    #[test]
    fn prop_fifo_order_preserved(glyphs in proptest::collection::vec(proptest::char::range('a', 'z'), 0..50)) {
        let pipeline = InputPipeline::new();
        let events: Vec<Input> = glyphs
            .iter()
            .map(|&c| Input::from(KeyEvent::character(c)))
            .collect();
        for &event in &events {
            pipeline.offer(event);
        }
        pipeline.close();

        for &expected in &events {
            prop_assert_eq!(pipeline.read(), expected);
        }
        prop_assert!(pipeline.read().is_eof());
    }
}

#[test]
fn test_default_color_is_symbolic() {
    assert_eq!(Color::default(), Color::Default);
}
