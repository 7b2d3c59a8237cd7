//! The object a host drives: editor, gesture interpreter and export sink.

use crate::ball::BallId;
use crate::config::ShotLogConfig;
use crate::editor::{Mode, PlacementError, TableEditor, TableSnapshot};
use crate::export::{ExportSink, LogExporter};
use crate::gesture::{Gesture, GestureInterpreter};
use crate::input::{Instant, PointerEvent};
use crate::layout::TableLayout;

/// One logging session on one table.
pub struct Session {
    editor: TableEditor,
    gestures: GestureInterpreter,
    exporter: Box<dyn ExportSink>,
}

impl Session {
    /// Create a session that exports to the log.
    pub fn new(config: ShotLogConfig, layout: TableLayout) -> Self {
        Self::with_exporter(config, layout, Box::new(LogExporter))
    }

    pub fn with_exporter(config: ShotLogConfig, layout: TableLayout, exporter: Box<dyn ExportSink>) -> Self {
        log::info!(
            "Starting session on a {}x{} table",
            config.table.width,
            config.table.height
        );
        Self {
            editor: TableEditor::new(config.table, config.editor),
            gestures: GestureInterpreter::new(config.gesture, layout),
            exporter,
        }
    }

    pub fn editor(&self) -> &TableEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TableEditor {
        &mut self.editor
    }

    pub fn gestures(&self) -> &GestureInterpreter {
        &self.gestures
    }

    /// Feed a pointer event that landed on the table.
    pub fn pointer(&mut self, event: PointerEvent) -> Option<Gesture> {
        let gesture = self.gestures.handle_event(event, &mut self.editor);
        if let Some(gesture) = &gesture {
            log::debug!("Gesture: {:?}", gesture);
        }
        gesture
    }

    /// Feed a pointer event that started on a picker entry.
    pub fn picker_pointer(&mut self, number: u8, event: PointerEvent) -> Option<Gesture> {
        let gesture = self.gestures.handle_picker_event(number, event, &mut self.editor);
        if let Some(gesture) = &gesture {
            log::debug!("Picker gesture: {:?}", gesture);
        }
        gesture
    }

    pub fn fire_timers(&mut self, now: Instant) -> Option<Gesture> {
        self.gestures.fire_timers(now, &mut self.editor)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.gestures.next_deadline()
    }

    /// Place a ball at its spawn point, as a tap on the picker does.
    pub fn add_ball(&mut self, number: u8) -> Result<BallId, PlacementError> {
        self.editor.add_ball(number)
    }

    pub fn mode(&self) -> Mode {
        self.editor.mode()
    }

    /// Switch mode. A gesture in flight is cancelled first.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.editor.mode() != mode {
            self.gestures.cancel(&mut self.editor);
            self.editor.set_mode(mode);
        }
    }

    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.editor.mode().toggled());
        self.editor.mode()
    }

    pub fn relayout(&mut self, layout: TableLayout) {
        self.gestures.relayout(layout);
    }

    /// Clear the table.
    pub fn reset(&mut self) {
        self.gestures.cancel(&mut self.editor);
        self.editor.reset();
        log::info!("Session reset");
    }

    pub fn snapshot(&self) -> TableSnapshot {
        self.editor.snapshot()
    }

    /// Hand the current table to the export sink.
    pub fn save(&self) {
        let snapshot = self.editor.snapshot();
        log::info!("Saving table with {} ball(s)", snapshot.balls.len());
        self.exporter.export(&snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemoryExporter;
    use kurbo::Point;
    use std::sync::Arc;
    use std::time::Duration;

    fn session() -> (Session, Arc<MemoryExporter>) {
        let exporter = Arc::new(MemoryExporter::new());
        let session = Session::with_exporter(
            ShotLogConfig::default(),
            TableLayout::default(),
            Box::new(exporter.clone()),
        );
        (session, exporter)
    }

    #[test]
    fn test_save_exports_snapshot() {
        let (mut session, exporter) = session();
        session.add_ball(8).unwrap();
        session.save();

        let saved = exporter.last().unwrap();
        assert_eq!(saved, session.snapshot());
        assert_eq!(saved.balls[0].number, 8);
    }

    #[test]
    fn test_mode_switch_cancels_drag() {
        let (mut session, _) = session();
        let id = session.add_ball(1).unwrap();
        let t0 = Instant::now();

        session.pointer(PointerEvent::down(1, Point::new(150.0, 150.0), t0));
        session.pointer(PointerEvent::moved(1, Point::new(200.0, 200.0), t0 + Duration::from_millis(20)));
        assert!(session.gestures().is_dragging());

        assert_eq!(session.toggle_mode(), Mode::Draw);
        assert!(session.gestures().is_idle());
        assert_eq!(session.editor().ball(id).unwrap().position, Point::new(150.0, 150.0));

        // The rest of the old sequence does nothing.
        let late = PointerEvent::up(1, Point::new(220.0, 220.0), t0 + Duration::from_millis(40));
        assert_eq!(session.pointer(late), None);
    }

    #[test]
    fn test_reset_clears_everything() {
        let (mut session, _) = session();
        session.add_ball(1).unwrap();
        session.add_ball(2).unwrap();
        session.reset();
        assert!(session.editor().is_empty());
        assert!(session.editor().picker_entries().iter().all(|e| e.enabled));
    }

    #[test]
    fn test_timers_through_session() {
        let (mut session, _) = session();
        let id = session.add_ball(1).unwrap();
        let t0 = Instant::now();

        session.pointer(PointerEvent::down(1, Point::new(150.0, 150.0), t0));
        let deadline = session.next_deadline().unwrap();
        assert_eq!(session.fire_timers(deadline), Some(Gesture::DragStarted(id)));
        assert_eq!(session.next_deadline(), None);
    }
}
