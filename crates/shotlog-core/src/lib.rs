//! Shot Logger Core Library
//!
//! Platform-agnostic table state and touch gesture logic for the shot logger:
//! numbered balls on a pool table, dragged, selected and annotated with
//! projected paths.

pub mod ball;
pub mod collision;
pub mod config;
pub mod editor;
pub mod export;
pub mod gesture;
pub mod input;
pub mod layout;
pub mod path;
pub mod session;
pub mod table;
pub mod timer;

pub use ball::{Ball, BallAppearance, BallId, BallStyle, SerializableColor, CUE_BALL, MAX_BALL_NUMBER};
pub use config::{ConfigError, ShotLogConfig};
pub use editor::{
    BallSnapshot, EditorOptions, Mode, PickerEntry, PlacementError, SelectionPolicy, TableEditor,
    TableSnapshot,
};
pub use export::{ExportSink, JsonFileExporter, LogExporter, MemoryExporter};
pub use gesture::{Gesture, GestureConfig, GestureInterpreter};
pub use input::{Instant, PointerEvent, PointerId, PointerPhase};
pub use layout::TableLayout;
pub use path::PathAnnotation;
pub use session::Session;
pub use table::TableGeometry;
