use crate::map_data::DisplayPos;

/// Opaque handle to an element created in a render sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementHandle(pub u32);

/// Text size class. Backends pick the actual font size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextSize {
    /// Player tags drawn centered on their marker.
    Small,
    #[default]
    Normal,
    /// Score display.
    Large,
}

/// A retained-mode command sent to a render sink.
///
/// The playback state machine never draws pixels itself: it creates
/// elements once and then moves, recolors, retexts or removes them.
/// All visual properties are fully resolved before a command is emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCommand {
    CreateLabel {
        handle: ElementHandle,
        text: String,
        pos: DisplayPos,
        color: [u8; 3],
        size: TextSize,
    },
    /// Player position dot
    CreateMarker {
        handle: ElementHandle,
        pos: DisplayPos,
        color: [u8; 3],
    },
    /// Kill tracer line segment
    CreateLine {
        handle: ElementHandle,
        from: DisplayPos,
        to: DisplayPos,
        color: [u8; 3],
    },
    RemoveLine {
        handle: ElementHandle,
    },
    SetText {
        handle: ElementHandle,
        text: String,
    },
    SetPosition {
        handle: ElementHandle,
        pos: DisplayPos,
    },
    SetColor {
        handle: ElementHandle,
        color: [u8; 3],
    },
}

/// The drawing surface the playback state machine talks to.
///
/// Only these primitives are used; the sink owns whatever screen or pixel
/// buffer sits behind them.
pub trait RenderSink {
    fn create_label(
        &mut self,
        text: &str,
        pos: DisplayPos,
        color: [u8; 3],
        size: TextSize,
    ) -> ElementHandle;

    fn create_marker(&mut self, pos: DisplayPos, color: [u8; 3]) -> ElementHandle;

    fn create_line(&mut self, from: DisplayPos, to: DisplayPos, color: [u8; 3]) -> ElementHandle;

    fn remove_line(&mut self, line: ElementHandle);

    fn set_text(&mut self, label: ElementHandle, text: &str);

    fn set_position(&mut self, element: ElementHandle, pos: DisplayPos);

    fn set_color(&mut self, element: ElementHandle, color: [u8; 3]);
}

/// Backends that consume `SinkCommand`s.
///
/// Implementing this is enough to get a `RenderSink`: the blanket impl below
/// turns every primitive into a command.
pub trait CommandSink {
    /// Reserve a handle for an element about to be created.
    fn allocate_handle(&mut self) -> ElementHandle;

    /// Execute a single command.
    fn submit(&mut self, cmd: SinkCommand);
}

impl<T: CommandSink + ?Sized> RenderSink for T {
    fn create_label(
        &mut self,
        text: &str,
        pos: DisplayPos,
        color: [u8; 3],
        size: TextSize,
    ) -> ElementHandle {
        let handle = self.allocate_handle();
        self.submit(SinkCommand::CreateLabel {
            handle,
            text: text.to_string(),
            pos,
            color,
            size,
        });
        handle
    }

    fn create_marker(&mut self, pos: DisplayPos, color: [u8; 3]) -> ElementHandle {
        let handle = self.allocate_handle();
        self.submit(SinkCommand::CreateMarker { handle, pos, color });
        handle
    }

    fn create_line(&mut self, from: DisplayPos, to: DisplayPos, color: [u8; 3]) -> ElementHandle {
        let handle = self.allocate_handle();
        self.submit(SinkCommand::CreateLine {
            handle,
            from,
            to,
            color,
        });
        handle
    }

    fn remove_line(&mut self, line: ElementHandle) {
        self.submit(SinkCommand::RemoveLine { handle: line });
    }

    fn set_text(&mut self, label: ElementHandle, text: &str) {
        self.submit(SinkCommand::SetText {
            handle: label,
            text: text.to_string(),
        });
    }

    fn set_position(&mut self, element: ElementHandle, pos: DisplayPos) {
        self.submit(SinkCommand::SetPosition {
            handle: element,
            pos,
        });
    }

    fn set_color(&mut self, element: ElementHandle, color: [u8; 3]) {
        self.submit(SinkCommand::SetColor {
            handle: element,
            color,
        });
    }
}
