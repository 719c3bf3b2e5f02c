use std::collections::BTreeMap;

use tracing::trace;

use crate::draw_command::{CommandSink, ElementHandle, SinkCommand, TextSize};
use crate::map_data::DisplayPos;

#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Label { text: String, size: TextSize },
    Marker,
    /// Line from the element's `pos` to `to`.
    Line { to: DisplayPos },
}

/// Current state of one element in a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub kind: ElementKind,
    pub pos: DisplayPos,
    pub color: [u8; 3],
}

/// Retained element store shared by the sink backends.
///
/// Elements are kept in creation order, which is also their draw order.
#[derive(Debug, Default)]
pub struct Scene {
    elements: BTreeMap<ElementHandle, Element>,
    next_handle: u32,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_handle(&mut self) -> ElementHandle {
        let handle = ElementHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Apply a command. Commands addressing unknown handles are dropped.
    pub fn apply(&mut self, cmd: SinkCommand) {
        match cmd {
            SinkCommand::CreateLabel {
                handle,
                text,
                pos,
                color,
                size,
            } => {
                self.elements.insert(
                    handle,
                    Element {
                        kind: ElementKind::Label { text, size },
                        pos,
                        color,
                    },
                );
            }
            SinkCommand::CreateMarker { handle, pos, color } => {
                self.elements.insert(
                    handle,
                    Element {
                        kind: ElementKind::Marker,
                        pos,
                        color,
                    },
                );
            }
            SinkCommand::CreateLine {
                handle,
                from,
                to,
                color,
            } => {
                self.elements.insert(
                    handle,
                    Element {
                        kind: ElementKind::Line { to },
                        pos: from,
                        color,
                    },
                );
            }
            SinkCommand::RemoveLine { handle } => {
                if !matches!(
                    self.elements.get(&handle).map(|e| &e.kind),
                    Some(ElementKind::Line { .. })
                ) {
                    trace!(?handle, "remove_line on a handle that is not a line");
                    return;
                }
                self.elements.remove(&handle);
            }
            SinkCommand::SetText { handle, text } => match self.elements.get_mut(&handle) {
                Some(Element {
                    kind: ElementKind::Label { text: current, .. },
                    ..
                }) => *current = text,
                _ => trace!(?handle, "set_text on a handle that is not a label"),
            },
            SinkCommand::SetPosition { handle, pos } => {
                if let Some(element) = self.elements.get_mut(&handle) {
                    element.pos = pos;
                }
            }
            SinkCommand::SetColor { handle, color } => {
                if let Some(element) = self.elements.get_mut(&handle) {
                    element.color = color;
                }
            }
        }
    }

    pub fn get(&self, handle: ElementHandle) -> Option<&Element> {
        self.elements.get(&handle)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementHandle, &Element)> {
        self.elements.iter().map(|(handle, element)| (*handle, element))
    }

    /// Lines currently present, as (from, to, color).
    pub fn lines(&self) -> impl Iterator<Item = (DisplayPos, DisplayPos, [u8; 3])> + '_ {
        self.elements.values().filter_map(|e| match e.kind {
            ElementKind::Line { to } => Some((e.pos, to, e.color)),
            _ => None,
        })
    }

    pub fn text(&self, handle: ElementHandle) -> Option<&str> {
        match &self.elements.get(&handle)?.kind {
            ElementKind::Label { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn position(&self, handle: ElementHandle) -> Option<DisplayPos> {
        self.elements.get(&handle).map(|e| e.pos)
    }

    pub fn color(&self, handle: ElementHandle) -> Option<[u8; 3]> {
        self.elements.get(&handle).map(|e| e.color)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Headless sink that keeps the scene in memory and logs every command.
#[derive(Debug, Default)]
pub struct RecordingSink {
    scene: Scene,
    commands: Vec<SinkCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Commands received since the last call to `take_commands`.
    pub fn commands(&self) -> &[SinkCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SinkCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl CommandSink for RecordingSink {
    fn allocate_handle(&mut self) -> ElementHandle {
        self.scene.allocate_handle()
    }

    fn submit(&mut self, cmd: SinkCommand) {
        self.commands.push(cmd.clone());
        self.scene.apply(cmd);
    }
}
