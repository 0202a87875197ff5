//! Headless render target that only counts what it is asked to do.

use std::cell::Cell;
use std::rc::Rc;

use super::{GraphicList, RenderGraphic, RenderTarget, TextLabel};

#[derive(Debug)]
struct RecordedGraphic {
    list: GraphicList,
    disposed: Rc<Cell<usize>>,
}

impl RenderGraphic for RecordedGraphic {
    fn list(&self) -> &GraphicList {
        &self.list
    }
}

impl Drop for RecordedGraphic {
    fn drop(&mut self) {
        self.disposed.set(self.disposed.get() + 1);
    }
}

/// Records created, drawn and disposed graphics plus per-frame output
#[derive(Debug, Default)]
pub struct RecordingTarget {
    created: usize,
    disposed: Rc<Cell<usize>>,
    /// Retained graphics drawn this frame
    pub drawn: Vec<GraphicList>,
    /// One-frame lists drawn this frame
    pub dynamic: Vec<GraphicList>,
    pub labels: Vec<TextLabel>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous frame's output (counters are kept)
    pub fn begin_frame(&mut self) {
        self.drawn.clear();
        self.dynamic.clear();
        self.labels.clear();
    }

    pub fn created_count(&self) -> usize {
        self.created
    }

    pub fn disposed_count(&self) -> usize {
        self.disposed.get()
    }

    /// Graphics created and not yet disposed
    pub fn live_count(&self) -> usize {
        self.created - self.disposed.get()
    }

    /// Everything drawn this frame, retained and transient
    pub fn frame_graphic_count(&self) -> usize {
        self.drawn.len() + self.dynamic.len()
    }
}

impl RenderTarget for RecordingTarget {
    fn create_graphic(&mut self, list: GraphicList) -> Box<dyn RenderGraphic> {
        self.created += 1;
        Box::new(RecordedGraphic {
            list,
            disposed: Rc::clone(&self.disposed),
        })
    }

    fn add_graphic(&mut self, graphic: &dyn RenderGraphic) {
        self.drawn.push(graphic.list().clone());
    }

    fn add_dynamic(&mut self, list: GraphicList) {
        self.dynamic.push(list);
    }

    fn add_label(&mut self, label: TextLabel) {
        self.labels.push(label);
    }
}
