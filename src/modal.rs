//! Enlarged asset viewer, independent of the run lifecycle.

use crate::presentation::AssetElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseControl,
    /// Click on the backdrop, outside the image.
    Backdrop,
    Escape,
}

#[derive(Debug, Clone)]
pub enum ModalEvent {
    AssetActivated(AssetElement),
    CloseRequested(CloseReason),
}

/// What the open modal shows: the element's image as it was when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContent {
    pub src: String,
    pub caption: String,
    pub pending: bool,
}

#[derive(Debug, Default)]
pub struct ModalViewer {
    open: Option<ModalContent>,
}

impl ModalViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn content(&self) -> Option<&ModalContent> {
        self.open.as_ref()
    }

    /// Returns whether the modal changed.
    pub fn handle(&mut self, event: ModalEvent) -> bool {
        match event {
            ModalEvent::AssetActivated(el) => {
                tracing::debug!(asset = %el.logical_name, "modal opened");
                self.open = Some(ModalContent {
                    src: el.src,
                    caption: el.caption,
                    pending: el.pending,
                });
                true
            }
            ModalEvent::CloseRequested(reason) => {
                if self.open.take().is_some() {
                    tracing::debug!(?reason, "modal closed");
                    true
                } else {
                    false
                }
            }
        }
    }
}
